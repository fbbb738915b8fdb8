use std::fmt;

use crate::pipeline::domain::cone::ConeObservation;

/// Cone visibility configuration that selected the steering formula, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteeringCase {
    /// At least one cone of each color.
    BothColors,
    /// Two blue cones, no yellow.
    BluePair,
    /// Two yellow cones, no blue.
    YellowPair,
    /// A single blue cone.
    SingleBlue,
    /// A single yellow cone.
    SingleYellow,
    /// Nothing detected.
    NoCones,
}

impl SteeringCase {
    pub const ALL: [SteeringCase; 6] = [
        SteeringCase::BothColors,
        SteeringCase::BluePair,
        SteeringCase::YellowPair,
        SteeringCase::SingleBlue,
        SteeringCase::SingleYellow,
        SteeringCase::NoCones,
    ];

    /// First matching case wins.
    pub fn classify(blue: &ConeObservation, yellow: &ConeObservation) -> Self {
        match (blue.len(), yellow.len()) {
            (b, y) if b > 0 && y > 0 => SteeringCase::BothColors,
            (2, _) => SteeringCase::BluePair,
            (_, 2) => SteeringCase::YellowPair,
            (1, _) => SteeringCase::SingleBlue,
            (_, 1) => SteeringCase::SingleYellow,
            _ => SteeringCase::NoCones,
        }
    }

    /// 1-based case number used in reports.
    pub fn number(&self) -> usize {
        self.slot() + 1
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            SteeringCase::BothColors => 0,
            SteeringCase::BluePair => 1,
            SteeringCase::YellowPair => 2,
            SteeringCase::SingleBlue => 3,
            SteeringCase::SingleYellow => 4,
            SteeringCase::NoCones => 5,
        }
    }
}

impl fmt::Display for SteeringCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Case {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringEstimate {
    pub angle: f32,
    pub case: SteeringCase,
}

impl SteeringEstimate {
    pub fn new(angle: f32, case: SteeringCase) -> Self {
        Self { angle, case }
    }
}

/// One output line per processed frame: `<source_id>;<timestamp_micros>;<angle>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub source_id: String,
    pub timestamp_micros: i64,
    pub estimate: SteeringEstimate,
    /// Whether the estimate matched the reference, `None` when no reference was available.
    pub verdict: Option<bool>,
}

impl fmt::Display for FrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}",
            self.source_id, self.timestamp_micros, self.estimate.angle
        )
    }
}
