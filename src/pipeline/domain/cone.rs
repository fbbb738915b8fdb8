use std::fmt;

pub const MAX_CONES_PER_COLOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConeColor {
    Blue,
    Yellow,
}

impl fmt::Display for ConeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConeColor::Blue => write!(f, "blue"),
            ConeColor::Yellow => write!(f, "yellow"),
        }
    }
}

/// Area-weighted center of a detected cone, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f32,
    pub y: f32,
}

impl Centroid {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// True when the two points differ by more than `distance` along either axis.
    pub fn is_separated_from(&self, other: &Centroid, distance: f32) -> bool {
        (self.x - other.x).abs() > distance || (self.y - other.y).abs() > distance
    }
}

/// The cones of one color seen in a frame. Holds at most two centroids, filled in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeObservation {
    color: ConeColor,
    cones: Vec<Centroid>,
}

impl ConeObservation {
    pub fn new(color: ConeColor) -> Self {
        Self {
            color,
            cones: Vec::with_capacity(MAX_CONES_PER_COLOR),
        }
    }

    pub fn color(&self) -> ConeColor {
        self.color
    }

    pub fn first(&self) -> Option<&Centroid> {
        self.cones.first()
    }

    pub fn second(&self) -> Option<&Centroid> {
        self.cones.get(1)
    }

    /// Both slots, in acceptance order.
    pub fn pair(&self) -> Option<(&Centroid, &Centroid)> {
        Some((self.first()?, self.second()?))
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cones.len() >= MAX_CONES_PER_COLOR
    }

    pub fn iter(&self) -> impl Iterator<Item = &Centroid> {
        self.cones.iter()
    }

    /// Accepts the first candidate unconditionally and a second one only when it lies more than
    /// `min_separation` away from the first on either axis. Returns whether it was kept.
    pub fn offer(&mut self, candidate: Centroid, min_separation: f32) -> bool {
        let accepted = match self.cones.as_slice() {
            [] => true,
            [first] => candidate.is_separated_from(first, min_separation),
            _ => false,
        };
        if accepted {
            self.cones.push(candidate);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cone_is_always_accepted() {
        let mut observation = ConeObservation::new(ConeColor::Blue);
        assert!(observation.offer(Centroid::new(0.0, 0.0), 30.0));
        assert_eq!(observation.first(), Some(&Centroid::new(0.0, 0.0)));
        assert_eq!(observation.second(), None);
    }

    #[test]
    fn close_second_cone_is_rejected() {
        let mut observation = ConeObservation::new(ConeColor::Yellow);
        observation.offer(Centroid::new(100.0, 100.0), 30.0);
        assert!(!observation.offer(Centroid::new(129.0, 70.5), 30.0));
        assert!(!observation.offer(Centroid::new(130.0, 130.0), 30.0));
        assert_eq!(observation.len(), 1);
    }

    #[test]
    fn separation_on_a_single_axis_is_enough() {
        let mut observation = ConeObservation::new(ConeColor::Yellow);
        observation.offer(Centroid::new(100.0, 100.0), 30.0);
        assert!(observation.offer(Centroid::new(105.0, 131.0), 30.0));
        let (first, second) = observation.pair().unwrap();
        assert_eq!(first.x, 100.0);
        assert_eq!(second.y, 131.0);
    }

    #[test]
    fn never_holds_more_than_two() {
        let mut observation = ConeObservation::new(ConeColor::Blue);
        for i in 0..5 {
            observation.offer(Centroid::new(i as f32 * 100.0, 0.0), 30.0);
        }
        assert!(observation.is_full());
        assert_eq!(observation.len(), MAX_CONES_PER_COLOR);
        assert_eq!(observation.second(), Some(&Centroid::new(100.0, 0.0)));
    }
}
