use std::fmt;

use crate::pipeline::domain::SteeringCase;

const CASE_COUNT: usize = SteeringCase::ALL.len();

/// Acceptance band around a reference steering value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceRule {
    /// Half-width of the band around a zero reference.
    pub zero_band: f32,
    pub lower_ratio: f32,
    pub upper_ratio: f32,
}

impl Default for ToleranceRule {
    fn default() -> Self {
        Self {
            zero_band: 0.05,
            lower_ratio: 0.7,
            upper_ratio: 1.3,
        }
    }
}

impl ToleranceRule {
    pub fn is_within_tolerance(&self, reference: f32, estimate: f32) -> bool {
        if reference == 0.0 {
            -self.zero_band < estimate && estimate < self.zero_band
        } else if reference > 0.0 {
            reference * self.lower_ratio < estimate && estimate < reference * self.upper_ratio
        } else {
            // both scaled bounds are negative, so the band is (reference * upper, reference * lower)
            reference * self.lower_ratio > estimate && reference * self.upper_ratio < estimate
        }
    }
}

pub fn is_within_tolerance(reference: f32, estimate: f32) -> bool {
    ToleranceRule::default().is_within_tolerance(reference, estimate)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseTally {
    pub attempts: u64,
    pub correct: u64,
}

impl CaseTally {
    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percentage of correct attempts, `None` when nothing was attempted.
    pub fn accuracy(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.correct as f64 * 100.0 / self.attempts as f64)
    }
}

/// Running per-case and overall scores for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccuracyTally {
    cases: [CaseTally; CASE_COUNT],
    overall: CaseTally,
    unscored: [u64; CASE_COUNT],
}

impl AccuracyTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case(&self, case: SteeringCase) -> CaseTally {
        self.cases[case.slot()]
    }

    pub fn overall(&self) -> CaseTally {
        self.overall
    }

    /// Frames of this case that could not be scored for lack of a reference value.
    pub fn unscored(&self, case: SteeringCase) -> u64 {
        self.unscored[case.slot()]
    }

    pub fn report(&self) -> AccuracyReport {
        AccuracyReport {
            overall: self.overall,
            cases: self.cases,
            unscored: self.unscored.iter().sum(),
        }
    }
}

/// Scores estimates against the reference and keeps the tally.
#[derive(Debug, Clone, Default)]
pub struct AccuracyEvaluator {
    rule: ToleranceRule,
}

impl AccuracyEvaluator {
    pub fn new(rule: ToleranceRule) -> Self {
        Self { rule }
    }

    /// Records one frame. A missing reference leaves the attempt counters untouched and returns
    /// `None`.
    pub fn score(
        &self,
        tally: &mut AccuracyTally,
        case: SteeringCase,
        reference: Option<f32>,
        estimate: f32,
    ) -> Option<bool> {
        let Some(reference) = reference else {
            tally.unscored[case.slot()] += 1;
            return None;
        };
        let correct = self.rule.is_within_tolerance(reference, estimate);
        tally.cases[case.slot()].record(correct);
        tally.overall.record(correct);
        Some(correct)
    }
}

/// Final accuracy figures of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccuracyReport {
    pub overall: CaseTally,
    pub cases: [CaseTally; CASE_COUNT],
    pub unscored: u64,
}

impl AccuracyReport {
    pub fn case(&self, case: SteeringCase) -> CaseTally {
        self.cases[case.slot()]
    }
}

struct Percent(Option<f64>);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "nan"),
        }
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Average Accuracy: {}", Percent(self.overall.accuracy()))?;
        for case in SteeringCase::ALL {
            let tally = self.case(case);
            write!(
                f,
                "\n{}: {}-{}",
                case,
                tally.attempts,
                Percent(tally.accuracy())
            )?;
        }
        Ok(())
    }
}
