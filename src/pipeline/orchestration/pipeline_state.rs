use crate::pipeline::services::{AccuracyTally, OrientationMemory};

/// State that outlives a single frame: the orientation memory and the accuracy tally.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub orientation: OrientationMemory,
    pub tally: AccuracyTally,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_processed(&self) -> u64 {
        let report = self.tally.report();
        report.overall.attempts + report.unscored
    }
}
