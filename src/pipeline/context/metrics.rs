use std::time::Duration;

/// Metrics collected during frame processing
#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    segmentation: Option<Duration>,
    detection: Option<Duration>,
    estimation: Option<Duration>,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_segmentation(&mut self, duration: Duration) {
        self.segmentation = Some(duration);
    }

    pub fn record_detection(&mut self, duration: Duration) {
        self.detection = Some(duration);
    }

    pub fn record_estimation(&mut self, duration: Duration) {
        self.estimation = Some(duration);
    }

    pub fn segmentation_us(&self) -> u64 {
        Self::micros(self.segmentation)
    }

    pub fn detection_us(&self) -> u64 {
        Self::micros(self.detection)
    }

    pub fn estimation_us(&self) -> u64 {
        Self::micros(self.estimation)
    }

    fn micros(duration: Option<Duration>) -> u64 {
        duration.map_or(0, |d| d.as_micros() as u64)
    }
}
