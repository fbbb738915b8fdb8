use crate::common::frame::Frame;
use crate::pipeline::context::metrics::FrameMetrics;
use crate::pipeline::context::state::{
    DetectedState, EstimatedState, IngestedState, ProcessingState, SegmentedState,
};
use crate::pipeline::domain::{ConeObservation, SteeringEstimate};
use crate::pipeline::services::ColorMasks;
use std::sync::Arc;
use std::time::{Duration, Instant};

// FrameContext with compile-time state tracking via the state parameter
pub struct FrameContext<S> {
    frame: Arc<Frame>,
    metrics: FrameMetrics,
    stage_start: Instant,
    state: S,
}

impl<S: ProcessingState> FrameContext<S> {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn stage(&self) -> &'static str {
        S::state_name()
    }

    /// Time spent in the current stage so far.
    pub fn elapsed(&self) -> Duration {
        self.stage_start.elapsed()
    }

    fn advance<T>(self, metrics: FrameMetrics, state: T) -> FrameContext<T> {
        FrameContext {
            frame: self.frame,
            metrics,
            stage_start: Instant::now(),
            state,
        }
    }
}

impl FrameContext<IngestedState> {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame: Arc::new(frame),
            metrics: FrameMetrics::new(),
            stage_start: Instant::now(),
            state: IngestedState,
        }
    }

    pub fn into_segmented(self, masks: ColorMasks) -> FrameContext<SegmentedState> {
        let mut metrics = self.metrics.clone();
        metrics.record_segmentation(self.elapsed());
        self.advance(metrics, SegmentedState { masks })
    }
}

impl FrameContext<SegmentedState> {
    pub fn masks(&self) -> &ColorMasks {
        &self.state.masks
    }

    pub fn into_detected(
        self,
        blue: ConeObservation,
        yellow: ConeObservation,
    ) -> FrameContext<DetectedState> {
        let mut metrics = self.metrics.clone();
        metrics.record_detection(self.elapsed());
        self.advance(metrics, DetectedState { blue, yellow })
    }
}

impl FrameContext<DetectedState> {
    pub fn blue(&self) -> &ConeObservation {
        &self.state.blue
    }

    pub fn yellow(&self) -> &ConeObservation {
        &self.state.yellow
    }

    pub fn into_estimated(self, estimate: SteeringEstimate) -> FrameContext<EstimatedState> {
        let mut metrics = self.metrics.clone();
        metrics.record_estimation(self.elapsed());
        let DetectedState { blue, yellow } = self.state;
        FrameContext {
            frame: self.frame,
            metrics,
            stage_start: Instant::now(),
            state: EstimatedState {
                blue,
                yellow,
                estimate,
            },
        }
    }
}

impl FrameContext<EstimatedState> {
    pub fn estimate(&self) -> SteeringEstimate {
        self.state.estimate
    }

    pub fn blue(&self) -> &ConeObservation {
        &self.state.blue
    }

    pub fn yellow(&self) -> &ConeObservation {
        &self.state.yellow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::{ConeColor, SteeringCase};
    use image::{GrayImage, RgbImage};

    #[test]
    fn context_moves_through_stages() {
        let context = FrameContext::new(Frame::capture(RgbImage::new(8, 8)));
        assert_eq!(context.stage(), "Ingested");

        let context = context.into_segmented(ColorMasks {
            blue: GrayImage::new(8, 8),
            yellow: GrayImage::new(8, 8),
        });
        assert_eq!(context.stage(), "Segmented");
        assert_eq!(context.masks().blue.dimensions(), (8, 8));

        let context = context.into_detected(
            ConeObservation::new(ConeColor::Blue),
            ConeObservation::new(ConeColor::Yellow),
        );
        assert_eq!(context.stage(), "Detected");
        assert!(context.blue().is_empty());

        let context = context.into_estimated(SteeringEstimate::new(0.0, SteeringCase::NoCones));
        assert_eq!(context.stage(), "Estimated");
        assert_eq!(context.estimate().case, SteeringCase::NoCones);
        assert_eq!(context.yellow().color(), ConeColor::Yellow);
        assert_eq!(context.frame().image().dimensions(), (8, 8));
    }
}
