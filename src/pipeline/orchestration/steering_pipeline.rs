use std::path::{Path, PathBuf};
use std::pin::Pin;

use futures::Future;
use futures::task::{Context, Poll};
use tower::Service;
use tracing::{debug, instrument, warn};

use crate::common::Frame;
use crate::config::Configuration;
use crate::error::AppError;
use crate::pipeline::context::{
    DetectedState, EstimatedState, FrameContext, IngestedState, SegmentedState,
};
use crate::pipeline::domain::{ConeColor, FrameRecord};
use crate::pipeline::orchestration::pipeline_state::PipelineState;
use crate::pipeline::services::detection::annotate;
use crate::pipeline::services::{
    AccuracyEvaluator, AccuracyReport, ColorSegmenter, ConeDetector, ReferenceCell,
    SteeringEstimator,
};

/// Frame in, steering record out. Processes one frame at a time, entirely inside `call`.
pub struct SteeringPipeline {
    source_id: String,
    segmenter: ColorSegmenter,
    blue_detector: ConeDetector,
    yellow_detector: ConeDetector,
    estimator: SteeringEstimator,
    evaluator: AccuracyEvaluator,
    state: PipelineState,
    reference: ReferenceCell,
    annotation_dir: Option<PathBuf>,
}

impl SteeringPipeline {
    pub fn new(configuration: &Configuration, reference: ReferenceCell) -> Self {
        let detection = &configuration.detection;
        Self {
            source_id: configuration.source_id.clone(),
            segmenter: ColorSegmenter::new(detection.blue.range, detection.yellow.range),
            blue_detector: ConeDetector::new(
                ConeColor::Blue,
                detection.blue.min_area,
                detection.min_separation,
            ),
            yellow_detector: ConeDetector::new(
                ConeColor::Yellow,
                detection.yellow.min_area,
                detection.min_separation,
            ),
            estimator: SteeringEstimator::new(configuration.steering),
            evaluator: AccuracyEvaluator::default(),
            state: PipelineState::new(),
            reference,
            annotation_dir: configuration.annotation_dir.clone(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn report(&self) -> AccuracyReport {
        self.state.tally.report()
    }

    #[instrument(skip_all, fields(frame_id = %frame.frame_id()))]
    pub fn process(&mut self, frame: Frame) -> FrameRecord {
        // takes effect before scoring, so a frame never sees a value recorded after it
        if let Some(value) = frame.reference() {
            self.reference.set(value);
        }
        let context = self.segment(FrameContext::new(frame));
        let context = self.detect(context);
        let context = self.estimate(context);
        self.score(context)
    }

    fn segment(&self, context: FrameContext<IngestedState>) -> FrameContext<SegmentedState> {
        let masks = self.segmenter.segment(context.frame().image());
        context.into_segmented(masks)
    }

    fn detect(&self, context: FrameContext<SegmentedState>) -> FrameContext<DetectedState> {
        let blue = self.blue_detector.detect(&context.masks().blue);
        let yellow = self.yellow_detector.detect(&context.masks().yellow);
        debug!(blue = blue.len(), yellow = yellow.len(), "Cones detected");
        context.into_detected(blue, yellow)
    }

    fn estimate(&mut self, context: FrameContext<DetectedState>) -> FrameContext<EstimatedState> {
        let estimate =
            self.estimator
                .estimate(context.blue(), context.yellow(), &mut self.state.orientation);
        context.into_estimated(estimate)
    }

    fn score(&mut self, context: FrameContext<EstimatedState>) -> FrameRecord {
        let estimate = context.estimate();
        let reference = self.reference.get();
        let verdict = self.evaluator.score(
            &mut self.state.tally,
            estimate.case,
            reference,
            estimate.angle,
        );

        if let Some(dir) = &self.annotation_dir {
            if let Err(e) = Self::write_annotation(dir, &context) {
                warn!("Failed to write annotated frame to {}: {}", dir.display(), e);
            }
        }

        let metrics = context.metrics();
        debug!(
            case = %estimate.case,
            angle = estimate.angle,
            reference = ?reference,
            verdict = ?verdict,
            segmentation_us = metrics.segmentation_us(),
            detection_us = metrics.detection_us(),
            estimation_us = metrics.estimation_us(),
            "Frame scored"
        );

        FrameRecord {
            source_id: self.source_id.clone(),
            timestamp_micros: context.frame().timestamp_micros(),
            estimate,
            verdict,
        }
    }

    fn write_annotation(
        dir: &Path,
        context: &FrameContext<EstimatedState>,
    ) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(dir)?;
        let mut image = context.frame().image().clone();
        annotate(&mut image, context.blue());
        annotate(&mut image, context.yellow());
        let path = dir.join(format!(
            "{}_{}.png",
            context.frame().timestamp_micros(),
            context.frame().frame_id()
        ));
        image.save(&path)?;
        Ok(path)
    }
}

impl Service<Frame> for SteeringPipeline {
    type Response = FrameRecord;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, frame: Frame) -> Self::Future {
        let record = self.process(frame);
        Box::pin(async move { Ok(record) })
    }
}
