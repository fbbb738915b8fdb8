use crate::pipeline::domain::{ConeObservation, SteeringEstimate};
use crate::pipeline::services::ColorMasks;

// Markers to track the state of the frame processing pipeline
pub struct IngestedState;
pub struct SegmentedState {
    pub(super) masks: ColorMasks,
}
pub struct DetectedState {
    pub(super) blue: ConeObservation,
    pub(super) yellow: ConeObservation,
}
pub struct EstimatedState {
    pub(super) blue: ConeObservation,
    pub(super) yellow: ConeObservation,
    pub(super) estimate: SteeringEstimate,
}

pub trait ProcessingState: 'static {
    fn state_name() -> &'static str;
}

impl ProcessingState for IngestedState {
    fn state_name() -> &'static str {
        "Ingested"
    }
}

impl ProcessingState for SegmentedState {
    fn state_name() -> &'static str {
        "Segmented"
    }
}

impl ProcessingState for DetectedState {
    fn state_name() -> &'static str {
        "Detected"
    }
}

impl ProcessingState for EstimatedState {
    fn state_name() -> &'static str {
        "Estimated"
    }
}
