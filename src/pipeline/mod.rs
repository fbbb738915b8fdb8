pub mod context;
pub mod domain;
pub mod orchestration;
pub mod services;

pub use domain::{Centroid, ConeColor, ConeObservation, FrameRecord, SteeringCase, SteeringEstimate};
pub use orchestration::{PipelineState, SteeringPipeline};
pub use services::{AccuracyReport, ReferenceCell};
