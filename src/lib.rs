pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod pipeline;

pub use error::{AppError, ConfigError, IntakeError};

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use intake::{FrameSource, RecordingSource};
pub use pipeline::{AccuracyReport, FrameRecord, ReferenceCell, SteeringPipeline};
