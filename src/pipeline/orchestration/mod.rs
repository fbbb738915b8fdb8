pub mod pipeline_state;
pub mod steering_pipeline;

pub use pipeline_state::PipelineState;
pub use steering_pipeline::SteeringPipeline;
