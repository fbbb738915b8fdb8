use async_trait::async_trait;

use crate::common::Frame;
use crate::error::IntakeError;

/// Supplies frames to the pipeline, one per call. `Ok(None)` ends the run.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Result<Option<Frame>, IntakeError>;
    fn name(&self) -> &'static str;
}
