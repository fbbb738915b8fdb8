pub mod frame_source;
pub mod recording_source;
pub mod reference_log;

pub use frame_source::FrameSource;
pub use recording_source::RecordingSource;
pub use reference_log::{ReferenceEntry, ReferenceLog};
