use std::sync::{Arc, Mutex, PoisonError};

/// Latest externally measured steering value. Written from any thread, read once per frame.
/// No history is kept: the last write wins.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCell {
    value: Arc<Mutex<Option<f32>>>,
}

impl ReferenceCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f32) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// `None` until the first value has been delivered.
    pub fn get(&self) -> Option<f32> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
