use chrono::{DateTime, Utc};
use image::RgbImage;
use std::sync::Arc;
use uuid::Uuid;

/// One captured camera frame, already cropped to the region of interest.
#[derive(Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
    reference: Option<f32>,
}

impl Frame {
    pub fn new(image: RgbImage, captured_at: DateTime<Utc>, frame_id: Uuid) -> Self {
        Self {
            image: Arc::new(image),
            captured_at,
            frame_id,
            reference: None,
        }
    }

    /// Attaches the latest reference value recorded at or before this frame's capture time.
    pub fn with_reference(mut self, value: f32) -> Self {
        self.reference = Some(value);
        self
    }

    /// Frame captured now, with a fresh id.
    pub fn capture(image: RgbImage) -> Self {
        Self::new(image, Utc::now(), Uuid::new_v4())
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn timestamp_micros(&self) -> i64 {
        self.captured_at.timestamp_micros()
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn reference(&self) -> Option<f32> {
        self.reference
    }
}
