use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::{RgbImage, imageops};
use tracing::{info, warn};
use uuid::Uuid;

use crate::common::Frame;
use crate::config::{Configuration, RegionOfInterest};
use crate::error::IntakeError;
use crate::intake::frame_source::FrameSource;
use crate::intake::reference_log::ReferenceLog;

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "ppm"];

/// Replays a recorded drive: image files from a directory, in file name order, each carrying the
/// reference value recorded at or before its capture time.
///
/// A file stem that parses as an integer is taken as the capture time in microseconds.
pub struct RecordingSource {
    pending: VecDeque<PathBuf>,
    region_of_interest: Option<RegionOfInterest>,
    reference_log: ReferenceLog,
}

impl RecordingSource {
    pub async fn open(configuration: &Configuration) -> Result<Self, IntakeError> {
        let pending = Self::list_frames(&configuration.frames_dir).await?;
        let reference_log = match &configuration.reference_path {
            Some(path) => ReferenceLog::load(path).await?,
            None => ReferenceLog::default(),
        };
        info!(
            "Replaying {} frames from {} with {} reference values",
            pending.len(),
            configuration.frames_dir.display(),
            reference_log.len()
        );

        Ok(Self {
            pending,
            region_of_interest: configuration.region_of_interest,
            reference_log,
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    async fn list_frames(dir: &Path) -> Result<VecDeque<PathBuf>, IntakeError> {
        let read_error = |e| IntakeError::ReadDirectory(e, dir.to_path_buf());
        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_error)?;

        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            if is_frame_file(&path) {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames.into())
    }

    fn capture_time(path: &Path) -> DateTime<Utc> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_micros)
            .unwrap_or_else(Utc::now)
    }

    fn crop(&self, image: RgbImage) -> Option<RgbImage> {
        let Some(region) = self.region_of_interest else {
            return Some(image);
        };
        let region = region.clamp_to(image.width(), image.height())?;
        Some(imageops::crop_imm(&image, region.x, region.y, region.width, region.height).to_image())
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

#[async_trait]
impl FrameSource for RecordingSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, IntakeError> {
        while let Some(path) = self.pending.pop_front() {
            let decode_path = path.clone();
            let decoded = tokio::task::spawn_blocking(move || {
                image::open(&decode_path).map(|image| image.to_rgb8())
            })
            .await
            .map_err(|e| IntakeError::DecodeTask(e.to_string()))?;

            let image = match decoded {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping unreadable frame {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(image) = self.crop(image) else {
                warn!(
                    "Skipping frame {}: region of interest lies outside the image",
                    path.display()
                );
                continue;
            };

            let captured_at = Self::capture_time(&path);
            let mut frame = Frame::new(image, captured_at, Uuid::new_v4());
            if let Some(value) = self.reference_log.take_until(frame.timestamp_micros()) {
                frame = frame.with_reference(value);
            }
            return Ok(Some(frame));
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
