use std::collections::VecDeque;
use std::path::Path;

use tracing::warn;

use crate::error::IntakeError;

const COMMENT_PREFIX: char = '#';
const FIELD_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceEntry {
    pub timestamp_micros: i64,
    pub value: f32,
}

/// Recorded reference steering values, attached to frames as they are replayed.
///
/// Each line is `<timestamp_micros>;<value>`. Blank lines and `#` comments are ignored,
/// malformed lines are logged and skipped.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLog {
    entries: VecDeque<ReferenceEntry>,
}

impl ReferenceLog {
    pub async fn load(path: &Path) -> Result<Self, IntakeError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| IntakeError::ReadReference(e, path.to_path_buf()))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = line.trim();
                if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                    return None;
                }
                let entry = Self::parse_line(line);
                if entry.is_none() {
                    warn!("Skipping malformed reference line {}: '{}'", index + 1, line);
                }
                entry
            })
            .collect();
        Self { entries }
    }

    fn parse_line(line: &str) -> Option<ReferenceEntry> {
        let (timestamp, value) = line.split_once(FIELD_SEPARATOR)?;
        Some(ReferenceEntry {
            timestamp_micros: timestamp.trim().parse().ok()?,
            value: value.trim().parse().ok()?,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes every pending entry stamped at or before `timestamp_micros` and returns the value
    /// of the last one, which is the reference in force at that time.
    pub fn take_until(&mut self, timestamp_micros: i64) -> Option<f32> {
        let mut latest = None;
        while let Some(entry) = self
            .entries
            .front()
            .copied()
            .filter(|entry| entry.timestamp_micros <= timestamp_micros)
        {
            latest = Some(entry.value);
            self.entries.pop_front();
        }
        latest
    }
}
