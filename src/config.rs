use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::error::ConfigError;
use crate::pipeline::services::estimator::SteeringParams;
use crate::pipeline::services::segmentation::HsvRange;

const CONFIG_PATH_ENV: &str = "CONE_STEERING_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "cone-steering.toml";
const ENV_PREFIX: &str = "CONE_STEERING";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub source_id: String,
    pub frames_dir: PathBuf,
    pub reference_path: Option<PathBuf>,
    pub frame_buffer_size: usize,
    pub region_of_interest: Option<RegionOfInterest>,
    pub annotation_dir: Option<PathBuf>,
    pub log_level: String,
    pub detection: DetectionConfig,
    pub steering: SteeringParams,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source_id: "group_08".to_string(),
            frames_dir: PathBuf::from("frames"),
            reference_path: None,
            frame_buffer_size: 60,
            region_of_interest: None,
            annotation_dir: None,
            log_level: "info".to_string(),
            detection: DetectionConfig::default(),
            steering: SteeringParams::default(),
        }
    }
}

/// Rectangle cropped out of every frame by the intake before it reaches the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RegionOfInterest {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionOfInterest {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersection with an image of the given size, `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<RegionOfInterest> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = Self::new(
            self.x,
            self.y,
            self.width.min(width - self.x),
            self.height.min(height - self.y),
        );
        (clamped.width > 0 && clamped.height > 0).then_some(clamped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub blue: ColorProfile,
    pub yellow: ColorProfile,
    /// Per-axis pixel distance two same-colored cones must exceed to count as distinct.
    pub min_separation: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blue: ColorProfile::blue(),
            yellow: ColorProfile::yellow(),
            min_separation: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorProfile {
    pub range: HsvRange,
    /// Contours enclosing this area or less are treated as noise.
    pub min_area: f64,
}

impl ColorProfile {
    pub fn blue() -> Self {
        Self {
            range: HsvRange::BLUE,
            min_area: 20.0,
        }
    }

    pub fn yellow() -> Self {
        Self {
            range: HsvRange::YELLOW,
            min_area: 40.0,
        }
    }
}

impl Configuration {
    /// Loads the configuration file named by `CONE_STEERING_CONFIG` (or `cone-steering.toml`),
    /// then applies `CONE_STEERING__*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let configuration: Configuration = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn tracing_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_id.trim().is_empty() {
            return Err(ConfigError::invalid("source_id", "must not be empty"));
        }

        if self.frame_buffer_size == 0 {
            return Err(ConfigError::invalid(
                "frame_buffer_size",
                "must be greater than 0",
            ));
        }

        if self.log_level.parse::<Level>().is_err() {
            return Err(ConfigError::invalid(
                "log_level",
                format!("unknown level '{}'", self.log_level),
            ));
        }

        if let Some(roi) = &self.region_of_interest {
            if roi.width == 0 || roi.height == 0 {
                return Err(ConfigError::invalid(
                    "region_of_interest",
                    "width and height must be greater than 0",
                ));
            }
        }

        for (field, profile) in [
            ("detection.blue", &self.detection.blue),
            ("detection.yellow", &self.detection.yellow),
        ] {
            if !profile.range.is_ordered() {
                return Err(ConfigError::invalid(
                    field,
                    "range low bound exceeds high bound",
                ));
            }
            if profile.min_area < 0.0 {
                return Err(ConfigError::invalid(field, "min_area must not be negative"));
            }
        }

        if self.detection.min_separation <= 0.0 {
            return Err(ConfigError::invalid(
                "detection.min_separation",
                "must be greater than 0",
            ));
        }

        self.steering
            .validate()
            .map_err(|reason| ConfigError::invalid("steering", reason))
    }
}
