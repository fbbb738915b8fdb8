pub mod accuracy;
pub mod detection;
pub mod estimator;
pub mod orientation;
pub mod reference;
pub mod segmentation;

pub use accuracy::{
    AccuracyEvaluator, AccuracyReport, AccuracyTally, CaseTally, ToleranceRule,
    is_within_tolerance,
};
pub use detection::{ConeDetector, Moments};
pub use estimator::{SteeringEstimator, SteeringParams};
pub use orientation::{Orientation, OrientationMemory};
pub use reference::ReferenceCell;
pub use segmentation::{ColorMasks, ColorSegmenter, Hsv, HsvRange};
