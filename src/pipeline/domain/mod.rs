pub mod cone;
pub mod steering;

pub use cone::{Centroid, ConeColor, ConeObservation, MAX_CONES_PER_COLOR};
pub use steering::{FrameRecord, SteeringCase, SteeringEstimate};
