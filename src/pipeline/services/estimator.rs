use serde::Deserialize;

use crate::pipeline::domain::{Centroid, ConeObservation, SteeringCase, SteeringEstimate};
use crate::pipeline::services::orientation::{Orientation, OrientationMemory};

/// Geometry and gains of the steering heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    pub frame_width: f32,
    /// Height used to flip y so that it grows away from the car.
    pub frame_height: f32,
    /// Gain on the offset of the blue/yellow midpoint from the image center.
    pub midpoint_gain: f32,
    /// Gain on the horizontal spread of a blue pair.
    pub pair_gain: f32,
    /// Flipped y below which a blue pair is too close to steer on.
    pub near_field_cutoff: f32,
    pub slope_gain: f32,
    pub slope_scale: f32,
    /// Gain on the distance of a lone cone from the image edge.
    pub single_gain: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            frame_width: 640.0,
            frame_height: 480.0,
            midpoint_gain: 0.00035,
            pair_gain: 0.0005,
            near_field_cutoff: 70.0,
            slope_gain: 0.18,
            slope_scale: 100.0,
            single_gain: 0.0000100,
        }
    }
}

impl SteeringParams {
    pub fn half_width(&self) -> f32 {
        self.frame_width / 2.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.frame_width <= 0.0 || self.frame_height <= 0.0 {
            return Err("frame dimensions must be greater than 0".to_string());
        }
        if self.slope_scale == 0.0 {
            return Err("slope_scale must not be 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SteeringEstimator {
    params: SteeringParams,
}

impl SteeringEstimator {
    pub fn new(params: SteeringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SteeringParams {
        &self.params
    }

    /// Picks the first matching case and applies its formula. Seeing both colors refreshes the
    /// orientation memory; the single-cone cases read it.
    pub fn estimate(
        &self,
        blue: &ConeObservation,
        yellow: &ConeObservation,
        orientation: &mut OrientationMemory,
    ) -> SteeringEstimate {
        let case = SteeringCase::classify(blue, yellow);
        let angle = match (case, blue.first(), yellow.first()) {
            (SteeringCase::BothColors, Some(b), Some(y)) => {
                orientation.observe_both_visible(b.x, y.x);
                self.midpoint(b, y)
            }
            (SteeringCase::BluePair, ..) => blue
                .pair()
                .map_or(0.0, |(first, second)| self.blue_pair(first, second)),
            (SteeringCase::YellowPair, ..) => yellow
                .pair()
                .map_or(0.0, |(first, second)| self.yellow_pair(first, second)),
            (SteeringCase::SingleBlue, Some(b), _) => {
                self.single(b.x, orientation.read(), Orientation::YellowLeft)
            }
            (SteeringCase::SingleYellow, _, Some(y)) => {
                self.single(y.x, orientation.read(), Orientation::YellowRight)
            }
            _ => 0.0,
        };
        SteeringEstimate::new(angle, case)
    }

    fn midpoint(&self, blue: &Centroid, yellow: &Centroid) -> f32 {
        ((blue.x + yellow.x) / 2.0 - self.params.half_width()) * self.params.midpoint_gain
    }

    fn blue_pair(&self, first: &Centroid, second: &Centroid) -> f32 {
        let y0 = self.params.frame_height - first.y;
        let y1 = self.params.frame_height - second.y;
        if y0 == y1 || y0 < self.params.near_field_cutoff {
            return 0.0;
        }
        (first.x - second.x) * self.params.pair_gain
    }

    fn yellow_pair(&self, first: &Centroid, second: &Centroid) -> f32 {
        let y0 = self.params.frame_height - first.y;
        let y1 = self.params.frame_height - second.y;
        if y0 == y1 {
            return 0.0;
        }
        let inverse_slope = -(first.x - second.x) / (y0 - y1);
        (inverse_slope / self.params.slope_scale).atan() * self.params.slope_gain
    }

    /// A lone cone steers away from the far image edge when it sits on the side given by
    /// `far_side`, and towards the near edge otherwise. Without a known orientation the cone's
    /// screen half decides.
    fn single(&self, x: f32, orientation: Option<Orientation>, far_side: Orientation) -> f32 {
        let steer_from_far_edge = match orientation {
            Some(known) => known == far_side,
            None => x > self.params.half_width(),
        };
        if steer_from_far_edge {
            (self.params.frame_width - x) * self.params.single_gain
        } else {
            -x * self.params.single_gain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::ConeColor;

    const EPSILON: f32 = 1e-6;

    fn cones(color: ConeColor, points: &[(f32, f32)]) -> ConeObservation {
        let mut observation = ConeObservation::new(color);
        for &(x, y) in points {
            assert!(observation.offer(Centroid::new(x, y), 30.0));
        }
        observation
    }

    fn blue(points: &[(f32, f32)]) -> ConeObservation {
        cones(ConeColor::Blue, points)
    }

    fn yellow(points: &[(f32, f32)]) -> ConeObservation {
        cones(ConeColor::Yellow, points)
    }

    fn estimate(
        blue: &ConeObservation,
        yellow: &ConeObservation,
        orientation: &mut OrientationMemory,
    ) -> SteeringEstimate {
        SteeringEstimator::default().estimate(blue, yellow, orientation)
    }

    #[test]
    fn both_colors_use_the_midpoint() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(
            &blue(&[(100.0, 200.0)]),
            &yellow(&[(300.0, 200.0)]),
            &mut orientation,
        );
        assert_eq!(result.case, SteeringCase::BothColors);
        assert!((result.angle - -0.042).abs() < EPSILON);
        assert_eq!(orientation.read(), Some(Orientation::YellowRight));
    }

    #[test]
    fn both_colors_take_priority_over_pairs() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(
            &blue(&[(500.0, 100.0), (600.0, 300.0)]),
            &yellow(&[(140.0, 200.0), (40.0, 300.0)]),
            &mut orientation,
        );
        assert_eq!(result.case, SteeringCase::BothColors);
        assert!((result.angle - 0.0).abs() < EPSILON);
        assert_eq!(orientation.read(), Some(Orientation::YellowLeft));
    }

    #[test]
    fn blue_pair_uses_horizontal_spread() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(
            &blue(&[(400.0, 300.0), (300.0, 100.0)]),
            &yellow(&[]),
            &mut orientation,
        );
        assert_eq!(result.case, SteeringCase::BluePair);
        assert!((result.angle - 0.05).abs() < EPSILON);
        assert!(!orientation.is_known());
    }

    #[test]
    fn blue_pair_too_close_or_level_goes_straight() {
        let mut orientation = OrientationMemory::new();
        // flipped y of the first cone is 480 - 420 = 60, under the cutoff
        let near = estimate(
            &blue(&[(400.0, 420.0), (300.0, 100.0)]),
            &yellow(&[]),
            &mut orientation,
        );
        assert_eq!(near.case, SteeringCase::BluePair);
        assert_eq!(near.angle, 0.0);

        let level = estimate(
            &blue(&[(400.0, 200.0), (300.0, 200.0)]),
            &yellow(&[]),
            &mut orientation,
        );
        assert_eq!(level.angle, 0.0);
    }

    #[test]
    fn yellow_pair_uses_arctangent_of_inverse_slope() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(
            &blue(&[]),
            &yellow(&[(200.0, 300.0), (300.0, 100.0)]),
            &mut orientation,
        );
        assert_eq!(result.case, SteeringCase::YellowPair);
        // flipped y: 180 and 380, inverse slope -(200 - 300) / (180 - 380) = -0.5
        let expected = (-0.5f32 / 100.0).atan() * 0.18;
        assert!((result.angle - expected).abs() < EPSILON);
    }

    #[test]
    fn yellow_pair_level_goes_straight() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(
            &blue(&[]),
            &yellow(&[(200.0, 250.0), (300.0, 250.0)]),
            &mut orientation,
        );
        assert_eq!(result.case, SteeringCase::YellowPair);
        assert_eq!(result.angle, 0.0);
    }

    #[test]
    fn single_blue_without_orientation_uses_screen_side() {
        let mut orientation = OrientationMemory::new();
        let right = estimate(&blue(&[(500.0, 200.0)]), &yellow(&[]), &mut orientation);
        assert_eq!(right.case, SteeringCase::SingleBlue);
        assert!((right.angle - 140.0 * 0.00001).abs() < EPSILON);

        let left = estimate(&blue(&[(320.0, 200.0)]), &yellow(&[]), &mut orientation);
        assert!((left.angle - -320.0 * 0.00001).abs() < EPSILON);
    }

    #[test]
    fn single_blue_follows_known_orientation() {
        let mut orientation = OrientationMemory::new();
        orientation.observe_both_visible(500.0, 100.0);
        let result = estimate(&blue(&[(100.0, 200.0)]), &yellow(&[]), &mut orientation);
        assert!((result.angle - 540.0 * 0.00001).abs() < EPSILON);

        orientation.observe_both_visible(100.0, 500.0);
        let result = estimate(&blue(&[(500.0, 200.0)]), &yellow(&[]), &mut orientation);
        assert!((result.angle - -500.0 * 0.00001).abs() < EPSILON);
    }

    #[test]
    fn single_yellow_mirrors_single_blue() {
        let mut orientation = OrientationMemory::new();
        let unknown = estimate(&blue(&[]), &yellow(&[(600.0, 200.0)]), &mut orientation);
        assert_eq!(unknown.case, SteeringCase::SingleYellow);
        assert!((unknown.angle - 40.0 * 0.00001).abs() < EPSILON);

        orientation.observe_both_visible(500.0, 100.0);
        let yellow_left = estimate(&blue(&[]), &yellow(&[(600.0, 200.0)]), &mut orientation);
        assert!((yellow_left.angle - -600.0 * 0.00001).abs() < EPSILON);

        orientation.observe_both_visible(100.0, 500.0);
        let yellow_right = estimate(&blue(&[]), &yellow(&[(100.0, 200.0)]), &mut orientation);
        assert!((yellow_right.angle - 540.0 * 0.00001).abs() < EPSILON);
    }

    #[test]
    fn no_cones_go_straight() {
        let mut orientation = OrientationMemory::new();
        let result = estimate(&blue(&[]), &yellow(&[]), &mut orientation);
        assert_eq!(result, SteeringEstimate::new(0.0, SteeringCase::NoCones));
        assert!(!orientation.is_known());
    }

    #[test]
    fn orientation_stays_known_through_other_cases() {
        let mut orientation = OrientationMemory::new();
        estimate(&blue(&[(400.0, 200.0)]), &yellow(&[(100.0, 200.0)]), &mut orientation);
        for _ in 0..3 {
            estimate(&blue(&[]), &yellow(&[]), &mut orientation);
            estimate(&blue(&[(10.0, 10.0)]), &yellow(&[]), &mut orientation);
            assert!(orientation.is_known());
        }
    }
}
