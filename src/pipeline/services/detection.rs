use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::point::Point;
use tracing::trace;

use crate::pipeline::domain::{Centroid, ConeColor, ConeObservation};

const MARKER_RADIUS: i32 = 4;
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Spatial moments of a closed polygon, up to first order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Green's theorem over the contour, treating the point list as a closed polygon.
    pub fn of_polygon(points: &[Point<i32>]) -> Self {
        let mut moments = Moments {
            m00: 0.0,
            m10: 0.0,
            m01: 0.0,
        };
        if points.len() < 3 {
            return moments;
        }

        for (current, next) in points.iter().zip(points.iter().cycle().skip(1)) {
            let (x0, y0) = (f64::from(current.x), f64::from(current.y));
            let (x1, y1) = (f64::from(next.x), f64::from(next.y));
            let cross = x0 * y1 - x1 * y0;
            moments.m00 += cross;
            moments.m10 += (x0 + x1) * cross;
            moments.m01 += (y0 + y1) * cross;
        }

        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        moments
    }

    /// Enclosed area regardless of the contour's winding direction.
    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    /// `None` for degenerate (zero-area) regions.
    pub fn centroid(&self) -> Option<Centroid> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Centroid::new(
            (self.m10 / self.m00) as f32,
            (self.m01 / self.m00) as f32,
        ))
    }
}

/// Turns a binary mask into at most two cone centroids of one color.
#[derive(Debug, Clone)]
pub struct ConeDetector {
    color: ConeColor,
    min_area: f64,
    min_separation: f32,
}

impl ConeDetector {
    pub fn new(color: ConeColor, min_area: f64, min_separation: f32) -> Self {
        Self {
            color,
            min_area,
            min_separation,
        }
    }

    pub fn color(&self) -> ConeColor {
        self.color
    }

    pub fn detect(&self, mask: &GrayImage) -> ConeObservation {
        let mut observation = ConeObservation::new(self.color);

        // nearest first: contours are discovered top to bottom, cones closer to the car sit lower
        let outer_borders: Vec<_> = find_contours::<i32>(mask)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .collect();

        for contour in outer_borders.into_iter().rev() {
            if observation.is_full() {
                break;
            }

            let moments = Moments::of_polygon(&contour.points);
            if moments.area() <= self.min_area {
                continue;
            }
            let Some(centroid) = moments.centroid() else {
                continue;
            };

            if !observation.offer(centroid, self.min_separation) {
                trace!(
                    color = %self.color,
                    x = centroid.x,
                    y = centroid.y,
                    "Dropping centroid too close to the first {} cone",
                    self.color
                );
            }
        }

        observation
    }
}

/// Marks every accepted centroid with a filled dot.
pub fn annotate(image: &mut RgbImage, observation: &ConeObservation) {
    for centroid in observation.iter() {
        draw_filled_circle_mut(
            image,
            (centroid.x.round() as i32, centroid.y.round() as i32),
            MARKER_RADIUS,
            MARKER_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::SteeringCase;
    use crate::pipeline::services::{OrientationMemory, SteeringEstimator};
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn mask_with(rects: &[(i32, i32, u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(320, 240);
        for &(x, y, w, h) in rects {
            draw_filled_rect_mut(&mut mask, Rect::at(x, y).of_size(w, h), Luma([255u8]));
        }
        mask
    }

    fn detector() -> ConeDetector {
        ConeDetector::new(ConeColor::Blue, 20.0, 30.0)
    }

    #[test]
    fn polygon_moments_of_a_square() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let moments = Moments::of_polygon(&square);
        assert_eq!(moments.area(), 100.0);
        assert_eq!(moments.centroid(), Some(Centroid::new(5.0, 5.0)));
    }

    #[test]
    fn winding_direction_does_not_change_centroid() {
        let square = [
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(10, 10),
            Point::new(10, 0),
        ];
        let moments = Moments::of_polygon(&square);
        assert!(moments.m00 < 0.0);
        assert_eq!(moments.area(), 100.0);
        assert_eq!(moments.centroid(), Some(Centroid::new(5.0, 5.0)));
    }

    #[test]
    fn degenerate_contours_have_no_centroid() {
        assert_eq!(Moments::of_polygon(&[Point::new(3, 3)]).centroid(), None);
        let line = [Point::new(0, 0), Point::new(5, 0), Point::new(9, 0)];
        assert_eq!(Moments::of_polygon(&line).centroid(), None);
    }

    #[test]
    fn empty_mask_yields_no_cones() {
        let observation = detector().detect(&GrayImage::new(64, 64));
        assert!(observation.is_empty());
        assert_eq!(observation.first(), None);
        assert_eq!(observation.second(), None);
    }

    #[test]
    fn finds_centroid_of_a_blob() {
        let observation = detector().detect(&mask_with(&[(100, 50, 21, 21)]));
        assert_eq!(observation.len(), 1);
        let centroid = observation.first().unwrap();
        assert!((centroid.x - 110.0).abs() < 1e-3);
        assert!((centroid.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn small_blobs_are_ignored() {
        // a 5x5 blob traces a 4x4 boundary polygon: area 16, below the threshold
        let observation = detector().detect(&mask_with(&[(10, 10, 5, 5)]));
        assert!(observation.is_empty());

        // exactly at the threshold is still noise
        let observation = ConeDetector::new(ConeColor::Blue, 16.0, 30.0)
            .detect(&mask_with(&[(10, 10, 5, 5)]));
        assert!(observation.is_empty());
    }

    #[test]
    fn two_distant_blobs_fill_both_slots() {
        let observation = detector().detect(&mask_with(&[(20, 20, 15, 15), (200, 150, 15, 15)]));
        assert!(observation.is_full());
        let (first, second) = observation.pair().unwrap();
        assert!(first.is_separated_from(second, 30.0));
    }

    #[test]
    fn lower_blob_takes_the_first_slot() {
        let mut mask = GrayImage::new(640, 140);
        draw_filled_rect_mut(&mut mask, Rect::at(300, 10).of_size(12, 12), Luma([255u8]));
        draw_filled_rect_mut(&mut mask, Rect::at(100, 110).of_size(20, 20), Luma([255u8]));

        let observation = detector().detect(&mask);
        let (first, second) = observation.pair().unwrap();
        assert!((first.x - 109.5).abs() < 1e-3);
        assert!((first.y - 119.5).abs() < 1e-3);
        assert!((second.x - 305.5).abs() < 1e-3);
        assert!((second.y - 15.5).abs() < 1e-3);
    }

    #[test]
    fn blue_pair_steers_from_the_near_cone() {
        let mut mask = GrayImage::new(640, 140);
        draw_filled_rect_mut(&mut mask, Rect::at(300, 10).of_size(12, 12), Luma([255u8]));
        draw_filled_rect_mut(&mut mask, Rect::at(100, 110).of_size(20, 20), Luma([255u8]));

        let blue = detector().detect(&mask);
        let yellow = ConeObservation::new(ConeColor::Yellow);
        let estimate = SteeringEstimator::default().estimate(
            &blue,
            &yellow,
            &mut OrientationMemory::new(),
        );

        assert_eq!(estimate.case, SteeringCase::BluePair);
        // (109.5 - 305.5) * 0.0005
        assert!((estimate.angle - -0.098).abs() < 1e-4);
    }

    #[test]
    fn nearby_blobs_count_once() {
        let observation = detector().detect(&mask_with(&[(100, 100, 12, 12), (116, 110, 12, 12)]));
        assert_eq!(observation.len(), 1);
    }

    #[test]
    fn at_most_two_cones_are_kept() {
        let observation = detector().detect(&mask_with(&[
            (10, 10, 12, 12),
            (100, 10, 12, 12),
            (200, 10, 12, 12),
            (10, 150, 12, 12),
        ]));
        assert_eq!(observation.len(), 2);
    }

    #[test]
    fn holes_do_not_produce_extra_cones() {
        let mut mask = mask_with(&[(50, 50, 60, 60)]);
        draw_filled_rect_mut(&mut mask, Rect::at(70, 70).of_size(20, 20), Luma([0u8]));
        let observation = detector().detect(&mask);
        assert_eq!(observation.len(), 1);
    }

    #[test]
    fn annotation_marks_centroids() {
        let mut image = RgbImage::new(64, 64);
        let mut observation = ConeObservation::new(ConeColor::Yellow);
        observation.offer(Centroid::new(20.0, 30.0), 30.0);
        annotate(&mut image, &observation);
        assert_eq!(*image.get_pixel(20, 30), MARKER_COLOR);
        assert_eq!(*image.get_pixel(60, 60), Rgb([0, 0, 0]));
    }
}
