use image::{GrayImage, Luma, RgbImage};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use serde::Deserialize;

const MASK_ON: u8 = 255;

/// Hue/saturation/value triple on the 8-bit scale: hue in `[0, 180)`, the others in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = i32::from(max - min);

        let s = if max == 0 {
            0
        } else {
            ((255.0 * delta as f32) / f32::from(max)).round() as u8
        };

        let h = if delta == 0 {
            0
        } else {
            let (r, g, b, max) = (i32::from(r), i32::from(g), i32::from(b), i32::from(max));
            // sixths of the color wheel, scaled by delta
            let sector = if max == r {
                g - b
            } else if max == g {
                b - r + 2 * delta
            } else {
                r - g + 4 * delta
            };
            let hue = (30.0 * sector as f32 / delta as f32).round() as i32;
            let hue = if hue < 0 { hue + 180 } else { hue };
            (hue % 180) as u8
        };

        Self { h, s, v: max }
    }
}

/// Inclusive range on all three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HsvRange {
    pub low: Hsv,
    pub high: Hsv,
}

impl HsvRange {
    pub const BLUE: HsvRange = HsvRange::new(Hsv::new(100, 100, 40), Hsv::new(133, 255, 255));
    pub const YELLOW: HsvRange = HsvRange::new(Hsv::new(15, 50, 130), Hsv::new(25, 185, 255));

    pub const fn new(low: Hsv, high: Hsv) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.low.h..=self.high.h).contains(&hsv.h)
            && (self.low.s..=self.high.s).contains(&hsv.s)
            && (self.low.v..=self.high.v).contains(&hsv.v)
    }

    pub fn is_ordered(&self) -> bool {
        self.low.h <= self.high.h && self.low.s <= self.high.s && self.low.v <= self.high.v
    }
}

pub struct ColorMasks {
    pub blue: GrayImage,
    pub yellow: GrayImage,
}

enum Morphology {
    Dilate(Mask),
    Erode(Mask),
}

impl Morphology {
    fn apply(&self, mask: &GrayImage) -> GrayImage {
        match self {
            Morphology::Dilate(element) => grayscale_dilate(mask, element),
            Morphology::Erode(element) => grayscale_erode(mask, element),
        }
    }
}

/// Splits a frame into blue and yellow binary masks and cleans them up.
///
/// Cleanup is a closing (dilate 8x8, erode 8x8) that fills holes inside a cone's blob, followed by
/// an opening (erode 5x5, dilate 7x7) that removes speckle smaller than a cone. All structuring
/// elements are ellipses inscribed in their box.
pub struct ColorSegmenter {
    blue: HsvRange,
    yellow: HsvRange,
    cleanup: Vec<Morphology>,
}

impl ColorSegmenter {
    pub fn new(blue: HsvRange, yellow: HsvRange) -> Self {
        Self {
            blue,
            yellow,
            cleanup: vec![
                Morphology::Dilate(elliptical_element(8, 8)),
                Morphology::Erode(elliptical_element(8, 8)),
                Morphology::Erode(elliptical_element(5, 5)),
                Morphology::Dilate(elliptical_element(7, 7)),
            ],
        }
    }

    pub fn segment(&self, frame: &RgbImage) -> ColorMasks {
        let (blue, yellow) = self.threshold(frame);
        ColorMasks {
            blue: self.clean(blue),
            yellow: self.clean(yellow),
        }
    }

    /// Raw range masks without morphological cleanup.
    pub fn threshold(&self, frame: &RgbImage) -> (GrayImage, GrayImage) {
        let (width, height) = frame.dimensions();
        let mut blue = GrayImage::new(width, height);
        let mut yellow = GrayImage::new(width, height);

        for (x, y, pixel) in frame.enumerate_pixels() {
            let hsv = Hsv::from_rgb(pixel[0], pixel[1], pixel[2]);
            if self.blue.contains(hsv) {
                blue.put_pixel(x, y, Luma([MASK_ON]));
            }
            if self.yellow.contains(hsv) {
                yellow.put_pixel(x, y, Luma([MASK_ON]));
            }
        }

        (blue, yellow)
    }

    fn clean(&self, mask: GrayImage) -> GrayImage {
        self.cleanup
            .iter()
            .fold(mask, |mask, operation| operation.apply(&mask))
    }
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::new(HsvRange::BLUE, HsvRange::YELLOW)
    }
}

/// Ellipse inscribed in a `width` x `height` box, anchored at `(width / 2, height / 2)`.
fn elliptical_element(width: u32, height: u32) -> Mask {
    let (cx, cy) = (width / 2, height / 2);
    let (cxf, cyf) = (cx as f32, cy as f32);
    let inv_r2 = if cy > 0 { 1.0 / (cyf * cyf) } else { 0.0 };

    let mut element = GrayImage::new(width, height);
    for row in 0..height {
        let dy = row as f32 - cyf;
        if dy.abs() > cyf {
            continue;
        }
        let half_span = (cxf * ((cyf * cyf - dy * dy) * inv_r2).sqrt()).round() as u32;
        let start = cx.saturating_sub(half_span);
        let end = (cx + half_span + 1).min(width);
        for col in start..end {
            element.put_pixel(col, row, Luma([MASK_ON]));
        }
    }
    Mask::from_image(&element, cx as u8, cy as u8)
}
