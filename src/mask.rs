use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;

pub const MASK_SET: u8 = 255;
pub const MASK_UNSET: u8 = 0;

/// A pixel position in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    Set,
    Clear,
}

impl FillMode {
    fn value(self) -> u8 {
        match self {
            FillMode::Set => MASK_SET,
            FillMode::Clear => MASK_UNSET,
        }
    }
}

/// Binary mask at display resolution. Pixels only ever hold 0 or 255.
#[derive(Clone, Debug)]
pub struct MaskBuffer {
    pixels: GrayImage,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn reset(&mut self, width: u32, height: u32) {
        self.pixels = GrayImage::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y).0[0] == MASK_SET
    }

    pub fn count_set(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[0] == MASK_SET).count()
    }

    /// Rasterizes the implicitly closed polygon with the even-odd rule and
    /// writes `mode` into every covered pixel, outline included. A final
    /// point repeating the first is dropped. Fewer than three points is a
    /// no-op.
    pub fn fill_polygon(&mut self, points: &[Point], mode: FillMode) {
        let points = match points.split_last() {
            Some((last, init)) if init.first() == Some(last) => init,
            _ => points,
        };
        if points.len() < 3 || self.width() == 0 || self.height() == 0 {
            return;
        }
        let poly: Vec<imageproc::point::Point<i32>> = points
            .iter()
            .map(|p| imageproc::point::Point::new(p.x, p.y))
            .collect();
        draw_polygon_mut(&mut self.pixels, &poly, Luma([mode.value()]));
    }

    /// Unions a region into the mask: every non-zero region pixel, offset
    /// by `origin`, becomes set. Nothing is ever cleared here.
    pub fn paste_region(&mut self, region: &GrayImage, origin: (u32, u32)) {
        for (rx, ry, pixel) in region.enumerate_pixels() {
            if pixel.0[0] == MASK_UNSET {
                continue;
            }
            let (x, y) = (origin.0 + rx, origin.1 + ry);
            if x < self.width() && y < self.height() {
                self.pixels.put_pixel(x, y, Luma([MASK_SET]));
            }
        }
    }

    /// Nearest-neighbour resample to the native image size for saving.
    pub fn export_downscaled(&self, width: u32, height: u32) -> GrayImage {
        let mut out = imageops::resize(&self.pixels, width, height, FilterType::Nearest);
        for pixel in out.pixels_mut() {
            pixel.0[0] = if pixel.0[0] == MASK_UNSET {
                MASK_UNSET
            } else {
                MASK_SET
            };
        }
        out
    }
}
