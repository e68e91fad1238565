use image::{GrayImage, Luma, RgbImage};

use crate::error::SegmentationError;
use crate::grabcut::{PixelRect, RectSegmenter};
use crate::mask::{Point, MASK_SET};

/// The rectangle of an active middle-button drag, in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    /// (min, max) corners.
    pub fn corners(&self) -> (Point, Point) {
        (
            Point::new(self.start.x.min(self.current.x), self.start.y.min(self.current.y)),
            Point::new(self.start.x.max(self.current.x), self.start.y.max(self.current.y)),
        )
    }

    /// Normalized and clipped to a `width` x `height` image. The rectangle
    /// spans `min..max`, so a drag that never leaves its start has no area.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> PixelRect {
        let (min, max) = self.corners();
        let clip = |v: i32, limit: u32| v.clamp(0, limit as i32) as u32;
        let (x0, y0) = (clip(min.x, width), clip(min.y, height));
        let (x1, y1) = (clip(max.x, width), clip(max.y, height));
        PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// A binary region cut out of the display image, placed at `origin`.
#[derive(Clone, Debug)]
pub struct Region {
    pub mask: GrayImage,
    pub origin: (u32, u32),
}

pub struct AutoSegmenter {
    backend: Box<dyn RectSegmenter>,
    iterations: u32,
}

impl AutoSegmenter {
    pub fn new(backend: Box<dyn RectSegmenter>, iterations: u32) -> Self {
        Self {
            backend,
            iterations,
        }
    }

    /// Runs the rectangle-seeded primitive and collapses its four-way
    /// labelling to foreground/background within the rectangle.
    pub fn segment(
        &self,
        display: &RgbImage,
        rect: PixelRect,
    ) -> Result<Region, SegmentationError> {
        if rect.is_empty() {
            return Err(SegmentationError::DegenerateRect {
                width: rect.width,
                height: rect.height,
            });
        }
        let labels = self.backend.segment(display, rect, self.iterations)?;
        if (labels.width, labels.height) != display.dimensions() {
            return Err(SegmentationError::RectOutOfBounds {
                image_width: display.width(),
                image_height: display.height(),
            });
        }
        let mask = GrayImage::from_fn(rect.width, rect.height, |x, y| {
            if labels.get(rect.x + x, rect.y + y).is_foreground() {
                Luma([MASK_SET])
            } else {
                Luma([0])
            }
        });
        Ok(Region {
            mask,
            origin: (rect.x, rect.y),
        })
    }
}
