//! Rectangle-seeded foreground extraction backed by OpenCV's `grabCut`.
//!
//! Pixels outside the seed rectangle are definite background; pixels inside
//! start as probable foreground and are relabelled by each iteration.

use image::RgbImage;
use opencv::core::{Mat, Rect, Scalar, Vec3b, VecN, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::SegmentationError;

/// Axis-aligned pixel rectangle, `x..x + width` by `y..y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    Background,
    Foreground,
    ProbableBackground,
    ProbableForeground,
}

impl Label {
    pub fn is_foreground(self) -> bool {
        matches!(self, Label::Foreground | Label::ProbableForeground)
    }

    fn from_mask_value(value: u8) -> Result<Self, SegmentationError> {
        match i32::from(value) {
            imgproc::GC_BGD => Ok(Label::Background),
            imgproc::GC_FGD => Ok(Label::Foreground),
            imgproc::GC_PR_BGD => Ok(Label::ProbableBackground),
            imgproc::GC_PR_FGD => Ok(Label::ProbableForeground),
            other => Err(SegmentationError::Backend(format!(
                "unexpected mask value {other}"
            ))),
        }
    }
}

/// Per-pixel classification for a whole image, row-major.
#[derive(Clone, Debug)]
pub struct LabelMap {
    pub width: u32,
    pub height: u32,
    pub labels: Vec<Label>,
}

impl LabelMap {
    pub fn get(&self, x: u32, y: u32) -> Label {
        self.labels[(y * self.width + x) as usize]
    }
}

/// A segmentation primitive seeded by a loose bounding rectangle.
pub trait RectSegmenter {
    fn segment(
        &self,
        image: &RgbImage,
        rect: PixelRect,
        iterations: u32,
    ) -> Result<LabelMap, SegmentationError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrabCut;

fn backend(err: opencv::Error) -> SegmentationError {
    SegmentationError::Backend(err.message)
}

/// Copies an RGB buffer into a BGR `Mat`.
fn to_bgr_mat(image: &RgbImage) -> Result<Mat, opencv::Error> {
    let mut mat = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        CV_8UC3,
        Scalar::all(0.0),
    )?;
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? = VecN([b, g, r]);
    }
    Ok(mat)
}

impl RectSegmenter for GrabCut {
    fn segment(
        &self,
        image: &RgbImage,
        rect: PixelRect,
        iterations: u32,
    ) -> Result<LabelMap, SegmentationError> {
        let (width, height) = image.dimensions();
        if rect.is_empty() {
            return Err(SegmentationError::DegenerateRect {
                width: rect.width,
                height: rect.height,
            });
        }
        if rect.x + rect.width > width || rect.y + rect.height > height {
            return Err(SegmentationError::RectOutOfBounds {
                image_width: width,
                image_height: height,
            });
        }

        let source = to_bgr_mat(image).map_err(backend)?;
        let mut mask = Mat::default();
        let mut bgd_model = Mat::default();
        let mut fgd_model = Mat::default();
        imgproc::grab_cut(
            &source,
            &mut mask,
            Rect::new(
                rect.x as i32,
                rect.y as i32,
                rect.width as i32,
                rect.height as i32,
            ),
            &mut bgd_model,
            &mut fgd_model,
            i32::try_from(iterations).unwrap_or(i32::MAX),
            imgproc::GC_INIT_WITH_RECT,
        )
        .map_err(backend)?;

        let values = mask.data_bytes().map_err(backend)?;
        if values.len() != (width * height) as usize {
            return Err(SegmentationError::Backend(format!(
                "mask has {} values for a {width}x{height} image",
                values.len()
            )));
        }
        let labels = values
            .iter()
            .map(|&v| Label::from_mask_value(v))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "grabCut {}x{} rect, {iterations} iterations",
            rect.width,
            rect.height
        );

        Ok(LabelMap {
            width,
            height,
            labels,
        })
    }
}
