use image::{GrayImage, Pixel, Rgba, RgbImage, RgbaImage};

use crate::mask::MASK_UNSET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    pub color: [u8; 3],
    pub alpha: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [255, 255, 255],
            alpha: 150,
        }
    }
}

/// Opaque composite of the display image with the overlay colour blended in
/// wherever the mask is set.
pub fn render(display: &RgbImage, mask: &GrayImage, style: OverlayStyle) -> RgbaImage {
    RgbaImage::from_fn(display.width(), display.height(), |x, y| {
        let mut out = display.get_pixel(x, y).to_rgba();
        let covered = mask
            .get_pixel_checked(x, y)
            .map(|p| p.0[0] != MASK_UNSET)
            .unwrap_or(false);
        if covered {
            let [r, g, b] = style.color;
            out.blend(&Rgba([r, g, b, style.alpha]));
            // float compositing can land a hair under opaque
            out.0[3] = 255;
        }
        out
    })
}
