//! Decoded page bitmaps ready for blitting

use crate::geometry::Size;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

/// A decoded page image in RGBA8, shared cheaply between threads
///
/// Conversion happens on the loader thread so the UI thread only blits.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: Arc<RgbaImage>,
}

impl Surface {
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: Arc::new(image.into_rgba8()),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_from_image_converts_to_rgba() {
        let gray = GrayImage::from_pixel(4, 3, Luma([200]));
        let surface = Surface::from_image(DynamicImage::ImageLuma8(gray));

        assert_eq!(surface.size(), Size::new(4, 3));
        assert_eq!(surface.pixels().as_raw().len(), 4 * 3 * 4);
        assert_eq!(surface.pixels().get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_clones_share_pixels() {
        let surface = Surface::from_rgba(RgbaImage::new(2, 2));
        let clone = surface.clone();
        assert!(std::ptr::eq(surface.pixels(), clone.pixels()));
    }
}
