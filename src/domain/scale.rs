//! Mapping between original image pixels and the model's input frame.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::core::constants::LONG_SIDE_LENGTH;
use crate::core::errors::{SamError, SamResult};

/// Original image size plus the factor that maps it onto the encoder's
/// longest-side-1024 frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScale {
    /// Original image height.
    pub height: u32,
    /// Original image width.
    pub width: u32,
    /// `long_side / max(width, height)`.
    pub sam_scale: f32,
}

impl ModelScale {
    /// Computes the scale for an image of the given size using the default
    /// 1024-pixel long side.
    pub fn from_dimensions(width: u32, height: u32) -> SamResult<Self> {
        Self::with_long_side(width, height, LONG_SIDE_LENGTH)
    }

    /// Computes the scale for a custom encoder input size.
    pub fn with_long_side(width: u32, height: u32, long_side: u32) -> SamResult<Self> {
        if width == 0 || height == 0 {
            return Err(SamError::invalid_input(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if long_side == 0 {
            return Err(SamError::invalid_input("long side length must be positive"));
        }
        Ok(Self {
            height,
            width,
            sam_scale: long_side as f32 / width.max(height) as f32,
        })
    }

    pub fn from_image(image: &RgbImage) -> SamResult<Self> {
        Self::from_dimensions(image.width(), image.height())
    }

    /// Maps an image-space point into model space.
    pub fn to_model(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.sam_scale, y * self.sam_scale)
    }

    /// True when `(x, y)` lies inside the original image.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_scale() {
        let scale = ModelScale::from_dimensions(2048, 1024).unwrap();
        assert_eq!(scale.sam_scale, 0.5);
        assert_eq!(scale.to_model(100.0, 50.0), (50.0, 25.0));
    }

    #[test]
    fn test_portrait_scale_uses_height() {
        let scale = ModelScale::from_dimensions(300, 512).unwrap();
        assert_eq!(scale.sam_scale, 2.0);
        assert_eq!(scale.width, 300);
        assert_eq!(scale.height, 512);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(ModelScale::from_dimensions(0, 10).is_err());
        assert!(ModelScale::with_long_side(10, 10, 0).is_err());
    }

    #[test]
    fn test_contains() {
        let scale = ModelScale::from_dimensions(10, 20).unwrap();
        assert!(scale.contains(0.0, 0.0));
        assert!(scale.contains(9.5, 19.5));
        assert!(!scale.contains(10.0, 5.0));
        assert!(!scale.contains(-1.0, 5.0));
    }

    #[test]
    fn test_from_image() {
        let image = RgbImage::new(1024, 768);
        let scale = ModelScale::from_image(&image).unwrap();
        assert_eq!(scale.sam_scale, 1.0);
    }
}
