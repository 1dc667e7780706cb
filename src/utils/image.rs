//! Image loading and saving helpers.

use crate::core::errors::{SamError, SamResult};
use image::{DynamicImage, RgbImage};
use std::path::Path;
use tracing::debug;

/// Loads an image from disk and converts it to 8-bit RGB.
pub fn load_image(path: &Path) -> SamResult<RgbImage> {
    let img = image::open(path).map_err(SamError::ImageLoad)?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "loaded image"
    );
    Ok(dynamic_to_rgb(img))
}

/// Converts any decoded image to 8-bit RGB.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Saves an image, creating the parent directory when needed. The format
/// follows the file extension.
pub fn save_image<I>(image: &I, path: &Path) -> SamResult<()>
where
    I: Into<DynamicImage> + Clone,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let dynamic: DynamicImage = image.clone().into();
    dynamic.save(path).map_err(|source| SamError::ImageSave {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "saved image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("img.png");

        let mut image = RgbImage::new(3, 2);
        image.put_pixel(1, 1, Rgb([10, 20, 30]));
        save_image(&image, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_gray_is_expanded_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let mut gray = GrayImage::new(2, 2);
        gray.put_pixel(0, 0, Luma([200]));
        save_image(&gray, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.get_pixel(0, 0), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let result = load_image(Path::new("does/not/exist.png"));
        assert!(matches!(result, Err(SamError::ImageLoad(_))));
    }

    #[test]
    fn test_unsupported_extension_is_a_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.unknownext");
        let result = save_image(&GrayImage::new(2, 2), &path);
        match result {
            Err(err @ SamError::ImageSave { .. }) => {
                assert!(err.to_string().starts_with("failed to save image"));
            }
            other => panic!("expected a save error, got {other:?}"),
        }
    }
}
