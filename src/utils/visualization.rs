//! Rendering of masks and prompts on top of the source image.

use image::{DynamicImage, Rgb, RgbImage, RgbaImage, imageops};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::core::errors::{SamError, SamResult, SimpleError};
use crate::domain::{ClickType, PromptSet};

const POSITIVE_COLOR: Rgb<u8> = Rgb([0, 200, 0]);

const NEGATIVE_COLOR: Rgb<u8> = Rgb([220, 30, 30]);

const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const BOX_COLOR: Rgb<u8> = Rgb([255, 200, 0]);

/// Alpha-blends an RGBA mask over `image`.
///
/// The mask's own alpha is scaled by `alpha`, so transparent background
/// pixels leave the image untouched.
pub fn compose_overlay(image: &RgbImage, mask: &RgbaImage, alpha: f32) -> SamResult<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(SamError::post_processing(
            "compose overlay",
            SimpleError::new(format!(
                "mask is {:?} but image is {:?}",
                mask.dimensions(),
                image.dimensions()
            )),
        ));
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let mut layer = mask.clone();
    for pixel in layer.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * alpha).round() as u8;
    }

    let mut canvas = DynamicImage::ImageRgb8(image.clone()).to_rgba8();
    imageops::overlay(&mut canvas, &layer, 0, 0);
    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Draws clicks (green positive, red negative, white outline) and the box
/// prompt onto `image`.
pub fn draw_prompts(image: &mut RgbImage, prompts: &PromptSet) {
    let radius = ((image.width().max(image.height()) as f32 / 150.0).round() as i32).max(3);

    if let Some(b) = prompts.box_prompt {
        let w = b.width().round().max(1.0) as u32;
        let h = b.height().round().max(1.0) as u32;
        let rect = Rect::at(b.x0.round() as i32, b.y0.round() as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }

    for click in &prompts.clicks {
        let center = (click.x.round() as i32, click.y.round() as i32);
        let color = match click.click_type {
            ClickType::Positive => POSITIVE_COLOR,
            ClickType::Negative => NEGATIVE_COLOR,
        };
        draw_filled_circle_mut(image, center, radius, color);
        draw_hollow_circle_mut(image, center, radius, OUTLINE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxPrompt, Click};
    use image::Rgba;

    fn assert_near(actual: &Rgb<u8>, expected: [u8; 3], tolerance: u8) {
        for c in 0..3 {
            assert!(
                actual[c].abs_diff(expected[c]) <= tolerance,
                "channel {c}: got {:?}, expected {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_compose_overlay_blends_foreground_only() {
        let image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        let mut mask = RgbaImage::new(2, 1);
        mask.put_pixel(0, 0, Rgba([0, 114, 189, 255]));

        let out = compose_overlay(&image, &mask, 0.5).unwrap();
        assert_near(out.get_pixel(0, 0), [50, 107, 145], 2);
        assert_near(out.get_pixel(1, 0), [100, 100, 100], 1);
    }

    #[test]
    fn test_compose_overlay_full_and_zero_alpha() {
        let image = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        let mut mask = RgbaImage::new(1, 1);
        mask.put_pixel(0, 0, Rgba([0, 114, 189, 255]));

        let opaque = compose_overlay(&image, &mask, 1.0).unwrap();
        assert_near(opaque.get_pixel(0, 0), [0, 114, 189], 1);

        let hidden = compose_overlay(&image, &mask, 0.0).unwrap();
        assert_near(hidden.get_pixel(0, 0), [100, 100, 100], 1);
    }

    #[test]
    fn test_compose_overlay_size_mismatch() {
        let image = RgbImage::new(2, 2);
        let mask = RgbaImage::new(3, 2);
        assert!(compose_overlay(&image, &mask, 0.5).is_err());
    }

    #[test]
    fn test_draw_prompts_marks_clicks() {
        let mut image = RgbImage::new(100, 100);
        let prompts = PromptSet::from_clicks([Click::positive(20.0, 20.0), Click::negative(70.0, 70.0)])
            .with_box(BoxPrompt::new(5.0, 5.0, 95.0, 95.0));
        draw_prompts(&mut image, &prompts);

        assert_eq!(image.get_pixel(20, 20), &POSITIVE_COLOR);
        assert_eq!(image.get_pixel(70, 70), &NEGATIVE_COLOR);
        assert_eq!(image.get_pixel(5, 50), &BOX_COLOR);
        assert_eq!(image.get_pixel(50, 50), &Rgb([0, 0, 0]));
    }
}
