//! Conversion of decoder output into binary masks and overlays.

use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage, imageops};
use ndarray::{Array2, Array4, ArrayView4, s};

use crate::core::constants::DEFAULT_MASK_THRESHOLD;
use crate::core::errors::{SamError, SamResult, SimpleError};

/// Mask logits selected from one decoder run.
#[derive(Debug, Clone)]
pub struct MaskPrediction {
    /// Per-pixel logits, `H x W`.
    pub logits: Array2<f32>,
    /// Predicted IoU of the selected mask, when the model reports it.
    pub iou_score: Option<f32>,
    /// Low-resolution logits `[1, 1, 256, 256]` for feeding back as `mask_input`.
    pub low_res_logits: Option<Array4<f32>>,
}

impl MaskPrediction {
    /// Selects mask channel `index` from a `[B, C, H, W]` output.
    ///
    /// `iou` is the `[B, C]` score tensor flattened row-major and `low_res`
    /// the `[B, C, h, w]` low-resolution logits; both are optional.
    pub fn from_output(
        masks: ArrayView4<'_, f32>,
        iou: Option<&[f32]>,
        low_res: Option<ArrayView4<'_, f32>>,
        index: usize,
    ) -> SamResult<Self> {
        let (batch, channels, _, _) = masks.dim();
        if batch == 0 || index >= channels {
            return Err(SamError::post_processing(
                "select mask channel",
                SimpleError::new(format!(
                    "mask index {} out of range for output shape {:?}",
                    index,
                    masks.shape()
                )),
            ));
        }

        let logits = masks.slice(s![0, index, .., ..]).to_owned();
        let iou_score = iou.and_then(|scores| scores.get(index).copied());
        let low_res_logits = low_res
            .filter(|lr| lr.dim().0 > 0 && lr.dim().1 > index)
            .map(|lr| lr.slice(s![0..1, index..index + 1, .., ..]).to_owned());

        Ok(Self {
            logits,
            iou_score,
            low_res_logits,
        })
    }

    pub fn width(&self) -> u32 {
        self.logits.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.logits.nrows() as u32
    }

    /// Foreground iff the logit is strictly greater than `threshold`.
    pub fn threshold(&self, threshold: f32) -> BinaryMask {
        let (h, w) = self.logits.dim();
        let data = self
            .logits
            .iter()
            .map(|&v| if v > threshold { 255u8 } else { 0u8 })
            .collect();
        // the logits are contiguous row-major, so this cannot fail
        let image = GrayImage::from_raw(w as u32, h as u32, data)
            .unwrap_or_else(|| GrayImage::new(w as u32, h as u32));
        BinaryMask { image }
    }

    /// Thresholds at [`DEFAULT_MASK_THRESHOLD`].
    pub fn to_binary(&self) -> BinaryMask {
        self.threshold(DEFAULT_MASK_THRESHOLD)
    }
}

/// A thresholded mask: 255 for foreground, 0 for background.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// Wraps a grayscale image; any non-zero pixel counts as foreground.
    pub fn from_gray(image: GrayImage) -> Self {
        let image = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            if image.get_pixel(x, y)[0] > 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] > 0
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    /// Number of foreground pixels.
    pub fn foreground_area(&self) -> usize {
        self.image.pixels().filter(|p| p[0] > 0).count()
    }

    /// Tight `(x0, y0, x1, y1)` bounds of the foreground, inclusive.
    pub fn bounding_box(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in self.image.enumerate_pixels() {
            if p[0] == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    /// Nearest-neighbour resize, used when the decoder output size differs
    /// from the image.
    pub fn resize_to(&self, width: u32, height: u32) -> SamResult<Self> {
        if width == 0 || height == 0 {
            return Err(SamError::resize_error(
                "resize mask",
                SimpleError::new(format!("invalid target size {}x{}", width, height)),
            ));
        }
        if width == self.width() && height == self.height() {
            return Ok(self.clone());
        }
        let image = imageops::resize(&self.image, width, height, imageops::FilterType::Nearest);
        Ok(Self { image })
    }

    /// Paints foreground pixels with `color`; background stays fully
    /// transparent.
    pub fn to_rgba(&self, color: [u8; 4]) -> RgbaImage {
        let transparent = Rgba([0, 0, 0, 0]);
        let fill = Rgba(color);
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            if self.image.get_pixel(x, y)[0] > 0 {
                fill
            } else {
                transparent
            }
        })
    }
}
