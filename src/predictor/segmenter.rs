//! Point-prompted segmentation on top of a precomputed image embedding.

use image::{RgbImage, RgbaImage};
use ndarray::ArrayView4;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::config::{ConfigValidator, OrtSessionConfig, SegmenterConfig};
use crate::core::errors::{SamError, SamResult};
use crate::core::inference::OrtInfer;
use crate::domain::{ImageEmbedding, ModelScale, PromptSet};
use crate::processors::{BinaryMask, MaskPrediction, PromptEncoder};
use crate::utils::{compose_overlay, load_embedding};

/// Result of one decoder run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Selected mask logits and side outputs.
    pub prediction: MaskPrediction,
    /// Thresholded mask at the original image size.
    pub mask: BinaryMask,
    /// Wall-clock time spent in the decoder.
    pub elapsed: Duration,
}

impl Segmentation {
    /// RGBA overlay: `color` on foreground, transparent elsewhere.
    pub fn overlay(&self, color: [u8; 4]) -> RgbaImage {
        self.mask.to_rgba(color)
    }

    /// The overlay alpha-blended onto `image`.
    pub fn composite(&self, image: &RgbImage, color: [u8; 4], alpha: f32) -> SamResult<RgbImage> {
        compose_overlay(image, &self.overlay(color), alpha)
    }
}

/// Anything that turns prompts into a segmentation.
///
/// [`PointSegmenter`] is the ONNX-backed implementation;
/// [`ClickSession`](super::ClickSession) drives any implementor.
pub trait PromptDecoder: Send + Sync {
    /// Decodes `prompts`, optionally refining `previous` low-resolution
    /// logits. Returns `Ok(None)` when there is nothing to decode.
    fn decode(
        &self,
        prompts: &PromptSet,
        previous: Option<ArrayView4<'_, f32>>,
    ) -> SamResult<Option<Segmentation>>;
}

/// Runs the SAM prompt decoder against one image's embedding.
#[derive(Debug)]
pub struct PointSegmenter {
    engine: OrtInfer,
    embedding: ImageEmbedding,
    scale: ModelScale,
    encoder: PromptEncoder,
    config: SegmenterConfig,
}

impl PointSegmenter {
    pub fn builder() -> PointSegmenterBuilder {
        PointSegmenterBuilder::new()
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn scale(&self) -> &ModelScale {
        &self.scale
    }

    pub fn engine(&self) -> &OrtInfer {
        &self.engine
    }

    /// Switches to another image without reloading the model.
    pub fn set_image(&mut self, embedding: ImageEmbedding, scale: ModelScale) {
        self.embedding = embedding;
        self.scale = scale;
    }

    /// Decodes `prompts` with an empty mask input.
    pub fn predict(&self, prompts: &PromptSet) -> SamResult<Option<Segmentation>> {
        self.predict_refined(prompts, None)
    }

    /// Decodes `prompts`, feeding `previous` low-resolution logits as the
    /// mask input when given.
    pub fn predict_refined(
        &self,
        prompts: &PromptSet,
        previous: Option<ArrayView4<'_, f32>>,
    ) -> SamResult<Option<Segmentation>> {
        for click in &prompts.clicks {
            if !self.scale.contains(click.x, click.y) {
                warn!(
                    x = click.x,
                    y = click.y,
                    width = self.scale.width,
                    height = self.scale.height,
                    "click lies outside the image"
                );
            }
        }

        let Some(feeds) = self
            .encoder
            .encode(prompts, &self.embedding, &self.scale, previous)?
        else {
            return Ok(None);
        };

        let start = Instant::now();
        let output = self.engine.run_decoder(
            &feeds,
            &self.config.input_names,
            self.config.output_name.as_deref(),
            self.config.feed_orig_im_size,
        )?;
        let elapsed = start.elapsed();
        info!(
            "decoder run took {:.2} ms ({} points)",
            elapsed.as_secs_f64() * 1000.0,
            feeds.num_points()
        );

        let prediction = MaskPrediction::from_output(
            output.masks.view(),
            output.iou_predictions.as_deref(),
            output.low_res_masks.as_ref().map(|a| a.view()),
            self.config.mask_index,
        )?;

        let mut mask = prediction.threshold(self.config.mask_threshold);
        if mask.width() != self.scale.width || mask.height() != self.scale.height {
            warn!(
                mask_width = mask.width(),
                mask_height = mask.height(),
                "decoder output size differs from the image, resizing mask"
            );
            mask = mask.resize_to(self.scale.width, self.scale.height)?;
        }

        Ok(Some(Segmentation {
            prediction,
            mask,
            elapsed,
        }))
    }
}

impl PromptDecoder for PointSegmenter {
    fn decode(
        &self,
        prompts: &PromptSet,
        previous: Option<ArrayView4<'_, f32>>,
    ) -> SamResult<Option<Segmentation>> {
        self.predict_refined(prompts, previous)
    }
}

enum EmbeddingSource {
    Path(PathBuf),
    Loaded(ImageEmbedding),
}

/// Builder for [`PointSegmenter`].
///
/// ```rust,no_run
/// use sam_prompt::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let image = load_image(std::path::Path::new("dogs.jpg"))?;
/// let segmenter = PointSegmenter::builder()
///     .model_path("sam_decoder.onnx")
///     .embedding_path("dogs_embedding.npy")
///     .image(&image)
///     .build()?;
///
/// let prompts = PromptSet::from_clicks([Click::positive(320.0, 240.0)]);
/// if let Some(result) = segmenter.predict(&prompts)? {
///     println!("{} foreground pixels", result.mask.foreground_area());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PointSegmenterBuilder {
    model_path: Option<PathBuf>,
    embedding: Option<EmbeddingSource>,
    image_size: Option<(u32, u32)>,
    config: SegmenterConfig,
}

impl PointSegmenterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the ONNX decoder.
    pub fn model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// `.npy` file holding the image embedding.
    pub fn embedding_path(mut self, path: impl AsRef<Path>) -> Self {
        self.embedding = Some(EmbeddingSource::Path(path.as_ref().to_path_buf()));
        self
    }

    /// An already loaded embedding.
    pub fn embedding(mut self, embedding: ImageEmbedding) -> Self {
        self.embedding = Some(EmbeddingSource::Loaded(embedding));
        self
    }

    /// Takes the original image size from `image`.
    pub fn image(mut self, image: &RgbImage) -> Self {
        self.image_size = Some(image.dimensions());
        self
    }

    /// Sets the original image size explicitly.
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = Some((width, height));
        self
    }

    pub fn config(mut self, config: SegmenterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ort_config(mut self, config: OrtSessionConfig) -> Self {
        self.config.ort_session = Some(config);
        self
    }

    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.session_pool_size = size;
        self
    }

    pub fn build(self) -> SamResult<PointSegmenter> {
        let config = self.config;
        config.validate()?;

        let model_path = self
            .model_path
            .ok_or_else(|| SamError::config_error("decoder model path is required"))?;
        config.validate_file_path(&model_path)?;

        let (width, height) = self
            .image_size
            .ok_or_else(|| SamError::config_error("image or image size is required"))?;
        config.validate_image_dimensions(width, height)?;
        let scale = ModelScale::with_long_side(width, height, config.long_side_length)?;

        let embedding = match self.embedding {
            Some(EmbeddingSource::Path(path)) => load_embedding(path)?,
            Some(EmbeddingSource::Loaded(embedding)) => embedding,
            None => return Err(SamError::config_error("image embedding is required")),
        };

        let engine = OrtInfer::from_config(
            &model_path,
            config.ort_session.as_ref(),
            config.session_pool_size,
        )?;

        info!(
            model = %engine.model_name(),
            width,
            height,
            sam_scale = scale.sam_scale,
            embedding = ?embedding.shape(),
            "point segmenter ready"
        );

        Ok(PointSegmenter {
            engine,
            embedding,
            scale,
            encoder: PromptEncoder::new(config.mask_input_size),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigError;

    #[test]
    fn test_build_requires_model_path() {
        let result = PointSegmenter::builder()
            .embedding(ImageEmbedding::zeros(256, 64, 64))
            .image_size(640, 480)
            .build();
        assert!(matches!(result, Err(SamError::ConfigError { .. })));
    }

    #[test]
    fn test_build_rejects_missing_model_file() {
        let result = PointSegmenter::builder()
            .model_path("missing_decoder.onnx")
            .embedding(ImageEmbedding::zeros(256, 64, 64))
            .image_size(640, 480)
            .build();
        assert!(matches!(
            result,
            Err(SamError::Config(ConfigError::PathNotFound { .. }))
        ));
    }

    #[test]
    fn test_build_requires_image_size() {
        let model = tempfile::NamedTempFile::new().unwrap();
        let result = PointSegmenter::builder()
            .model_path(model.path())
            .embedding(ImageEmbedding::zeros(256, 64, 64))
            .build();
        assert!(matches!(result, Err(SamError::ConfigError { .. })));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = PointSegmenter::builder()
            .session_pool_size(0)
            .model_path("missing_decoder.onnx")
            .build();
        assert!(matches!(
            result,
            Err(SamError::Config(ConfigError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_build_requires_embedding() {
        let model = tempfile::NamedTempFile::new().unwrap();
        let result = PointSegmenter::builder()
            .model_path(model.path())
            .image_size(10, 10)
            .build();
        assert!(matches!(result, Err(SamError::ConfigError { .. })));
    }

    #[test]
    fn test_build_with_garbage_model_fails_to_load() {
        let model = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(model.path(), b"not an onnx model").unwrap();
        let result = PointSegmenter::builder()
            .model_path(model.path())
            .embedding(ImageEmbedding::zeros(256, 64, 64))
            .image_size(10, 10)
            .build();
        assert!(result.is_err());
    }
}
