//! Configuration for the prompt decoder and mask rendering.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::constants::{
    DEFAULT_MASK_COLOR, DEFAULT_MASK_THRESHOLD, DEFAULT_OVERLAY_ALPHA, LONG_SIDE_LENGTH,
    MASK_INPUT_SIZE,
};
use crate::core::errors::SamResult;

/// Names of the decoder's input tensors.
///
/// The defaults match the official Segment Anything ONNX export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderInputNames {
    pub image_embeddings: String,
    pub point_coords: String,
    pub point_labels: String,
    pub mask_input: String,
    pub has_mask_input: String,
    pub orig_im_size: String,
}

impl Default for DecoderInputNames {
    fn default() -> Self {
        Self {
            image_embeddings: "image_embeddings".to_string(),
            point_coords: "point_coords".to_string(),
            point_labels: "point_labels".to_string(),
            mask_input: "mask_input".to_string(),
            has_mask_input: "has_mask_input".to_string(),
            orig_im_size: "orig_im_size".to_string(),
        }
    }
}

/// Configuration for [`PointSegmenter`](crate::predictor::PointSegmenter).
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides:
///
/// ```rust
/// use sam_prompt::core::config::SegmenterConfig;
///
/// let config: SegmenterConfig = serde_json::from_str(r#"{ "mask_threshold": 0.5 }"#).unwrap();
/// assert_eq!(config.mask_threshold, 0.5);
/// assert_eq!(config.long_side_length, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Decoder input tensor names.
    pub input_names: DecoderInputNames,
    /// Output tensor holding the mask logits. `None` uses the first declared output.
    pub output_name: Option<String>,
    /// Logits strictly above this value are foreground.
    pub mask_threshold: f32,
    /// Longest side the image embedding was computed at.
    pub long_side_length: u32,
    /// Side length of the low-resolution mask input.
    pub mask_input_size: usize,
    /// Whether to feed `orig_im_size`. `None` feeds it only if the model declares it.
    pub feed_orig_im_size: Option<bool>,
    /// Mask channel to read when the decoder emits several candidates.
    pub mask_index: usize,
    /// RGBA colour of foreground pixels.
    pub mask_color: [u8; 4],
    /// Opacity of the mask when composited over the image.
    pub overlay_alpha: f32,
    /// Number of ONNX sessions kept for concurrent predictions.
    pub session_pool_size: usize,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self::get_defaults()
    }
}

impl SegmenterConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> SamResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the mask threshold.
    pub fn mask_threshold(mut self, threshold: f32) -> Self {
        self.mask_threshold = threshold;
        self
    }

    /// Sets the output tensor name.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Forces `orig_im_size` on or off.
    pub fn feed_orig_im_size(mut self, feed: bool) -> Self {
        self.feed_orig_im_size = Some(feed);
        self
    }

    /// Sets the session pool size.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = size;
        self
    }

    /// Sets ONNX Runtime session options.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }

    /// Sets the overlay colour.
    pub fn mask_color(mut self, color: [u8; 4]) -> Self {
        self.mask_color = color;
        self
    }
}

impl ConfigValidator for SegmenterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.mask_threshold.is_finite() {
            return Err(ConfigError::InvalidConfig {
                message: format!("mask_threshold must be finite, got {}", self.mask_threshold),
            });
        }
        if self.long_side_length == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "long_side_length must be greater than 0".to_string(),
            });
        }
        if self.mask_input_size == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "mask_input_size must be greater than 0".to_string(),
            });
        }
        if self.session_pool_size == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "session_pool_size must be greater than 0".to_string(),
            });
        }
        if self.session_pool_size > 64 {
            return Err(ConfigError::ResourceLimitExceeded {
                message: format!(
                    "session_pool_size {} exceeds maximum of 64",
                    self.session_pool_size
                ),
            });
        }
        self.validate_unit_interval("overlay_alpha", self.overlay_alpha)?;
        if let Some(ort) = &self.ort_session {
            ort.validate()?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self {
            input_names: DecoderInputNames::default(),
            output_name: None,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            long_side_length: LONG_SIDE_LENGTH,
            mask_input_size: MASK_INPUT_SIZE,
            feed_orig_im_size: None,
            mask_index: 0,
            mask_color: DEFAULT_MASK_COLOR,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
            session_pool_size: 1,
            ort_session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SegmenterConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.mask_color, [0, 114, 189, 255]);
        assert_eq!(config.mask_input_size, 256);
        assert_eq!(config.input_names.point_labels, "point_labels");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SegmenterConfig::new().session_pool_size(0).validate().is_err());
        assert!(SegmenterConfig::new().mask_threshold(f32::NAN).validate().is_err());

        let mut config = SegmenterConfig::new();
        config.overlay_alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "output_name": "masks",
                "feed_orig_im_size": false,
                "input_names": {{ "point_coords": "coords" }},
                "ort_session": {{ "intra_threads": 2, "execution_providers": ["CPU"] }}
            }}"#
        )
        .unwrap();

        let config = SegmenterConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.output_name.as_deref(), Some("masks"));
        assert_eq!(config.feed_orig_im_size, Some(false));
        assert_eq!(config.input_names.point_coords, "coords");
        assert_eq!(config.input_names.point_labels, "point_labels");
        assert_eq!(
            config.ort_session.as_ref().and_then(|o| o.intra_threads),
            Some(2)
        );
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "session_pool_size": 0 }}"#).unwrap();
        assert!(SegmenterConfig::from_json_file(file.path()).is_err());
    }
}
