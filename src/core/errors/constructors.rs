//! Error constructor utilities.
//!
//! Helpers for creating [`SamError`] instances with context and error
//! chaining, so call sites stay short:
//!
//! ```rust
//! use sam_prompt::core::SamError;
//!
//! let error = SamError::model_inference_error(
//!     "sam_decoder",
//!     "forward_pass",
//!     &[1, 256, 64, 64],
//!     "ONNX Runtime inference failed",
//!     std::io::Error::new(std::io::ErrorKind::Other, "oops"),
//! );
//! assert!(error.to_string().contains("forward_pass"));
//! ```

use super::types::{ProcessingStage, SamError};

/// A plain string error, used as the source of errors that have no
/// underlying library error.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}

impl SamError {
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates an error for prompt tensor packing.
    pub fn prompt_encoding(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::PromptEncoding, context, error)
    }

    /// Creates an error for resize operations.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::Resize, context, error)
    }

    /// Creates an error for mask post-processing.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::PostProcessing, context, error)
    }

    /// Creates an inference error for the named model.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a detailed inference error carrying the failing operation and
    /// the primary input shape.
    pub fn model_inference_error(
        model_name: &str,
        operation: &str,
        input_shape: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelInference {
            model_name: model_name.to_string(),
            operation: operation.to_string(),
            input_shape: input_shape.to_vec(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a model loading error with an optional suggested fix.
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates an error for a failed embedding read.
    pub fn embedding_load_error(
        path: impl AsRef<std::path::Path>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::EmbeddingLoad {
            path: path.as_ref().display().to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a tensor shape mismatch error.
    pub fn shape_mismatch(
        operation: &str,
        expected_shape: &[usize],
        actual_shape: &[usize],
        context: &str,
    ) -> Self {
        Self::tensor_operation(
            context,
            SimpleError::new(format!(
                "{}: expected shape {:?}, got {:?}",
                operation, expected_shape, actual_shape
            )),
        )
    }
}
