//! Error type definitions.

use crate::core::config::ConfigError;
use thiserror::Error;

/// Stage of the pipeline in which a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while building or reshaping tensors.
    TensorOperation,
    /// Error occurred while packing prompt tensors.
    PromptEncoding,
    /// Error occurred while resizing a mask or image.
    Resize,
    /// Error occurred while converting model output to a mask.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::PromptEncoding => write!(f, "prompt encoding"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors that can occur while producing a segmentation mask.
#[derive(Error, Debug)]
pub enum SamError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred while writing an image.
    #[error("failed to save image '{path}'")]
    ImageSave {
        /// Destination path.
        path: String,
        /// The underlying encoder error.
        #[source]
        source: image::ImageError,
    },

    /// Error occurred while reading a precomputed embedding.
    #[error("failed to load embedding '{path}'")]
    EmbeddingLoad {
        /// Path of the `.npy` file.
        path: String,
        /// The underlying reader error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Detailed inference failure with the operation and input shape.
    #[error(
        "model '{model_name}' failed during {operation} (input shape {input_shape:?}): {context}"
    )]
    ModelInference {
        /// Name of the model that failed.
        model_name: String,
        /// Operation that failed (tensor conversion, forward pass, output extraction).
        operation: String,
        /// Shape of the primary input tensor.
        input_shape: Vec<usize>,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while creating an ONNX session.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path of the model file.
        model_path: String,
        /// Why loading failed.
        reason: String,
        /// Optional suggested fix, pre-formatted.
        suggestion: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Configuration validation failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A decoder run was requested while another one is still in flight.
    #[error("a decoder run is already in progress")]
    Busy,

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}
