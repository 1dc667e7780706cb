//! Error types for the segmentation pipeline.
//!
//! This module provides the error handling for every stage of a prompt
//! decode: loading the image and embedding, packing prompt tensors, running
//! the ONNX session, and converting the output into a mask.
//!
//! # Usage
//!
//! ```rust
//! use sam_prompt::core::errors::{SamError, ProcessingStage};
//!
//! // Create a processing error with context
//! let error = SamError::tensor_operation(
//!     "Failed to reshape point coordinates",
//!     std::io::Error::new(std::io::ErrorKind::InvalidData, "Invalid tensor shape")
//! );
//!
//! // Create a configuration error
//! let config_error = SamError::config_error("Missing decoder model path");
//!
//! // Create an invalid input error
//! let input_error = SamError::invalid_input("click lies outside the image");
//! ```

pub mod constructors;
pub mod types;

pub use constructors::SimpleError;
pub use types::{ProcessingStage, SamError};

/// Convenient result alias for segmentation operations.
pub type SamResult<T> = Result<T, SamError>;
