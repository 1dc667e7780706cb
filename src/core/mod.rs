//! The core module of the segmentation pipeline.
//!
//! This module contains the fundamental components shared by every predictor:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Inference engine integration
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use crate::utils::{dynamic_to_rgb, init_tracing, load_image};
pub use config::{ConfigError, ConfigValidator, OrtSessionConfig, SegmenterConfig};
pub use constants::*;
pub use errors::{ProcessingStage, SamError, SamResult};
pub use inference::{DecoderOutput, OrtInfer, load_session};
