//! Configuration management for the segmentation pipeline.
//!
//! This module provides configuration types, validation traits, and
//! ONNX Runtime session options.

pub mod errors;
pub mod onnx;
pub mod segmenter;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
pub use segmenter::{DecoderInputNames, SegmenterConfig};
