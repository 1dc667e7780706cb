//! ONNX Runtime inference for the prompt decoder.
//!
//! This module holds the session-pooling engine that feeds packed prompt
//! tensors to the decoder and reads back the mask logits.

pub mod ort_infer;
pub mod session;

pub use ort_infer::{DecoderOutput, IOU_OUTPUT_NAME, LOW_RES_OUTPUT_NAME, OrtInfer};
pub use session::load_session;
