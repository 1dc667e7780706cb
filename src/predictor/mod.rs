//! Predictors that turn prompts into masks.
//!
//! - [`segmenter`] runs the ONNX decoder against one image embedding
//! - [`session`] keeps interactive click state and re-runs a decoder on change

pub mod segmenter;
pub mod session;

pub use segmenter::{PointSegmenter, PointSegmenterBuilder, PromptDecoder, Segmentation};
pub use session::ClickSession;
