//! Pre- and post-processing around the decoder.
//!
//! * [`prompt_encoding`] - prompts to decoder input tensors
//! * [`mask`] - decoder output to binary masks and RGBA overlays

pub mod mask;
pub mod prompt_encoding;

pub use mask::{BinaryMask, MaskPrediction};
pub use prompt_encoding::{DecoderFeeds, PromptEncoder, model_data};
