//! Domain types for prompt-driven segmentation.
//!
//! * [`prompt`] - clicks, box prompts and the prompt set sent to the decoder
//! * [`scale`] - the image-to-model coordinate scale
//! * [`embedding`] - the precomputed image embedding

pub mod embedding;
pub mod prompt;
pub mod scale;

pub use embedding::ImageEmbedding;
pub use prompt::{BoxPrompt, Click, ClickType, PromptSet};
pub use scale::ModelScale;
