//! # SAM Prompt
//!
//! Click- and box-prompted mask decoding for Segment Anything (SAM) models on
//! ONNX Runtime. The heavy image encoder runs once, ahead of time, and its
//! embedding is saved as a `.npy` file; this crate runs only the lightweight
//! prompt decoder, so a new mask can be produced on every click.
//!
//! ## Features
//!
//! - Positive and negative clicks, plus an optional box prompt
//! - Packing of prompts into the decoder's input tensors
//! - Mask thresholding, resizing and RGBA overlays
//! - Interactive click sessions that refuse overlapping decoder runs
//! - Pooled ONNX Runtime sessions with configurable execution providers
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, error handling and the inference engine
//! * [`domain`] - Clicks, box prompts, the model scale and image embeddings
//! * [`predictor`] - The point segmenter and interactive click sessions
//! * [`processors`] - Prompt tensor packing and mask post-processing
//! * [`utils`] - Image and embedding I/O, overlays, logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sam_prompt::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = load_image(Path::new("dogs.jpg"))?;
//! let segmenter = PointSegmenter::builder()
//!     .model_path("models/sam_onnx_quantized_example.onnx")
//!     .embedding_path("dogs_embedding.npy")
//!     .image(&image)
//!     .build()?;
//!
//! // Interactive use: every click re-runs the decoder
//! let session = ClickSession::new(segmenter);
//! session.add_click(Click::positive(420.0, 310.0))?;
//! if let Some(result) = session.add_click(Click::negative(600.0, 300.0))? {
//!     let cfg = session.decoder().config();
//!     let overlay = result.composite(&image, cfg.mask_color, cfg.overlay_alpha)?;
//!     overlay.save("overlay.png")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust
//! use sam_prompt::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config: SegmenterConfig = serde_json::from_str(r#"
//! {
//!   "mask_threshold": 0.5,
//!   "session_pool_size": 2,
//!   "input_names": { "orig_im_size": "orig_im_size" }
//! }
//! "#)?;
//! assert_eq!(config.session_pool_size, 2);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use sam_prompt::prelude::*;
/// ```
///
/// Included items cover the common path from image to mask:
/// - Predictors (`PointSegmenter`, `ClickSession`, `Segmentation`)
/// - Prompts (`Click`, `ClickType`, `BoxPrompt`, `PromptSet`)
/// - Essential error and result types (`SamError`, `SamResult`)
/// - Image and embedding loading
///
/// For lower-level pieces (prompt encoding, the ONNX engine, ORT options),
/// import directly from the respective modules.
pub mod prelude {
    pub use crate::core::config::SegmenterConfig;
    pub use crate::core::{SamError, SamResult};
    pub use crate::domain::{BoxPrompt, Click, ClickType, ImageEmbedding, ModelScale, PromptSet};
    pub use crate::predictor::{
        ClickSession, PointSegmenter, PointSegmenterBuilder, PromptDecoder, Segmentation,
    };
    pub use crate::utils::{load_embedding, load_image};
}
