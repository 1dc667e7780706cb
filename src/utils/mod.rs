//! Utility functions for the segmentation pipeline.
//!
//! Image I/O, embedding loading, visualization, and logging setup.

pub mod embedding;
pub mod image;
pub mod visualization;

pub use embedding::load_embedding;
pub use image::{dynamic_to_rgb, load_image, save_image};
pub use visualization::{compose_overlay, draw_prompts};

/// Initializes the tracing subscriber for logging.
///
/// Sets up a registry with an environment filter (`RUST_LOG`) and a
/// formatting layer. Call it once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
