//! Constants shared across the segmentation pipeline.

/// Length of the longest image side the SAM image encoder was fed.
///
/// Click coordinates are rescaled by `LONG_SIDE_LENGTH / max(width, height)`
/// before they reach the decoder.
pub const LONG_SIDE_LENGTH: u32 = 1024;

/// Side length of the low-resolution mask input/output of the decoder.
pub const MASK_INPUT_SIZE: usize = 256;

/// Logit threshold above which a mask pixel counts as foreground.
pub const DEFAULT_MASK_THRESHOLD: f32 = 0.0;

/// RGBA colour painted on foreground mask pixels.
pub const DEFAULT_MASK_COLOR: [u8; 4] = [0, 114, 189, 255];

/// Opacity used when blending the mask over the source image.
pub const DEFAULT_OVERLAY_ALPHA: f32 = 0.5;

/// Label of the padding point appended when no box prompt is present.
pub const PADDING_POINT_LABEL: f32 = -1.0;

/// Label of a box's top-left corner.
pub const BOX_TOP_LEFT_LABEL: f32 = 2.0;

/// Label of a box's bottom-right corner.
pub const BOX_BOTTOM_RIGHT_LABEL: f32 = 3.0;

/// Channel count of the SAM image embedding.
pub const EMBEDDING_CHANNELS: usize = 256;

/// Spatial side length of the SAM image embedding.
pub const EMBEDDING_SIDE: usize = 64;
