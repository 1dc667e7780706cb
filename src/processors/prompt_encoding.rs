//! Packing of prompts into the decoder's input tensors.
//!
//! Layout follows the Segment Anything ONNX decoder:
//!
//! | input            | shape            | contents                                   |
//! |------------------|------------------|--------------------------------------------|
//! | `image_embeddings` | `[1, C, H, W]` | copy of the precomputed embedding          |
//! | `point_coords`   | `[1, N, 2]`      | clicks (then box corners) in model space   |
//! | `point_labels`   | `[1, N]`         | 1/0 per click, 2/3 for box corners, -1 pad |
//! | `mask_input`     | `[1, 1, 256, 256]` | previous low-res logits, or zeros       |
//! | `has_mask_input` | `[1]`            | 1 when `mask_input` carries a mask         |
//! | `orig_im_size`   | `[2]`            | `[height, width]` of the original image    |
//!
//! Without a box a padding point `(0, 0)` labelled -1 is appended, so `N`
//! clicks produce `N + 1` points.

use ndarray::{Array1, Array2, Array3, Array4, ArrayD, ArrayView4};
use tracing::debug;

use crate::core::constants::{
    BOX_BOTTOM_RIGHT_LABEL, BOX_TOP_LEFT_LABEL, MASK_INPUT_SIZE, PADDING_POINT_LABEL,
};
use crate::core::errors::{SamError, SamResult};
use crate::domain::{ImageEmbedding, ModelScale, PromptSet};

/// Input tensors for one decoder run.
#[derive(Debug, Clone)]
pub struct DecoderFeeds {
    pub image_embeddings: ArrayD<f32>,
    pub point_coords: Array3<f32>,
    pub point_labels: Array2<f32>,
    pub mask_input: Array4<f32>,
    pub has_mask_input: Array1<f32>,
    pub orig_im_size: Array1<f32>,
}

impl DecoderFeeds {
    /// Number of points, including box corners and padding.
    pub fn num_points(&self) -> usize {
        self.point_labels.shape()[1]
    }
}

/// Builds [`DecoderFeeds`] for a given low-res mask size.
#[derive(Debug, Clone, Copy)]
pub struct PromptEncoder {
    mask_input_size: usize,
}

impl Default for PromptEncoder {
    fn default() -> Self {
        Self::new(MASK_INPUT_SIZE)
    }
}

impl PromptEncoder {
    pub fn new(mask_input_size: usize) -> Self {
        Self { mask_input_size }
    }

    pub fn mask_input_size(&self) -> usize {
        self.mask_input_size
    }

    /// Packs the prompts.
    ///
    /// Returns `Ok(None)` when there are no clicks and no box. A
    /// `previous_mask` must be `[1, 1, S, S]` with `S` the configured mask
    /// input size.
    pub fn encode(
        &self,
        prompts: &PromptSet,
        embedding: &ImageEmbedding,
        scale: &ModelScale,
        previous_mask: Option<ArrayView4<'_, f32>>,
    ) -> SamResult<Option<DecoderFeeds>> {
        if prompts.is_empty() {
            return Ok(None);
        }

        let n = prompts.point_count();
        let mut coords = Vec::with_capacity(2 * n);
        let mut labels = Vec::with_capacity(n);

        for click in &prompts.clicks {
            let (x, y) = scale.to_model(click.x, click.y);
            coords.extend_from_slice(&[x, y]);
            labels.push(click.click_type.label());
        }

        match prompts.box_prompt {
            Some(b) => {
                let (x0, y0) = scale.to_model(b.x0, b.y0);
                let (x1, y1) = scale.to_model(b.x1, b.y1);
                coords.extend_from_slice(&[x0, y0, x1, y1]);
                labels.extend_from_slice(&[BOX_TOP_LEFT_LABEL, BOX_BOTTOM_RIGHT_LABEL]);
            }
            None => {
                coords.extend_from_slice(&[0.0, 0.0]);
                labels.push(PADDING_POINT_LABEL);
            }
        }

        let point_coords = Array3::from_shape_vec((1, n, 2), coords)
            .map_err(|e| SamError::prompt_encoding("point_coords", e))?;
        let point_labels = Array2::from_shape_vec((1, n), labels)
            .map_err(|e| SamError::prompt_encoding("point_labels", e))?;

        let size = self.mask_input_size;
        let (mask_input, has_mask_input) = match previous_mask {
            Some(mask) => {
                if mask.shape() != [1, 1, size, size] {
                    return Err(SamError::shape_mismatch(
                        "mask_input",
                        &[1, 1, size, size],
                        mask.shape(),
                        "previous low-resolution mask",
                    ));
                }
                (mask.to_owned(), Array1::from_elem(1, 1.0))
            }
            None => (Array4::zeros((1, 1, size, size)), Array1::zeros(1)),
        };

        let orig_im_size = Array1::from_vec(vec![scale.height as f32, scale.width as f32]);

        debug!(
            points = n,
            has_box = prompts.box_prompt.is_some(),
            has_mask = has_mask_input[0] > 0.0,
            "packed decoder inputs"
        );

        Ok(Some(DecoderFeeds {
            image_embeddings: embedding.view().to_owned(),
            point_coords,
            point_labels,
            mask_input,
            has_mask_input,
            orig_im_size,
        }))
    }
}

/// Packs prompts with the default 256x256 mask input and no previous mask.
pub fn model_data(
    prompts: &PromptSet,
    embedding: &ImageEmbedding,
    scale: &ModelScale,
) -> SamResult<Option<DecoderFeeds>> {
    PromptEncoder::default().encode(prompts, embedding, scale, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxPrompt, Click};

    fn fixture() -> (ImageEmbedding, ModelScale) {
        (
            ImageEmbedding::zeros(4, 2, 2),
            ModelScale::from_dimensions(2048, 1536).unwrap(),
        )
    }

    #[test]
    fn test_no_prompts_returns_none() {
        let (embedding, scale) = fixture();
        let feeds = model_data(&PromptSet::new(), &embedding, &scale).unwrap();
        assert!(feeds.is_none());
    }

    #[test]
    fn test_clicks_get_padding_point() {
        let (embedding, scale) = fixture();
        let prompts = PromptSet::from_clicks([
            Click::positive(100.0, 200.0),
            Click::negative(400.0, 10.0),
        ]);
        let feeds = model_data(&prompts, &embedding, &scale).unwrap().unwrap();

        assert_eq!(feeds.point_coords.shape(), &[1, 3, 2]);
        assert_eq!(feeds.point_labels.shape(), &[1, 3]);
        assert_eq!(feeds.num_points(), 3);

        // sam_scale = 1024 / 2048
        assert_eq!(feeds.point_coords[[0, 0, 0]], 50.0);
        assert_eq!(feeds.point_coords[[0, 0, 1]], 100.0);
        assert_eq!(feeds.point_coords[[0, 1, 0]], 200.0);
        assert_eq!(feeds.point_coords[[0, 1, 1]], 5.0);
        assert_eq!(feeds.point_coords[[0, 2, 0]], 0.0);
        assert_eq!(feeds.point_coords[[0, 2, 1]], 0.0);

        assert_eq!(feeds.point_labels.as_slice().unwrap(), &[1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_single_click_shapes() {
        let (embedding, scale) = fixture();
        let prompts = PromptSet::from_clicks([Click::positive(1.0, 1.0)]);
        let feeds = model_data(&prompts, &embedding, &scale).unwrap().unwrap();
        assert_eq!(feeds.point_coords.shape(), &[1, 2, 2]);
        assert_eq!(feeds.point_labels[[0, 1]], -1.0);
    }

    #[test]
    fn test_box_replaces_padding_point() {
        let (embedding, scale) = fixture();
        let prompts = PromptSet::from_clicks([Click::positive(10.0, 10.0)])
            .with_box(BoxPrompt::new(200.0, 100.0, 20.0, 40.0));
        let feeds = model_data(&prompts, &embedding, &scale).unwrap().unwrap();

        assert_eq!(feeds.point_coords.shape(), &[1, 3, 2]);
        assert_eq!(feeds.point_labels.as_slice().unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(feeds.point_coords[[0, 1, 0]], 10.0);
        assert_eq!(feeds.point_coords[[0, 1, 1]], 20.0);
        assert_eq!(feeds.point_coords[[0, 2, 0]], 100.0);
        assert_eq!(feeds.point_coords[[0, 2, 1]], 50.0);
    }

    #[test]
    fn test_empty_mask_input_and_image_size() {
        let (embedding, scale) = fixture();
        let prompts = PromptSet::from_clicks([Click::positive(1.0, 1.0)]);
        let feeds = model_data(&prompts, &embedding, &scale).unwrap().unwrap();

        assert_eq!(feeds.mask_input.shape(), &[1, 1, 256, 256]);
        assert!(feeds.mask_input.iter().all(|&v| v == 0.0));
        assert_eq!(feeds.has_mask_input.as_slice().unwrap(), &[0.0]);
        assert_eq!(feeds.orig_im_size.as_slice().unwrap(), &[1536.0, 2048.0]);
        assert_eq!(feeds.image_embeddings.shape(), embedding.shape());
    }

    #[test]
    fn test_previous_mask_is_fed_back() {
        let (embedding, scale) = fixture();
        let prompts = PromptSet::from_clicks([Click::positive(1.0, 1.0)]);
        let encoder = PromptEncoder::new(8);
        let previous = Array4::from_elem((1, 1, 8, 8), 2.5f32);

        let feeds = encoder
            .encode(&prompts, &embedding, &scale, Some(previous.view()))
            .unwrap()
            .unwrap();
        assert_eq!(feeds.has_mask_input[0], 1.0);
        assert_eq!(feeds.mask_input[[0, 0, 7, 7]], 2.5);

        let wrong = Array4::<f32>::zeros((1, 1, 4, 4));
        assert!(
            encoder
                .encode(&prompts, &embedding, &scale, Some(wrong.view()))
                .is_err()
        );
    }
}
