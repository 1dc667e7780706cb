use super::*;
use crate::core::config::DecoderInputNames;
use crate::core::errors::{SamError, SimpleError};
use crate::processors::DecoderFeeds;
use ndarray::{Array4, ArrayView4};
use ort::session::SessionInputValue;
use ort::value::TensorRef;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Tensors read back from one decoder run.
#[derive(Debug, Clone)]
pub struct DecoderOutput {
    /// Mask logits `[B, C, H, W]`.
    pub masks: Array4<f32>,
    /// Predicted IoU per candidate mask, row-major `[B, C]`.
    pub iou_predictions: Option<Vec<f32>>,
    /// Low-resolution logits `[B, C, 256, 256]`.
    pub low_res_masks: Option<Array4<f32>>,
}

/// Copies a flat output into a `[B, C, H, W]` array. Returns `None` unless
/// `shape` is 4-D, non-negative and matches `data.len()`.
pub(super) fn to_array4(shape: &[i64], data: &[f32]) -> Option<Array4<f32>> {
    if shape.len() != 4 || shape.iter().any(|&d| d < 0) {
        return None;
    }
    let dims = (
        shape[0] as usize,
        shape[1] as usize,
        shape[2] as usize,
        shape[3] as usize,
    );
    if dims.0 * dims.1 * dims.2 * dims.3 != data.len() {
        return None;
    }
    ArrayView4::from_shape(dims, data).ok().map(|v| v.to_owned())
}

/// Whether `orig_im_size` goes into the feed: `forced` wins, otherwise only
/// when the model declares an input called `name`.
pub(super) fn should_feed_orig_im_size(forced: Option<bool>, declared: &[String], name: &str) -> bool {
    forced.unwrap_or_else(|| declared.iter().any(|n| n == name))
}

/// The mask output: the configured name, else the first declared output.
pub(super) fn select_mask_output(configured: Option<&str>, declared: &[String]) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| declared.first().cloned())
}

impl OrtInfer {
    fn mask_output_name(&self, configured: Option<&str>) -> Result<String, SamError> {
        select_mask_output(configured, &self.output_names).ok_or_else(|| {
            SamError::invalid_input(
                "No outputs available in session - model may be invalid or corrupted",
            )
        })
    }

    /// Runs the decoder on packed prompt tensors.
    ///
    /// `orig_im_size` is fed when `feed_orig_im_size` is `Some(true)`, or when
    /// it is `None` and the model declares that input; static-shape exports
    /// bake the image size in and do not take it.
    pub fn run_decoder(
        &self,
        feeds: &DecoderFeeds,
        names: &DecoderInputNames,
        output_name: Option<&str>,
        feed_orig_im_size: Option<bool>,
    ) -> Result<DecoderOutput, SamError> {
        let input_shape = feeds.image_embeddings.shape().to_vec();
        let output_name = self.mask_output_name(output_name)?;

        let convert_err = |e: ort::Error, which: &str| {
            SamError::model_inference_error(
                &self.model_name,
                "tensor_conversion",
                &input_shape,
                &format!("Failed to convert input tensor '{}'", which),
                e,
            )
        };

        let mut inputs: Vec<(String, SessionInputValue<'_>)> = Vec::with_capacity(6);
        inputs.push((
            names.image_embeddings.clone(),
            TensorRef::from_array_view(feeds.image_embeddings.view())
                .map_err(|e| convert_err(e, &names.image_embeddings))?
                .into(),
        ));
        inputs.push((
            names.point_coords.clone(),
            TensorRef::from_array_view(feeds.point_coords.view())
                .map_err(|e| convert_err(e, &names.point_coords))?
                .into(),
        ));
        inputs.push((
            names.point_labels.clone(),
            TensorRef::from_array_view(feeds.point_labels.view())
                .map_err(|e| convert_err(e, &names.point_labels))?
                .into(),
        ));
        inputs.push((
            names.mask_input.clone(),
            TensorRef::from_array_view(feeds.mask_input.view())
                .map_err(|e| convert_err(e, &names.mask_input))?
                .into(),
        ));
        inputs.push((
            names.has_mask_input.clone(),
            TensorRef::from_array_view(feeds.has_mask_input.view())
                .map_err(|e| convert_err(e, &names.has_mask_input))?
                .into(),
        ));
        let feed_size =
            should_feed_orig_im_size(feed_orig_im_size, &self.input_names, &names.orig_im_size);
        if feed_size {
            inputs.push((
                names.orig_im_size.clone(),
                TensorRef::from_array_view(feeds.orig_im_size.view())
                    .map_err(|e| convert_err(e, &names.orig_im_size))?
                    .into(),
            ));
        }

        debug!(
            model = %self.model_name,
            points = feeds.num_points(),
            orig_im_size = feed_size,
            "running decoder"
        );

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            SamError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("Session lock acquisition failed"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            SamError::model_inference_error(
                &self.model_name,
                "forward_pass",
                &input_shape,
                &format!(
                    "ONNX Runtime inference failed with {} prompt points -> output '{}'",
                    feeds.num_points(),
                    output_name
                ),
                e,
            )
        })?;

        let mask_value = outputs.get(output_name.as_str()).ok_or_else(|| {
            SamError::model_inference_error(
                &self.model_name,
                "output_extraction",
                &input_shape,
                &format!(
                    "Output '{}' not produced; available outputs: {:?}",
                    output_name, self.output_names
                ),
                SimpleError::new("missing output tensor"),
            )
        })?;
        let (mask_shape, mask_data) = mask_value.try_extract_tensor::<f32>().map_err(|e| {
            SamError::model_inference_error(
                &self.model_name,
                "output_extraction",
                &input_shape,
                &format!("Failed to extract output tensor '{}' as f32", output_name),
                e,
            )
        })?;

        let masks = to_array4(mask_shape, mask_data).ok_or_else(|| {
            SamError::shape_mismatch(
                "mask_output",
                &[1, 1, 0, 0],
                &mask_shape.iter().map(|&d| d.max(0) as usize).collect::<Vec<_>>(),
                &format!(
                    "Model '{}' must return a 4-D mask tensor matching its data length ({})",
                    self.model_name,
                    mask_data.len()
                ),
            )
        })?;

        let iou_predictions = (output_name != IOU_OUTPUT_NAME)
            .then(|| outputs.get(IOU_OUTPUT_NAME))
            .flatten()
            .and_then(|v| v.try_extract_tensor::<f32>().ok())
            .map(|(_, data)| data.to_vec());

        let low_res_masks = (output_name != LOW_RES_OUTPUT_NAME)
            .then(|| outputs.get(LOW_RES_OUTPUT_NAME))
            .flatten()
            .and_then(|v| v.try_extract_tensor::<f32>().ok())
            .and_then(|(shape, data)| to_array4(shape, data));

        debug!(
            model = %self.model_name,
            mask_shape = ?masks.shape(),
            has_iou = iou_predictions.is_some(),
            has_low_res = low_res_masks.is_some(),
            "decoder finished"
        );

        Ok(DecoderOutput {
            masks,
            iou_predictions,
            low_res_masks,
        })
    }
}
