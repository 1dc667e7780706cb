//! The precomputed image embedding.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::core::errors::{SamError, SamResult};

/// Image encoder output, reused by every decoder run on the same image.
///
/// Always 4-D with a batch of one (`[1, C, H, W]`, `[1, 256, 64, 64]` for
/// the published SAM checkpoints).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEmbedding {
    data: ArrayD<f32>,
}

impl ImageEmbedding {
    /// Wraps an array after checking its rank and batch size.
    pub fn from_array(data: ArrayD<f32>) -> SamResult<Self> {
        let shape = data.shape();
        if shape.len() != 4 {
            return Err(SamError::invalid_input(format!(
                "image embedding must be 4-D [1, C, H, W], got shape {:?}",
                shape
            )));
        }
        if shape[0] != 1 {
            return Err(SamError::invalid_input(format!(
                "image embedding must have batch size 1, got {}",
                shape[0]
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(SamError::invalid_input(
                "image embedding contains non-finite values",
            ));
        }
        Ok(Self { data })
    }

    /// Builds an all-zero embedding; useful for smoke-testing a decoder.
    pub fn zeros(channels: usize, height: usize, width: usize) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(&[1, channels, height, width])),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn into_inner(self) -> ArrayD<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{EMBEDDING_CHANNELS, EMBEDDING_SIDE};

    #[test]
    fn test_accepts_sam_shape() {
        let embedding = ImageEmbedding::from_array(ArrayD::zeros(IxDyn(&[
            1,
            EMBEDDING_CHANNELS,
            EMBEDDING_SIDE,
            EMBEDDING_SIDE,
        ])))
        .unwrap();
        assert_eq!(embedding.shape(), &[1, 256, 64, 64]);
    }

    #[test]
    fn test_rejects_bad_rank_and_batch() {
        assert!(ImageEmbedding::from_array(ArrayD::zeros(IxDyn(&[256, 64, 64]))).is_err());
        assert!(ImageEmbedding::from_array(ArrayD::zeros(IxDyn(&[2, 256, 64, 64]))).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let mut data = ArrayD::<f32>::zeros(IxDyn(&[1, 2, 2, 2]));
        data[&[0, 1, 1, 1][..]] = f32::NAN;
        assert!(ImageEmbedding::from_array(data).is_err());
    }
}
