//! Reading precomputed image embeddings from NumPy `.npy` files.

use ndarray::ArrayD;
use ndarray_npy::read_npy;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::constants::{EMBEDDING_CHANNELS, EMBEDDING_SIDE};
use crate::core::errors::{SamError, SamResult};
use crate::domain::ImageEmbedding;

/// Loads an `f32` embedding saved with `np.save`.
///
/// The array must be 4-D with batch size 1. Shapes other than the
/// published SAM `[1, 256, 64, 64]` are accepted with a warning, since
/// custom decoders may use a different embedding size.
pub fn load_embedding(path: impl AsRef<Path>) -> SamResult<ImageEmbedding> {
    let path = path.as_ref();
    let data: ArrayD<f32> = read_npy(path).map_err(|e| SamError::embedding_load_error(path, e))?;
    let embedding = ImageEmbedding::from_array(data)?;

    if embedding.shape()[1..] != [EMBEDDING_CHANNELS, EMBEDDING_SIDE, EMBEDDING_SIDE] {
        warn!(
            path = %path.display(),
            shape = ?embedding.shape(),
            "embedding shape differs from the SAM default [1, 256, 64, 64]"
        );
    }
    debug!(path = %path.display(), shape = ?embedding.shape(), "loaded embedding");
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};
    use ndarray_npy::write_npy;

    #[test]
    fn test_load_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.npy");
        let mut data = Array4::<f32>::zeros((1, 2, 3, 3));
        data[[0, 1, 2, 2]] = 0.25;
        write_npy(&path, &data).unwrap();

        let embedding = load_embedding(&path).unwrap();
        assert_eq!(embedding.shape(), &[1, 2, 3, 3]);
        assert_eq!(embedding.view()[&[0, 1, 2, 2][..]], 0.25);
    }

    #[test]
    fn test_rejects_three_dimensional_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.npy");
        write_npy(&path, &Array3::<f32>::zeros((256, 64, 64))).unwrap();
        assert!(matches!(
            load_embedding(&path),
            Err(SamError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_embedding("missing.npy"),
            Err(SamError::EmbeddingLoad { .. })
        ));
    }

    #[test]
    fn test_wrong_dtype() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.npy");
        write_npy(&path, &Array4::<f64>::zeros((1, 1, 1, 1))).unwrap();
        assert!(matches!(
            load_embedding(&path),
            Err(SamError::EmbeddingLoad { .. })
        ));
    }
}
