//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::errors::SamError;
use ort::session::Session;
use std::path::Path;

/// Opens a bare session, e.g. to inspect a model's declared inputs.
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session, SamError> {
    let path = model_path.as_ref();
    let session = Session::builder()
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| {
            SamError::model_load_error(
                path,
                "failed to create ONNX session",
                Some("verify model file exists and is readable"),
                Some(e),
            )
        })?;
    Ok(session)
}
