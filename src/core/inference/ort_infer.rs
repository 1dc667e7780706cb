//! ONNX Runtime decoder engine with a pool of sessions.

use ort::session::Session;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;

#[path = "ort_infer_builders.rs"]
mod ort_infer_builders;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;
#[cfg(test)]
#[path = "ort_infer_tests.rs"]
mod ort_infer_tests;

pub use ort_infer_execution::DecoderOutput;

/// Name of the IoU score output of the SAM decoder export.
pub const IOU_OUTPUT_NAME: &str = "iou_predictions";

/// Name of the low-resolution logits output of the SAM decoder export.
pub const LOW_RES_OUTPUT_NAME: &str = "low_res_masks";

/// Runs the prompt decoder.
///
/// Sessions are handed out round-robin, each behind its own mutex, so one
/// `OrtInfer` can serve concurrent predictions.
pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: AtomicUsize,
    pub(super) input_names: Vec<String>,
    pub(super) output_names: Vec<String>,
    pub(super) model_path: PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Returns the model path associated with this engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name (the file stem of the model path).
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Names of the inputs declared by the model.
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Names of the outputs declared by the model, in declaration order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// True when the model declares an input called `name`.
    pub fn has_input(&self, name: &str) -> bool {
        self.input_names.iter().any(|n| n == name)
    }

    /// Number of pooled sessions.
    pub fn pool_size(&self) -> usize {
        self.sessions.len()
    }
}
