use super::*;
use crate::core::config::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::SamError;
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;
use tracing::info;

impl OrtInfer {
    /// Creates an engine with default ONNX Runtime settings and a single session.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, SamError> {
        Self::from_config(model_path, None, 1)
    }

    /// Creates an engine with `pool_size` sessions configured from `ort_config`.
    pub fn from_config(
        model_path: impl AsRef<Path>,
        ort_config: Option<&OrtSessionConfig>,
        pool_size: usize,
    ) -> Result<Self, SamError> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = match ort_config {
                Some(cfg) => Self::apply_ort_config(builder, cfg)?,
                None => builder.with_log_level(LogLevel::Error)?,
            };
            let session = builder.commit_from_file(path).map_err(|e| {
                SamError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some("verify the decoder model path and the enabled execution providers"),
                    Some(e),
                )
            })?;
            sessions.push(Mutex::new(session));
        }

        let (input_names, output_names) = {
            let first = sessions[0].lock().map_err(|_| {
                SamError::invalid_input("Failed to acquire session lock during setup")
            })?;
            (
                first.inputs.iter().map(|i| i.name.clone()).collect::<Vec<_>>(),
                first.outputs.iter().map(|o| o.name.clone()).collect::<Vec<_>>(),
            )
        };

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        info!(
            model = %model_name,
            sessions = pool_size,
            inputs = ?input_names,
            outputs = ?output_names,
            "decoder model loaded"
        );

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_names,
            output_names,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(par) = cfg.parallel_execution {
            builder = builder.with_parallel_execution(par)?;
        }
        if let Some(enable) = cfg.enable_mem_pattern {
            builder = builder.with_memory_pattern(enable)?;
        }
        if let Some(level) = cfg.optimization_level {
            let mapped = match level {
                OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
                OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
                OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
                OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        if let Some(eps) = &cfg.execution_providers {
            let providers = Self::build_execution_providers(eps)?;
            if !providers.is_empty() {
                builder = builder.with_execution_providers(providers)?;
            }
        }
        Ok(builder)
    }

    pub(super) fn build_execution_providers(
        eps: &[OrtExecutionProvider],
    ) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
        use OrtExecutionProvider as EP;
        let mut providers = Vec::new();

        for ep in eps {
            match ep {
                EP::CPU => {
                    providers
                        .push(ort::execution_providers::CPUExecutionProvider::default().build());
                }
                #[cfg(feature = "cuda")]
                EP::CUDA { device_id } => {
                    let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                    if let Some(id) = device_id {
                        cuda = cuda.with_device_id(*id);
                    }
                    providers.push(cuda.build());
                }
                #[cfg(feature = "tensorrt")]
                EP::TensorRT {
                    device_id,
                    fp16_enable,
                } => {
                    let mut trt = ort::execution_providers::TensorRTExecutionProvider::default();
                    if let Some(id) = device_id {
                        trt = trt.with_device_id(*id);
                    }
                    if let Some(fp16) = fp16_enable {
                        trt = trt.with_fp16(*fp16);
                    }
                    providers.push(trt.build());
                }
                #[cfg(feature = "directml")]
                EP::DirectML { device_id } => {
                    let mut dml = ort::execution_providers::DirectMLExecutionProvider::default();
                    if let Some(id) = device_id {
                        dml = dml.with_device_id(*id);
                    }
                    providers.push(dml.build());
                }
                #[cfg(feature = "coreml")]
                EP::CoreML { subgraphs } => {
                    let mut coreml = ort::execution_providers::CoreMLExecutionProvider::default();
                    if let Some(sub) = subgraphs {
                        coreml = coreml.with_subgraphs(*sub);
                    }
                    providers.push(coreml.build());
                }
                #[cfg(feature = "openvino")]
                EP::OpenVINO { device_type } => {
                    let mut openvino =
                        ort::execution_providers::OpenVINOExecutionProvider::default();
                    if let Some(device) = device_type {
                        openvino = openvino.with_device_type(device.clone());
                    }
                    providers.push(openvino.build());
                }
                #[cfg(feature = "webgpu")]
                EP::WebGPU => {
                    providers
                        .push(ort::execution_providers::WebGPUExecutionProvider::default().build());
                }
                #[cfg(not(feature = "cuda"))]
                EP::CUDA { .. } => {
                    return Err(ort::Error::new(
                        "CUDA execution provider requested but cuda feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "tensorrt"))]
                EP::TensorRT { .. } => {
                    return Err(ort::Error::new(
                        "TensorRT execution provider requested but tensorrt feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "directml"))]
                EP::DirectML { .. } => {
                    return Err(ort::Error::new(
                        "DirectML execution provider requested but directml feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "coreml"))]
                EP::CoreML { .. } => {
                    return Err(ort::Error::new(
                        "CoreML execution provider requested but coreml feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "openvino"))]
                EP::OpenVINO { .. } => {
                    return Err(ort::Error::new(
                        "OpenVINO execution provider requested but openvino feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "webgpu"))]
                EP::WebGPU => {
                    return Err(ort::Error::new(
                        "WebGPU execution provider requested but webgpu feature is not enabled",
                    ));
                }
            }
        }

        Ok(providers)
    }
}
