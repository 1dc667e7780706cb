//! ONNX Runtime session configuration.

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Execution providers, in the order ONNX Runtime should try them.
///
/// Non-CPU providers require the matching cargo feature; requesting one
/// without it fails when the session is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available).
    #[default]
    CPU,
    /// NVIDIA CUDA.
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
    /// NVIDIA TensorRT.
    TensorRT {
        /// TensorRT device ID (default: 0)
        device_id: Option<i32>,
        /// Enable FP16 kernels.
        fp16_enable: Option<bool>,
    },
    /// DirectML (Windows only).
    DirectML {
        /// DirectML device ID (default: 0)
        device_id: Option<i32>,
    },
    /// CoreML (macOS/iOS only).
    CoreML {
        /// Enable subgraphs.
        subgraphs: Option<bool>,
    },
    /// Intel OpenVINO.
    OpenVINO {
        /// Device type (e.g., "CPU", "GPU")
        device_type: Option<String>,
    },
    /// WebGPU.
    WebGPU,
}

impl OrtExecutionProvider {
    /// Parses a device string such as `cpu`, `cuda`, `cuda:1`, `tensorrt`,
    /// `directml:0`, `coreml`, `openvino:GPU` or `webgpu`.
    pub fn parse_device(device: &str) -> Result<Self, ConfigError> {
        let device = device.trim().to_ascii_lowercase();
        let (name, arg) = match device.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (device.as_str(), None),
        };

        let device_id = |arg: Option<&str>| -> Result<Option<i32>, ConfigError> {
            arg.map(|a| {
                a.parse::<i32>().map_err(|_| ConfigError::InvalidConfig {
                    message: format!("invalid device id '{}' in '{}'", a, device),
                })
            })
            .transpose()
        };

        match name {
            "cpu" => Ok(Self::CPU),
            "cuda" | "gpu" => Ok(Self::CUDA {
                device_id: device_id(arg)?,
            }),
            "tensorrt" | "trt" => Ok(Self::TensorRT {
                device_id: device_id(arg)?,
                fp16_enable: None,
            }),
            "directml" | "dml" => Ok(Self::DirectML {
                device_id: device_id(arg)?,
            }),
            "coreml" => Ok(Self::CoreML { subgraphs: None }),
            "openvino" => Ok(Self::OpenVINO {
                device_type: arg.map(|a| a.to_ascii_uppercase()),
            }),
            "webgpu" => Ok(Self::WebGPU),
            other => Err(ConfigError::InvalidConfig {
                message: format!("unknown device '{}'", other),
            }),
        }
    }
}

/// Configuration for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode
    pub parallel_execution: Option<bool>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
    /// Enable memory pattern optimization
    pub enable_mem_pattern: Option<bool>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = Some(enabled);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Replaces the execution provider list.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Appends a single execution provider.
    pub fn add_execution_provider(mut self, provider: OrtExecutionProvider) -> Self {
        self.execution_providers
            .get_or_insert_with(Vec::new)
            .push(provider);
        self
    }

    /// Enables or disables memory pattern optimization.
    pub fn with_memory_pattern(mut self, enable: bool) -> Self {
        self.enable_mem_pattern = Some(enable);
        self
    }

    /// Validates thread counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intra_threads == Some(0) || self.inter_threads == Some(0) {
            return Err(ConfigError::InvalidConfig {
                message: "thread counts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_new() {
        let config = OrtSessionConfig::new();
        assert!(config.intra_threads.is_none());
        assert!(config.optimization_level.is_none());
        assert!(config.execution_providers.is_none());
    }

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_optimization_level(OrtGraphOptimizationLevel::Level3)
            .add_execution_provider(OrtExecutionProvider::CUDA { device_id: Some(1) })
            .add_execution_provider(OrtExecutionProvider::CPU);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Level3)
        );
        assert_eq!(config.execution_providers.as_ref().map(Vec::len), Some(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = OrtSessionConfig::new().with_inter_threads(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_device() {
        assert_eq!(
            OrtExecutionProvider::parse_device("CPU").unwrap(),
            OrtExecutionProvider::CPU
        );
        assert_eq!(
            OrtExecutionProvider::parse_device("cuda:1").unwrap(),
            OrtExecutionProvider::CUDA { device_id: Some(1) }
        );
        assert_eq!(
            OrtExecutionProvider::parse_device("openvino:gpu").unwrap(),
            OrtExecutionProvider::OpenVINO {
                device_type: Some("GPU".to_string())
            }
        );
        assert!(OrtExecutionProvider::parse_device("cuda:x").is_err());
        assert!(OrtExecutionProvider::parse_device("tpu").is_err());
    }
}
