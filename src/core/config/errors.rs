//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a model or data path does not exist.
    #[error("path does not exist: {path}")]
    PathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a resource limit has been exceeded.
    #[error("resource limit exceeded: {message}")]
    ResourceLimitExceeded { message: String },
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Checks that `path` exists and is a regular file.
    fn validate_file_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            })
        } else if !path.is_file() {
            Err(ConfigError::InvalidConfig {
                message: format!("path is not a file: {}", path.display()),
            })
        } else {
            Ok(())
        }
    }

    /// Checks that an image dimension pair is positive.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            Err(ConfigError::InvalidConfig {
                message: "Image dimensions must be positive".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Checks that an alpha/opacity value lies in `[0, 1]`.
    fn validate_unit_interval(&self, name: &str, value: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be between 0.0 and 1.0, got {}", name, value),
            })
        } else {
            Ok(())
        }
    }
}
