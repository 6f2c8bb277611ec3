//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while loading configuration.
///
/// Generation itself never fails; out-of-range values are clamped instead.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error reading a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
