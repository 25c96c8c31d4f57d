pub mod loader;
pub mod types;
pub mod validate;

use thiserror::Error;

pub use loader::{load_config, load_config_from_str, load_default_config};
pub use types::{
    AnalysisConfig, BackendConfig, BackendsConfig, CacheConfig, Config, EnsembleConfig,
    EnsembleWeights, SanitizedBackendConfig, SanitizedConfig, ServerConfig,
};
pub use validate::validate_config;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
