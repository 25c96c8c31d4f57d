pub mod analyzer;
pub mod backend;
pub mod cache;
pub mod config;
pub mod ensemble;
pub mod heuristic;
pub mod metrics;
pub mod testing;
pub mod validate;

pub use analyzer::{Analyzer, AnalyzeError};
pub use backend::{
    Availability, BackendError, BackendResult, BackendStatus, GeminiBackend, GroqBackend,
    HealthStats, HuggingFaceBackend, QuotaUsage, TextBackend,
};
pub use cache::{CacheManager, CacheStats};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
    EnsembleWeights, SanitizedConfig,
};
pub use ensemble::{
    EnsemblePredictor, FallbackChain, ModelScore, Prediction, SystemHealth, SystemStatus, Verdict,
};
pub use heuristic::{HeuristicAnalyzer, Indicator, Severity};
pub use validate::{sanitize_text, validate_text, TextValidationError};
