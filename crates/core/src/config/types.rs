use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Remote backend credentials and quotas, one sub-table per provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendsConfig {
    #[serde(default = "default_huggingface")]
    pub huggingface: BackendConfig,
    #[serde(default = "default_gemini")]
    pub gemini: BackendConfig,
    #[serde(default = "default_groq")]
    pub groq: BackendConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            huggingface: default_huggingface(),
            gemini: default_gemini(),
            groq: default_groq(),
        }
    }
}

/// Configuration for a single remote backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// API key. Empty means the backend is not configured and is skipped.
    #[serde(default)]
    pub api_key: String,
    /// Daily call budget, reset at date rollover.
    pub daily_quota: u32,
    /// Override for the provider API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

fn default_huggingface() -> BackendConfig {
    BackendConfig {
        api_key: String::new(),
        daily_quota: 30_000,
        api_base: None,
    }
}

fn default_gemini() -> BackendConfig {
    BackendConfig {
        api_key: String::new(),
        daily_quota: 1_500,
        api_base: None,
    }
}

fn default_groq() -> BackendConfig {
    BackendConfig {
        api_key: String::new(),
        daily_quota: 14_400,
        api_base: None,
    }
}

/// Ensemble weights per backend category. The two LLM providers share the
/// `llm` category.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EnsembleWeights {
    pub huggingface: f64,
    pub llm: f64,
    pub heuristic: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            huggingface: 0.40,
            llm: 0.35,
            heuristic: 0.25,
        }
    }
}

impl EnsembleWeights {
    pub fn sum(&self) -> f64 {
        self.huggingface + self.llm + self.heuristic
    }
}

/// Aggregation and verdict configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnsembleConfig {
    #[serde(default)]
    pub weights: EnsembleWeights,
    /// Probability at or above which the verdict is FAKE.
    #[serde(default = "default_fake_threshold")]
    pub fake_threshold: f64,
    /// Probability at or below which the verdict is REAL.
    #[serde(default = "default_real_threshold")]
    pub real_threshold: f64,
    /// Below this confidence the verdict is always UNCERTAIN.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Per-backend deadline for remote calls, in seconds.
    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            weights: EnsembleWeights::default(),
            fake_threshold: default_fake_threshold(),
            real_threshold: default_real_threshold(),
            min_confidence: default_min_confidence(),
            model_timeout_secs: default_model_timeout(),
        }
    }
}

fn default_fake_threshold() -> f64 {
    0.7
}

fn default_real_threshold() -> f64 {
    0.3
}

fn default_min_confidence() -> f64 {
    0.6
}

fn default_model_timeout() -> u64 {
    10
}

/// Input text bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            max_text_length: default_max_text_length(),
        }
    }
}

fn default_min_text_length() -> usize {
    50
}

fn default_max_text_length() -> usize {
    5000
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("veriscan-cache.json")
}

fn default_cache_ttl() -> u64 {
    24
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub backends: SanitizedBackendsConfig,
    pub ensemble: EnsembleConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendsConfig {
    pub huggingface: SanitizedBackendConfig,
    pub gemini: SanitizedBackendConfig,
    pub groq: SanitizedBackendConfig,
}

/// Backend config with the API key reduced to a configured flag.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendConfig {
    pub api_key_configured: bool,
    pub daily_quota: u32,
}

impl From<&BackendConfig> for SanitizedBackendConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            api_key_configured: !config.api_key.is_empty(),
            daily_quota: config.daily_quota,
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            backends: SanitizedBackendsConfig {
                huggingface: (&config.backends.huggingface).into(),
                gemini: (&config.backends.gemini).into(),
                groq: (&config.backends.groq).into(),
            },
            ensemble: config.ensemble.clone(),
            analysis: config.analysis.clone(),
            cache: config.cache.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backends.huggingface.daily_quota, 30_000);
        assert_eq!(config.backends.gemini.daily_quota, 1_500);
        assert_eq!(config.backends.groq.daily_quota, 14_400);
        assert_eq!(config.ensemble.fake_threshold, 0.7);
        assert_eq!(config.ensemble.real_threshold, 0.3);
        assert_eq!(config.ensemble.min_confidence, 0.6);
        assert_eq!(config.ensemble.model_timeout_secs, 10);
        assert_eq!(config.analysis.min_text_length, 50);
        assert_eq!(config.analysis.max_text_length, 5000);
        assert_eq!(config.cache.ttl_hours, 24);
    }

    #[test]
    fn test_deserialize_partial_backend_config() {
        let toml = r#"
[backends.gemini]
api_key = "test-key"
daily_quota = 100
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backends.gemini.api_key, "test-key");
        assert_eq!(config.backends.gemini.daily_quota, 100);
        // Untouched backends keep their defaults
        assert!(config.backends.groq.api_key.is_empty());
        assert_eq!(config.backends.groq.daily_quota, 14_400);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = EnsembleWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sanitized_config_redacts_keys() {
        let mut config = Config::default();
        config.backends.gemini.api_key = "very-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
        assert!(sanitized.backends.gemini.api_key_configured);
        assert!(!sanitized.backends.groq.api_key_configured);
    }
}
