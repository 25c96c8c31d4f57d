use tracing::warn;

use super::{
    types::{Config, EnsembleWeights},
    ConfigError,
};

/// Validate a loaded configuration, repairing what can be repaired.
///
/// Ensemble weights that do not sum to ~1.0 are replaced with the defaults
/// (with a warning) rather than rejected. Threshold ordering and text bounds
/// are hard errors.
pub fn validate_config(config: &mut Config) -> Result<(), ConfigError> {
    let sum = config.ensemble.weights.sum();
    if !(0.99..=1.01).contains(&sum) {
        warn!(
            weight_sum = sum,
            "ensemble weights do not sum to 1.0, using defaults"
        );
        config.ensemble.weights = EnsembleWeights::default();
    }

    let ensemble = &config.ensemble;
    for (name, value) in [
        ("fake_threshold", ensemble.fake_threshold),
        ("real_threshold", ensemble.real_threshold),
        ("min_confidence", ensemble.min_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Invalid(format!(
                "{} must be within [0, 1], got {}",
                name, value
            )));
        }
    }

    if ensemble.real_threshold >= ensemble.fake_threshold {
        return Err(ConfigError::Invalid(format!(
            "real_threshold ({}) must be below fake_threshold ({})",
            ensemble.real_threshold, ensemble.fake_threshold
        )));
    }

    if ensemble.model_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "model_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.analysis.min_text_length >= config.analysis.max_text_length {
        return Err(ConfigError::Invalid(format!(
            "min_text_length ({}) must be below max_text_length ({})",
            config.analysis.min_text_length, config.analysis.max_text_length
        )));
    }

    Ok(())
}
