use std::sync::Arc;

use prometheus::Registry;
use veriscan_core::{Analyzer, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    analyzer: Arc<Analyzer>,
    registry: Registry,
}

impl AppState {
    pub fn new(config: Config, analyzer: Arc<Analyzer>, registry: Registry) -> Self {
        Self {
            config,
            analyzer,
            registry,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}
