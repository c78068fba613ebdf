use std::sync::Arc;
use archivist_core::{Config, JobProcessor, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    processor: Arc<JobProcessor>,
}

impl AppState {
    pub fn new(config: Config, processor: Arc<JobProcessor>) -> Self {
        Self { config, processor }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn processor(&self) -> &JobProcessor {
        self.processor.as_ref()
    }
}
