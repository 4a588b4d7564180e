use std::sync::Arc;

use cinesub_core::{Config, SanitizedConfig, SubtitleOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SubtitleOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<SubtitleOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &SubtitleOrchestrator {
        self.orchestrator.as_ref()
    }
}
