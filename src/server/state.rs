//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::Orchestrator;
use std::sync::Arc;

/// Shared resources for request handlers, cheap to clone
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (read-only after startup)
    pub config: Arc<Config>,
    /// The orchestration pipeline, including the response cache
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }
}
