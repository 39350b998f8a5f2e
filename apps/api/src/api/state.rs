use std::sync::Arc;

use crate::agents::llm::{ClientFactory, OpenAiClientFactory};
use crate::config::AppConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Builds a completion client from the caller's API key
    pub clients: Arc<dyn ClientFactory>,
}

impl AppState {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }

    /// State backed by the OpenAI-compatible client from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(OpenAiClientFactory::new(config.model.clone())))
    }
}
