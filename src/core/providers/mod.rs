//! Provider clients and the capability seam the executor depends on
//!
//! The chain executor only knows the [`GenerativeProvider`] trait and the
//! [`ProviderRegistry`]; concrete HTTP clients live in their own modules
//! and are constructed from configuration at startup.

mod anthropic;
mod error;
mod openai;

pub use anthropic::AnthropicProvider;
pub use error::ProviderError;
pub use openai::OpenAiProvider;

use crate::config::Config;
use crate::core::types::Usage;
use crate::utils::error::{OrchestratorError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// One concrete call a provider client must perform
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Text produced by a provider, plus reported accounting
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    pub usage: Usage,
}

/// Capability interface implemented by every provider client
///
/// One logical operation: turn a prompt into text. Everything else
/// (retry, failover, caching, chunking) is the orchestrator's business.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Stable id used in candidate chains and configuration
    fn id(&self) -> &str;

    /// Perform one generation call
    async fn generate(&self, request: &ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

/// Registry of configured providers, keyed by provider id
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn GenerativeProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its own id
    pub fn register(&mut self, provider: Arc<dyn GenerativeProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    /// Get a provider by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn GenerativeProvider>> {
        self.providers.get(id).cloned()
    }

    /// Check whether a provider id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Ids of all registered providers
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field("providers", &self.ids())
            .finish()
    }
}

/// Build a registry from every configured provider carrying a credential
///
/// Providers without an API key are skipped, not rejected: the chain is
/// simply built from whatever remains. An unknown provider name is a
/// configuration error.
pub fn registry_from_config(config: &Config) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for settings in &config.providers {
        if settings.api_key.is_empty() {
            tracing::debug!(provider = %settings.name, "skipping provider without credentials");
            continue;
        }
        match settings.name.as_str() {
            "openai" => registry.register(Arc::new(OpenAiProvider::from_settings(settings)?)),
            "anthropic" => registry.register(Arc::new(AnthropicProvider::from_settings(settings)?)),
            other => {
                return Err(OrchestratorError::config(format!(
                    "unknown provider '{other}' in configuration"
                )));
            }
        }
    }
    Ok(registry)
}
