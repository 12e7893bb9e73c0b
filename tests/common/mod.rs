//! Shared fixtures for the integration tests: a scripted in-memory
//! provider and fast-retry configurations.

#![allow(dead_code)]

use async_trait::async_trait;
use newsdesk_gateway::config::{Config, ProviderSettings};
use newsdesk_gateway::core::providers::{
    GenerativeProvider, ProviderError, ProviderRequest, ProviderResponse,
};
use newsdesk_gateway::core::types::Usage;
use newsdesk_gateway::core::ProviderRegistry;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

enum Behavior {
    /// Replay outcomes in order, then error
    Script(Mutex<VecDeque<Result<String, ProviderError>>>),
    AlwaysOk(String),
    AlwaysErr(ProviderError),
}

/// In-memory provider whose outcomes are fixed up front and whose call
/// count is observable, so tests can prove when no provider was contacted.
pub struct ScriptedProvider {
    id: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn scripted(
        id: &'static str,
        outcomes: Vec<Result<String, ProviderError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Behavior::Script(Mutex::new(outcomes.into())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always_ok(id: &'static str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Behavior::AlwaysOk(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always_err(id: &'static str, error: ProviderError) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Behavior::AlwaysErr(error),
            calls: AtomicUsize::new(0),
        })
    }

    /// Total `generate` calls observed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn response(&self, request: &ProviderRequest, text: String) -> ProviderResponse {
        ProviderResponse {
            text,
            model: request.model.clone(),
            usage: Usage {
                prompt_tokens: 3,
                completion_tokens: 7,
                total_tokens: 10,
            },
        }
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn id(&self) -> &str {
        self.id
    }

    async fn generate(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Script(script) => match script.lock().pop_front() {
                Some(Ok(text)) => Ok(self.response(request, text)),
                Some(Err(error)) => Err(error),
                None => Err(ProviderError::other(self.id, "script exhausted")),
            },
            Behavior::AlwaysOk(text) => Ok(self.response(request, text.clone())),
            Behavior::AlwaysErr(error) => Err(error.clone()),
        }
    }
}

/// Register scripted providers under their own ids
pub fn registry_of(providers: &[Arc<ScriptedProvider>]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider.clone());
    }
    registry
}

pub fn provider_settings(
    name: &str,
    primary_model: &str,
    fallback_model: Option<&str>,
) -> ProviderSettings {
    ProviderSettings {
        name: name.to_string(),
        api_key: "test-key".to_string(),
        base_url: None,
        primary_model: primary_model.to_string(),
        fallback_model: fallback_model.map(str::to_string),
    }
}

/// Two credentialed providers and millisecond backoff so retry paths
/// finish fast
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.providers = vec![
        provider_settings("openai", "gpt-4o", Some("gpt-4o-mini")),
        provider_settings("anthropic", "claude-sonnet", Some("claude-haiku")),
    ];
    config.retry.max_attempts = 2;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 2;
    config.retry.attempt_timeout_secs = 5;
    config
}

/// Single credentialed provider, no model fallback
pub fn openai_only_config() -> Config {
    let mut config = test_config();
    config.providers = vec![provider_settings("openai", "gpt-4o", None)];
    config
}
