//! Gateway configuration
//!
//! Behavior is driven by an explicit [`Config`] struct constructed at
//! startup: a YAML file plus environment overrides for credentials only.
//! No component reads process state after construction, so a given config
//! value always reproduces the same behavior.

use crate::utils::error::{OrchestratorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_listen() -> String {
    "127.0.0.1:8788".to_string()
}

fn default_max_input_chars() -> usize {
    24_000
}

fn default_trigger_chars() -> usize {
    8_000
}

fn default_chunk_size_chars() -> usize {
    3_500
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_cache_max_entries() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    400
}

fn default_max_delay_ms() -> u64 {
    8_000
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the gateway listens on
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// One configured provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider id ("openai" or "anthropic")
    pub name: String,
    /// API key; empty means the provider is left out of the chain
    #[serde(default)]
    pub api_key: String,
    /// Endpoint override, used for self-hosted gateways and tests
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model tried first for this provider
    pub primary_model: String,
    /// Cheaper model inserted right after the primary in the chain
    #[serde(default)]
    pub fallback_model: Option<String>,
}

/// Input size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Over-long input is truncated to this many characters, not rejected
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Chunker sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Inputs at or below this many characters stay a single chunk
    #[serde(default = "default_trigger_chars")]
    pub trigger_chars: usize,
    /// Maximum characters per produced chunk
    #[serde(default = "default_chunk_size_chars")]
    pub chunk_size_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            trigger_chars: default_trigger_chars(),
            chunk_size_chars: default_chunk_size_chars(),
        }
    }
}

/// Response cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Retry, backoff and timeout policy for the chain executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per candidate before failing over
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff cap in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Optional ceiling over the whole retry/failover sequence; absent
    /// means worst-case latency is retries x candidates x (timeout + backoff)
    #[serde(default)]
    pub total_deadline_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            total_deadline_secs: None,
        }
    }
}

/// Top-level gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Providers in fixed preference order
    #[serde(default = "Config::default_providers")]
    pub providers: Vec<ProviderSettings>,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Convert exhausted rate limits into a polite degraded 200
    #[serde(default = "default_true")]
    pub soft_fallback: bool,
    /// Answer trivial greetings without contacting a provider
    #[serde(default = "default_true")]
    pub canned_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: Self::default_providers(),
            limits: LimitsConfig::default(),
            chunking: ChunkingConfig::default(),
            cache: CacheSettings::default(),
            retry: RetryConfig::default(),
            soft_fallback: true,
            canned_responses: true,
        }
    }
}

impl Config {
    fn default_providers() -> Vec<ProviderSettings> {
        vec![
            ProviderSettings {
                name: "openai".to_string(),
                api_key: String::new(),
                base_url: None,
                primary_model: "gpt-4o".to_string(),
                fallback_model: Some("gpt-4o-mini".to_string()),
            },
            ProviderSettings {
                name: "anthropic".to_string(),
                api_key: String::new(),
                base_url: None,
                primary_model: "claude-3-5-sonnet-20241022".to_string(),
                fallback_model: Some("claude-3-5-haiku-20241022".to_string()),
            },
        ]
    }

    /// Load configuration from a YAML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply recognized environment overrides (credentials and listen address)
    ///
    /// `NEWSDESK_OPENAI_API_KEY`, `NEWSDESK_ANTHROPIC_API_KEY`, `NEWSDESK_LISTEN`.
    pub fn apply_env_overrides(&mut self) {
        for provider in &mut self.providers {
            let var = match provider.name.as_str() {
                "openai" => "NEWSDESK_OPENAI_API_KEY",
                "anthropic" => "NEWSDESK_ANTHROPIC_API_KEY",
                _ => continue,
            };
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    provider.api_key = key;
                }
            }
        }
        if let Ok(listen) = std::env::var("NEWSDESK_LISTEN") {
            if !listen.is_empty() {
                self.server.listen = listen;
            }
        }
    }

    /// Fatal configuration checks, run once at construction
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_input_chars == 0 {
            return Err(OrchestratorError::config("limits.max_input_chars must be positive"));
        }
        if self.chunking.trigger_chars == 0 || self.chunking.chunk_size_chars == 0 {
            return Err(OrchestratorError::config(
                "chunking.trigger_chars and chunking.chunk_size_chars must be positive",
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(OrchestratorError::config("cache.max_entries must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(OrchestratorError::config("retry.max_attempts must be at least 1"));
        }
        let mut seen = std::collections::HashSet::new();
        for provider in &self.providers {
            if provider.primary_model.is_empty() {
                return Err(OrchestratorError::config(format!(
                    "provider '{}' has no primary_model",
                    provider.name
                )));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(OrchestratorError::config(format!(
                    "provider '{}' is configured twice",
                    provider.name
                )));
            }
        }
        Ok(())
    }

    /// Providers that carry a credential, in preference order
    pub fn configured_providers(&self) -> impl Iterator<Item = &ProviderSettings> {
        self.providers.iter().filter(|p| !p.api_key.is_empty())
    }
}
