//! # NewsDesk AI Gateway
//!
//! Resilient multi-provider orchestration for the AI-assistant endpoints
//! of a news-editorial CMS: editorial chat, article summarization,
//! structured extraction (5W1H, headlines, SEO metadata) and translation.
//!
//! One logical "answer this prompt" call becomes a safe sequence of
//! provider attempts: normalization, a canned fast path, a TTL+LRU
//! response cache, oversized-input chunking with map-reduce
//! summarization, retry with jittered exponential backoff, cross-provider
//! failover, and tolerant structured-output parsing. End users see a
//! degraded answer, never a raw upstream failure.
//!
//! ## Library use
//!
//! ```rust,no_run
//! use newsdesk_gateway::config::Config;
//! use newsdesk_gateway::core::{GenerationOptions, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.apply_env_overrides();
//!     let orchestrator = Orchestrator::new(config)?;
//!     let outcome = orchestrator
//!         .ask("Suggest a lede for the harbor story", GenerationOptions::default())
//!         .await?;
//!     println!("{}", outcome.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Server mode
//!
//! ```rust,no_run
//! use newsdesk_gateway::{config::Config, server::HttpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml")?;
//!     HttpServer::new(config)?.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use core::{
    Assembled, ClassifiedError, ErrorKind, GenerationOptions, GenerativeProvider, Orchestrator,
    ProviderError, ProviderRegistry, TaskKind, Usage,
};
pub use utils::error::{OrchestratorError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
