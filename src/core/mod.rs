//! Orchestration core
//!
//! Everything between "a caller wants text generated" and "a provider
//! answered or the chain is exhausted" lives here. Components are pure
//! or self-contained and composed by [`orchestrator::Orchestrator`].

pub mod assemble;
pub mod cache;
pub mod canned;
pub mod chunker;
pub mod classify;
pub mod executor;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod summarize;
pub mod types;

pub use assemble::Assembled;
pub use cache::{CacheKey, CachedGeneration, ResponseCache};
pub use classify::{ClassifiedError, ErrorKind};
pub use executor::{build_chain, ChainExecutor};
pub use orchestrator::{AskOutcome, ExtractOutcome, Orchestrator, SummarizeOutcome};
pub use providers::{GenerativeProvider, ProviderError, ProviderRegistry};
pub use types::{Candidate, ChainOutcome, GenerationCall, GenerationOptions, TaskKind, Usage};
