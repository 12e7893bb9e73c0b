//! Shared types for the orchestration core

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caller wants done with the input text.
///
/// The task participates in the cache key because it changes output
/// semantics: the same article summarized and translated must never
/// share a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Free-form editorial assistant chat
    Chat,
    /// Article summarization (possibly map-reduce over chunks)
    Summarize,
    /// 5W1H extraction as a JSON object
    FiveWOneH,
    /// Single news headline suggestion
    Headline,
    /// SEO title/description/keywords as a JSON object
    SeoMeta,
    /// Translation into a target language
    Translate,
}

impl TaskKind {
    /// Stable identifier used in logs and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Chat => "chat",
            TaskKind::Summarize => "summarize",
            TaskKind::FiveWOneH => "five_w_one_h",
            TaskKind::Headline => "headline",
            TaskKind::SeoMeta => "seo_meta",
            TaskKind::Translate => "translate",
        }
    }

    /// Whether the task expects a JSON object from the model
    pub fn expects_json(&self) -> bool {
        matches!(self, TaskKind::FiveWOneH | TaskKind::SeoMeta)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token accounting reported by providers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Accumulate usage from another call (used by map-reduce)
    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// Options that shape a single logical generation request
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Task the input should be processed as
    pub task: TaskKind,
    /// Explicitly requested provider id, tried first when present
    pub provider_hint: Option<String>,
    /// Explicitly requested model id, paired with the provider hint
    pub model_hint: Option<String>,
    /// Sampling temperature passed through to providers
    pub temperature: Option<f32>,
    /// Output size bound passed through to providers
    pub max_output_tokens: Option<u32>,
    /// Target language for translation tasks
    pub target_lang: Option<String>,
    /// Prefer each provider's cheaper fallback model ahead of its primary
    pub fast: bool,
    /// Skip both cache lookup and cache write for this call
    pub bypass_cache: bool,
    /// Allow the canned-response fast path
    pub allow_canned: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            task: TaskKind::Chat,
            provider_hint: None,
            model_hint: None,
            temperature: None,
            max_output_tokens: None,
            target_lang: None,
            fast: false,
            bypass_cache: false,
            allow_canned: true,
        }
    }
}

/// One (provider, model) pair the chain executor may try
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub provider: String,
    pub model: String,
}

impl Candidate {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// One prompt the executor should run through the candidate chain
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationCall {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// Outcome of a successful chain execution
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    /// Raw text produced by the winning candidate
    pub text: String,
    /// Candidate that produced the text
    pub candidate: Candidate,
    /// Token usage reported for the winning call
    pub usage: Usage,
    /// Total attempts across all candidates, including the success
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&TaskKind::FiveWOneH).unwrap();
        assert_eq!(json, "\"five_w_one_h\"");
        let back: TaskKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskKind::FiveWOneH);
    }

    #[test]
    fn usage_accumulates() {
        let mut total = Usage::default();
        total.add(&Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.add(&Usage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        });
        assert_eq!(total.total_tokens, 18);
    }
}
