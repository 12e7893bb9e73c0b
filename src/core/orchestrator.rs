//! The orchestration pipeline
//!
//! Wires the pieces together for one logical request:
//! normalize -> canned check -> cache check -> execute (single call, or
//! chunked map-reduce) -> assemble -> cache write. Owns the response
//! cache explicitly; nothing here is process-global.

use crate::config::Config;
use crate::core::assemble::{self, Assembled};
use crate::core::cache::{CachedGeneration, CacheStats, ResponseCache};
use crate::core::canned;
use crate::core::chunker;
use crate::core::classify::ClassifiedError;
use crate::core::executor::{build_chain, ChainExecutor};
use crate::core::normalize::normalize;
use crate::core::prompts;
use crate::core::providers::{registry_from_config, ProviderRegistry};
use crate::core::summarize::map_reduce;
use crate::core::types::{GenerationCall, GenerationOptions, TaskKind, Usage};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an assistant chat request
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    /// None when the answer came from the canned fast path
    pub model: Option<String>,
    pub usage: Usage,
    pub cached: bool,
    pub canned: bool,
}

/// Result of a summarize request
#[derive(Debug, Clone)]
pub struct SummarizeOutcome {
    pub summary: String,
    pub model: String,
    pub usage: Usage,
    /// How many chunks the input was split into (1 = no map-reduce)
    pub chunks: usize,
    pub cached: bool,
}

/// Result of a structured-extraction request
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub result: Assembled,
    pub model: String,
    pub usage: Usage,
    pub cached: bool,
}

/// The resilient multi-provider generative-request orchestrator
pub struct Orchestrator {
    config: Arc<Config>,
    executor: ChainExecutor,
    registry: Arc<ProviderRegistry>,
    cache: ResponseCache,
}

impl Orchestrator {
    /// Build an orchestrator from configuration, constructing provider
    /// clients for every credentialed provider
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let registry = registry_from_config(&config)?;
        Self::with_registry(config, registry)
    }

    /// Build an orchestrator around an existing registry (tests inject
    /// scripted providers this way)
    pub fn with_registry(config: Config, registry: ProviderRegistry) -> Result<Self> {
        config.validate()?;
        let cache = ResponseCache::new(&config.cache)?;
        let registry = Arc::new(registry);
        let executor = ChainExecutor::new(registry.clone(), config.retry.clone());
        info!(providers = ?registry.ids(), "orchestrator ready");
        Ok(Self {
            config: Arc::new(config),
            executor,
            registry,
            cache,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ids of registered providers, for the health endpoint
    pub fn provider_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn cache_enabled(&self, options: &GenerationOptions) -> bool {
        self.config.cache.enabled && !options.bypass_cache
    }

    /// Editorial assistant chat
    pub async fn ask(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> std::result::Result<AskOutcome, ClassifiedError> {
        let spec = normalize(prompt, options, self.config.limits.max_input_chars);

        if self.config.canned_responses && spec.options.allow_canned {
            if let Some(reply) = canned::match_canned(&spec.input) {
                debug!("canned response served, no provider contacted");
                return Ok(AskOutcome {
                    answer: reply.to_string(),
                    model: None,
                    usage: Usage::default(),
                    cached: false,
                    canned: true,
                });
            }
        }

        let use_cache = self.cache_enabled(&spec.options);
        if use_cache {
            if let Some(hit) = self.cache.get(&spec.key) {
                return Ok(AskOutcome {
                    answer: hit.text,
                    model: Some(hit.model),
                    usage: hit.usage,
                    cached: true,
                    canned: false,
                });
            }
        }

        let chain = build_chain(&self.config, &self.registry, &spec.options);
        let call = GenerationCall::new(prompts::chat(&spec.input))
            .with_temperature(spec.options.temperature.unwrap_or(0.7))
            .with_max_output_tokens(spec.options.max_output_tokens.unwrap_or(1024));
        let outcome = self.executor.execute(&chain, &call).await?;

        let answer = assemble::clean_text(&outcome.text);
        let model = outcome.candidate.to_string();
        if use_cache {
            self.cache.put(
                spec.key,
                CachedGeneration {
                    text: answer.clone(),
                    model: model.clone(),
                    usage: outcome.usage.clone(),
                },
            );
        }
        Ok(AskOutcome {
            answer,
            model: Some(model),
            usage: outcome.usage,
            cached: false,
            canned: false,
        })
    }

    /// Article summarization, map-reduce for oversized input
    pub async fn summarize(
        &self,
        text: &str,
        bullets: usize,
        options: GenerationOptions,
    ) -> std::result::Result<SummarizeOutcome, ClassifiedError> {
        let options = GenerationOptions {
            task: TaskKind::Summarize,
            ..options
        };
        let spec = normalize(text, options, self.config.limits.max_input_chars);
        let chunks = chunker::chunk(&spec.input, &self.config.chunking);

        let use_cache = self.cache_enabled(&spec.options);
        if use_cache {
            if let Some(hit) = self.cache.get(&spec.key) {
                return Ok(SummarizeOutcome {
                    summary: hit.text,
                    model: hit.model,
                    usage: hit.usage,
                    chunks: chunks.len(),
                    cached: true,
                });
            }
        }

        let chain = build_chain(&self.config, &self.registry, &spec.options);
        let temperature = spec.options.temperature.unwrap_or(0.3);

        let (summary, model, usage) = if chunks.len() == 1 {
            let call = GenerationCall::new(prompts::summary(&spec.input, bullets))
                .with_temperature(temperature)
                .with_max_output_tokens(spec.options.max_output_tokens.unwrap_or(512));
            let outcome = self.executor.execute(&chain, &call).await?;
            (
                assemble::clean_text(&outcome.text),
                outcome.candidate.to_string(),
                outcome.usage,
            )
        } else {
            info!(chunks = chunks.len(), "input over chunk trigger, running map-reduce");
            let outcome = map_reduce(&self.executor, &chain, &chunks, bullets, temperature).await?;
            (outcome.text, outcome.candidate.to_string(), outcome.usage)
        };

        if use_cache {
            self.cache.put(
                spec.key,
                CachedGeneration {
                    text: summary.clone(),
                    model: model.clone(),
                    usage: usage.clone(),
                },
            );
        }
        Ok(SummarizeOutcome {
            summary,
            model,
            usage,
            chunks: chunks.len(),
            cached: false,
        })
    }

    /// Structured extraction and rewrite tasks (5W1H, headline, SEO
    /// meta, translation)
    pub async fn extract(
        &self,
        text: &str,
        title: Option<&str>,
        options: GenerationOptions,
    ) -> std::result::Result<ExtractOutcome, ClassifiedError> {
        let task = options.task;
        let spec = normalize(text, options, self.config.limits.max_input_chars);

        let use_cache = self.cache_enabled(&spec.options);
        if use_cache {
            if let Some(hit) = self.cache.get(&spec.key) {
                return Ok(ExtractOutcome {
                    result: Self::assemble_for(task, &hit.text),
                    model: hit.model,
                    usage: hit.usage,
                    cached: true,
                });
            }
        }

        let chain = build_chain(&self.config, &self.registry, &spec.options);
        let prompt = prompts::task(task, &spec.input, title, spec.options.target_lang.as_deref());
        let call = GenerationCall::new(prompt)
            .with_temperature(spec.options.temperature.unwrap_or(0.2))
            .with_max_output_tokens(spec.options.max_output_tokens.unwrap_or(1024));
        let outcome = self.executor.execute(&chain, &call).await?;

        let model = outcome.candidate.to_string();
        if use_cache {
            self.cache.put(
                spec.key,
                CachedGeneration {
                    text: outcome.text.clone(),
                    model: model.clone(),
                    usage: outcome.usage.clone(),
                },
            );
        }
        Ok(ExtractOutcome {
            result: Self::assemble_for(task, &outcome.text),
            model,
            usage: outcome.usage,
            cached: false,
        })
    }

    /// Deterministic assembly, re-run on cache hits instead of stored
    fn assemble_for(task: TaskKind, raw: &str) -> Assembled {
        if task.expects_json() {
            assemble::assemble_structured(raw)
        } else {
            Assembled::Structured(serde_json::Value::String(assemble::clean_text(raw)))
        }
    }
}
