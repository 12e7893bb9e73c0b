//! Provider chain executor
//!
//! Runs one logical request through an ordered list of (provider, model)
//! candidates: per-attempt timeout, jittered exponential backoff on
//! retryable failures, failover to the next candidate when a failure is
//! not worth retrying locally. Only when the whole chain is exhausted
//! does an error surface, and it is always the last classified error.

use crate::config::{Config, RetryConfig};
use crate::core::classify::{classify, ClassifiedError, ErrorKind};
use crate::core::providers::{ProviderRegistry, ProviderRequest};
use crate::core::types::{Candidate, ChainOutcome, GenerationCall, GenerationOptions};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One finished provider call, kept only for the duration of the loop
#[derive(Debug)]
struct AttemptRecord {
    candidate: Candidate,
    attempt: u32,
    elapsed: Duration,
    kind: ErrorKind,
}

/// Executes candidate chains against the provider registry
pub struct ChainExecutor {
    registry: Arc<ProviderRegistry>,
    retry: RetryConfig,
}

impl ChainExecutor {
    pub fn new(registry: Arc<ProviderRegistry>, retry: RetryConfig) -> Self {
        Self { registry, retry }
    }

    /// Backoff delay after failed attempt `attempt` (1-based)
    ///
    /// `min(max_delay, base * 2^attempt)` scaled by a jitter factor in
    /// [0.5, 1.5], so concurrent requests do not retry in lockstep.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .retry
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped = exponential.min(self.retry.max_delay_ms);
        let jitter: f64 = rand::thread_rng().gen_range(0.5..=1.5);
        Duration::from_millis((capped as f64 * jitter).round() as u64)
    }

    fn deadline_from(&self, started: Instant) -> Option<Instant> {
        self.retry
            .total_deadline_secs
            .map(|secs| started + Duration::from_secs(secs))
    }

    /// Run `call` through the chain until one candidate succeeds
    pub async fn execute(
        &self,
        chain: &[Candidate],
        call: &GenerationCall,
    ) -> Result<ChainOutcome, ClassifiedError> {
        if chain.is_empty() {
            return Err(ClassifiedError::new(
                ErrorKind::Unknown,
                "gateway",
                "no provider candidates configured",
            ));
        }

        let started = Instant::now();
        let deadline = self.deadline_from(started);
        let mut history: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ClassifiedError> = None;

        'candidates: for candidate in chain {
            let Some(provider) = self.registry.get(&candidate.provider) else {
                warn!(candidate = %candidate, "candidate references an unregistered provider");
                continue;
            };
            let request = ProviderRequest {
                model: candidate.model.clone(),
                prompt: call.prompt.clone(),
                temperature: call.temperature,
                max_output_tokens: call.max_output_tokens,
            };

            // Attempt numbering restarts at 1 for every candidate
            for attempt in 1..=self.retry.max_attempts {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        warn!(candidate = %candidate, "total deadline exhausted before attempt");
                        break 'candidates;
                    }
                }

                let attempt_started = Instant::now();
                let timeout = Duration::from_secs(self.retry.attempt_timeout_secs);
                let result = match tokio::time::timeout(timeout, provider.generate(&request)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(crate::core::providers::ProviderError::timeout(
                        candidate.provider.clone(),
                        self.retry.attempt_timeout_secs,
                    )),
                };

                match result {
                    Ok(response) => {
                        let attempts = history.len() as u32 + 1;
                        debug!(
                            candidate = %candidate,
                            attempt,
                            attempts,
                            elapsed_ms = attempt_started.elapsed().as_millis() as u64,
                            "chain execution succeeded"
                        );
                        return Ok(ChainOutcome {
                            text: response.text,
                            candidate: candidate.clone(),
                            usage: response.usage,
                            attempts,
                        });
                    }
                    Err(provider_error) => {
                        let classified = classify(&provider_error);
                        warn!(
                            candidate = %candidate,
                            attempt,
                            kind = classified.kind.as_str(),
                            error = %classified.message,
                            "provider attempt failed"
                        );
                        history.push(AttemptRecord {
                            candidate: candidate.clone(),
                            attempt,
                            elapsed: attempt_started.elapsed(),
                            kind: classified.kind,
                        });

                        if classified.retryable && attempt < self.retry.max_attempts {
                            let delay = self.backoff_delay(attempt);
                            if let Some(deadline) = deadline {
                                if Instant::now() + delay >= deadline {
                                    last_error = Some(classified);
                                    break 'candidates;
                                }
                            }
                            debug!(candidate = %candidate, delay_ms = delay.as_millis() as u64, "backing off before retry");
                            last_error = Some(classified);
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        let failover = classified.failover_eligible;
                        last_error = Some(classified);
                        if failover {
                            continue 'candidates;
                        }
                        break 'candidates;
                    }
                }
            }
        }

        debug!(attempts = history.len(), history = ?history, "candidate chain exhausted");
        Err(last_error.unwrap_or_else(|| {
            ClassifiedError::new(
                ErrorKind::Timeout,
                "gateway",
                "total deadline exhausted before any attempt completed",
            )
        }))
    }
}

/// Build the ordered candidate chain for one request
///
/// An explicit provider hint goes first (with the hinted model or that
/// provider's primary). The rest of the chain walks configured providers
/// in preference order, each contributing primary then fallback model;
/// `fast` swaps the two so the cheaper model leads.
pub fn build_chain(
    config: &Config,
    registry: &ProviderRegistry,
    options: &GenerationOptions,
) -> Vec<Candidate> {
    let mut chain: Vec<Candidate> = Vec::new();

    if let Some(hinted) = &options.provider_hint {
        if registry.contains(hinted) {
            let model = options.model_hint.clone().or_else(|| {
                config
                    .providers
                    .iter()
                    .find(|p| &p.name == hinted)
                    .map(|p| p.primary_model.clone())
            });
            if let Some(model) = model {
                chain.push(Candidate::new(hinted.clone(), model));
            }
        } else {
            warn!(provider = %hinted, "ignoring hint for unconfigured provider");
        }
    }

    for settings in config.configured_providers() {
        if !registry.contains(&settings.name) {
            continue;
        }
        let primary = Candidate::new(settings.name.clone(), settings.primary_model.clone());
        let fallback = settings
            .fallback_model
            .as_ref()
            .map(|m| Candidate::new(settings.name.clone(), m.clone()));
        if options.fast {
            if let Some(fallback) = fallback.clone() {
                chain.push(fallback);
            }
            chain.push(primary);
        } else {
            chain.push(primary);
            if let Some(fallback) = fallback {
                chain.push(fallback);
            }
        }
    }

    // Drop duplicates introduced by hints, keeping first occurrence
    let mut seen = std::collections::HashSet::new();
    chain.retain(|c| seen.insert(c.clone()));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::{
        GenerativeProvider, ProviderError, ProviderRegistry, ProviderResponse,
    };
    use crate::core::types::Usage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that replays a scripted sequence of results
    struct ScriptedProvider {
        id: String,
        script: Mutex<Vec<Result<String, ProviderError>>>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(id: &str, script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeProvider for ScriptedProvider {
        fn id(&self) -> &str {
            &self.id
        }

        async fn generate(
            &self,
            request: &ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            if script.is_empty() {
                return Err(ProviderError::other(self.id.clone(), "script exhausted"));
            }
            script.remove(0).map(|text| ProviderResponse {
                text,
                model: request.model.clone(),
                usage: Usage::default(),
            })
        }
    }

    fn retry_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            base_delay_ms: 1,
            max_delay_ms: 4,
            attempt_timeout_secs: 5,
            total_deadline_secs: None,
        }
    }

    fn executor_with(providers: Vec<Arc<ScriptedProvider>>) -> ChainExecutor {
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(provider);
        }
        ChainExecutor::new(Arc::new(registry), retry_config())
    }

    #[test]
    fn backoff_never_exceeds_the_cap() {
        let executor = ChainExecutor::new(
            Arc::new(ProviderRegistry::new()),
            RetryConfig {
                max_attempts: 10,
                base_delay_ms: 100,
                max_delay_ms: 750,
                attempt_timeout_secs: 5,
                total_deadline_secs: None,
            },
        );
        for attempt in 1..=10 {
            let delay = executor.backoff_delay(attempt);
            // cap 750ms, jitter at most 1.5x
            assert!(delay <= Duration::from_millis(1125), "attempt {attempt}: {delay:?}");
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let provider = ScriptedProvider::new("openai", vec![Ok("answer".to_string())]);
        let executor = executor_with(vec![provider.clone()]);
        let chain = vec![Candidate::new("openai", "gpt-4o")];
        let outcome = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap();
        assert_eq!(outcome.text, "answer");
        assert_eq!(outcome.attempts, 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn transient_errors_retry_on_the_same_candidate() {
        let provider = ScriptedProvider::new(
            "openai",
            vec![
                Err(ProviderError::api("openai", 503, "down")),
                Err(ProviderError::api("openai", 502, "still down")),
                Ok("recovered".to_string()),
            ],
        );
        let executor = executor_with(vec![provider.clone()]);
        let chain = vec![Candidate::new("openai", "gpt-4o")];
        let outcome = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap();
        assert_eq!(outcome.text, "recovered");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn auth_fails_over_after_exactly_one_call() {
        let bad = ScriptedProvider::new(
            "openai",
            vec![Err(ProviderError::authentication("openai", "bad key"))],
        );
        let good = ScriptedProvider::new("anthropic", vec![Ok("fallback answer".to_string())]);
        let executor = executor_with(vec![bad.clone(), good.clone()]);
        let chain = vec![
            Candidate::new("openai", "gpt-4o"),
            Candidate::new("anthropic", "claude-3-5-sonnet-20241022"),
        ];
        let outcome = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap();
        assert_eq!(outcome.text, "fallback answer");
        assert_eq!(bad.calls(), 1);
        assert_eq!(good.calls(), 1);
    }

    #[tokio::test]
    async fn model_unsupported_moves_to_model_fallback_immediately() {
        let provider = ScriptedProvider::new(
            "openai",
            vec![
                Err(ProviderError::model_not_available("openai", "gpt-4o", "not found")),
                Ok("from fallback model".to_string()),
            ],
        );
        let executor = executor_with(vec![provider.clone()]);
        let chain = vec![
            Candidate::new("openai", "gpt-4o"),
            Candidate::new("openai", "gpt-4o-mini"),
        ];
        let outcome = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap();
        assert_eq!(outcome.text, "from fallback model");
        assert_eq!(outcome.candidate.model, "gpt-4o-mini");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_errors_propagate_without_failover() {
        let first = ScriptedProvider::new(
            "openai",
            vec![Err(ProviderError::other("openai", "content refusal"))],
        );
        let second = ScriptedProvider::new("anthropic", vec![Ok("never reached".to_string())]);
        let executor = executor_with(vec![first.clone(), second.clone()]);
        let chain = vec![
            Candidate::new("openai", "gpt-4o"),
            Candidate::new("anthropic", "claude-3-5-sonnet-20241022"),
        ];
        let err = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_the_last_error() {
        let first = ScriptedProvider::new(
            "openai",
            vec![Err(ProviderError::authentication("openai", "bad key"))],
        );
        let second = ScriptedProvider::new(
            "anthropic",
            vec![Err(ProviderError::rate_limit("anthropic", "busy", None)); 4],
        );
        let executor = executor_with(vec![first, second.clone()]);
        let chain = vec![
            Candidate::new("openai", "gpt-4o"),
            Candidate::new("anthropic", "claude-3-5-sonnet-20241022"),
        ];
        let err = executor
            .execute(&chain, &GenerationCall::new("prompt"))
            .await
            .unwrap_err();
        // Last classified error wins, not the first
        assert_eq!(err.kind, ErrorKind::RateLimit);
        assert_eq!(second.calls(), 4);
    }

    #[tokio::test]
    async fn empty_chain_is_an_immediate_unknown() {
        let executor = executor_with(vec![]);
        let err = executor
            .execute(&[], &GenerationCall::new("prompt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    fn chain_config() -> Config {
        let mut config = Config::default();
        config.providers[0].api_key = "sk-a".to_string();
        config.providers[1].api_key = "sk-b".to_string();
        config
    }

    fn full_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(ScriptedProvider::new("openai", vec![]));
        registry.register(ScriptedProvider::new("anthropic", vec![]));
        registry
    }

    #[test]
    fn chain_interleaves_model_fallbacks_before_next_provider() {
        let config = chain_config();
        let registry = full_registry();
        let chain = build_chain(&config, &registry, &GenerationOptions::default());
        let flat: Vec<String> = chain.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            flat,
            vec![
                "openai/gpt-4o",
                "openai/gpt-4o-mini",
                "anthropic/claude-3-5-sonnet-20241022",
                "anthropic/claude-3-5-haiku-20241022",
            ]
        );
    }

    #[test]
    fn fast_prefers_the_cheaper_model() {
        let config = chain_config();
        let registry = full_registry();
        let options = GenerationOptions {
            fast: true,
            ..Default::default()
        };
        let chain = build_chain(&config, &registry, &options);
        assert_eq!(chain[0].model, "gpt-4o-mini");
        assert_eq!(chain[1].model, "gpt-4o");
    }

    #[test]
    fn provider_hint_goes_first_without_duplicates() {
        let config = chain_config();
        let registry = full_registry();
        let options = GenerationOptions {
            provider_hint: Some("anthropic".to_string()),
            ..Default::default()
        };
        let chain = build_chain(&config, &registry, &options);
        assert_eq!(chain[0].provider, "anthropic");
        assert_eq!(chain[0].model, "claude-3-5-sonnet-20241022");
        let count = chain
            .iter()
            .filter(|c| c.model == "claude-3-5-sonnet-20241022")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn unconfigured_providers_never_enter_the_chain() {
        let mut config = Config::default();
        config.providers[0].api_key = "sk-a".to_string();
        // anthropic carries no credential
        let registry = full_registry();
        let chain = build_chain(&config, &registry, &GenerationOptions::default());
        assert!(chain.iter().all(|c| c.provider == "openai"));
    }
}
