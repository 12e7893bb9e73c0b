//! Error classification
//!
//! Maps a raw provider failure into the fixed taxonomy the executor acts
//! on. Statuses are checked before message patterns; anything the rules
//! do not recognize is `Unknown` and propagates immediately.

use crate::core::providers::ProviderError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static AUTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)invalid[ _-]?api[ _-]?key|unauthori[sz]ed|authentication|credential")
        .unwrap()
});
static RATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)rate.?limit|quota|too many requests").unwrap());
static MODEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(unknown|unsupported) model|model.{0,40}(not found|does not exist)").unwrap()
});
static TIMEOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)timed?.?out|deadline exceeded").unwrap());

/// The fixed failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    RateLimit,
    ModelUnsupported,
    Timeout,
    Transient,
    Unknown,
}

impl ErrorKind {
    /// Whether another attempt on the same candidate may help
    pub fn retryable(&self) -> bool {
        matches!(self, ErrorKind::RateLimit | ErrorKind::Timeout | ErrorKind::Transient)
    }

    /// Whether the next candidate in the chain should be tried
    pub fn failover_eligible(&self) -> bool {
        !matches!(self, ErrorKind::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::ModelUnsupported => "model_unsupported",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transient => "transient",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// A provider failure normalized for retry/failover decisions
#[derive(Debug, Clone)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub failover_eligible: bool,
    pub provider: String,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            retryable: kind.retryable(),
            failover_eligible: kind.failover_eligible(),
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Error code surfaced through the HTTP contract
    pub fn code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Auth => "AI_AUTH",
            ErrorKind::RateLimit => "AI_RATE_LIMIT",
            _ => "AI_ERROR",
        }
    }

    /// HTTP status for an exhausted chain ending in this error
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ErrorKind::Auth => 401,
            ErrorKind::RateLimit => 429,
            _ => 500,
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.provider, self.message)
    }
}

impl std::error::Error for ClassifiedError {}

/// Classify a raw provider error
///
/// Priority order: explicit variant, then HTTP status, then message
/// patterns, then `Unknown`.
pub fn classify(error: &ProviderError) -> ClassifiedError {
    let provider = error.provider().to_string();
    let message = error.to_string();
    let kind = match error {
        ProviderError::Authentication { .. } => ErrorKind::Auth,
        ProviderError::RateLimit { .. } => ErrorKind::RateLimit,
        ProviderError::ModelNotAvailable { .. } => ErrorKind::ModelUnsupported,
        ProviderError::Timeout { .. } => ErrorKind::Timeout,
        ProviderError::Network { .. } => ErrorKind::Transient,
        // A 200 with an unreadable body usually means a proxy hiccup
        ProviderError::MalformedResponse { .. } => ErrorKind::Transient,
        ProviderError::Api { status, .. } => kind_for_status(*status, &message),
        ProviderError::Other { .. } => kind_for_message(&message),
    };
    ClassifiedError::new(kind, provider, message)
}

fn kind_for_status(status: u16, message: &str) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Auth,
        429 => ErrorKind::RateLimit,
        400 | 404 => ErrorKind::ModelUnsupported,
        408 => ErrorKind::Timeout,
        500 | 502 | 503 | 504 => ErrorKind::Transient,
        _ => kind_for_message(message),
    }
}

fn kind_for_message(message: &str) -> ErrorKind {
    if AUTH_PATTERN.is_match(message) {
        ErrorKind::Auth
    } else if RATE_PATTERN.is_match(message) {
        ErrorKind::RateLimit
    } else if MODEL_PATTERN.is_match(message) {
        ErrorKind::ModelUnsupported
    } else if TIMEOUT_PATTERN.is_match(message) {
        ErrorKind::Timeout
    } else {
        ErrorKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_is_terminal_for_a_candidate_but_fails_over() {
        let classified = classify(&ProviderError::authentication("openai", "Incorrect API key"));
        assert_eq!(classified.kind, ErrorKind::Auth);
        assert!(!classified.retryable);
        assert!(classified.failover_eligible);
        assert_eq!(classified.code(), "AI_AUTH");
        assert_eq!(classified.http_status(), 401);
    }

    #[test]
    fn rate_limit_retries_then_fails_over() {
        let classified = classify(&ProviderError::rate_limit("openai", "slow down", Some(2)));
        assert_eq!(classified.kind, ErrorKind::RateLimit);
        assert!(classified.retryable);
        assert!(classified.failover_eligible);
        assert_eq!(classified.http_status(), 429);
    }

    #[test]
    fn model_unsupported_fails_over_without_retry() {
        let classified = classify(&ProviderError::model_not_available("openai", "gpt-9", "no such model"));
        assert_eq!(classified.kind, ErrorKind::ModelUnsupported);
        assert!(!classified.retryable);
        assert!(classified.failover_eligible);
    }

    #[test]
    fn statuses_take_priority() {
        for (status, kind) in [
            (401, ErrorKind::Auth),
            (403, ErrorKind::Auth),
            (429, ErrorKind::RateLimit),
            (400, ErrorKind::ModelUnsupported),
            (404, ErrorKind::ModelUnsupported),
            (408, ErrorKind::Timeout),
            (500, ErrorKind::Transient),
            (502, ErrorKind::Transient),
            (503, ErrorKind::Transient),
            (504, ErrorKind::Transient),
        ] {
            let classified = classify(&ProviderError::api("openai", status, "whatever"));
            assert_eq!(classified.kind, kind, "status {status}");
        }
    }

    #[test]
    fn message_patterns_back_up_unmapped_statuses() {
        let quota = classify(&ProviderError::api("openai", 418, "monthly quota exhausted"));
        assert_eq!(quota.kind, ErrorKind::RateLimit);

        let auth = classify(&ProviderError::other("openai", "invalid api key supplied"));
        assert_eq!(auth.kind, ErrorKind::Auth);

        let timeout = classify(&ProviderError::other("openai", "upstream timed out"));
        assert_eq!(timeout.kind, ErrorKind::Timeout);
    }

    #[test]
    fn unrecognized_errors_do_not_fail_over() {
        let classified = classify(&ProviderError::other("openai", "content policy refusal"));
        assert_eq!(classified.kind, ErrorKind::Unknown);
        assert!(!classified.retryable);
        assert!(!classified.failover_eligible);
        assert_eq!(classified.code(), "AI_ERROR");
        assert_eq!(classified.http_status(), 500);
    }
}
