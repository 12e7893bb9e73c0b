//! HTTP route handlers
//!
//! Thin layer between the wire contract and the orchestrator: request
//! validation, response shaping and the status mapping for exhausted
//! chains (including the soft-fallback policy for rate limits).

pub mod assistant;
pub mod extract;
pub mod health;
pub mod summarize;

use crate::config::Config;
use crate::core::classify::{ClassifiedError, ErrorKind};
use actix_web::http::StatusCode;
use actix_web::web;

/// User-facing message when a rate limit is converted into a degraded 200
pub(crate) const SOFT_FALLBACK_MESSAGE: &str =
    "The assistant is handling a lot of requests right now. Please try again in a moment.";

/// Whether this failure should be hidden behind a polite degraded success
pub(crate) fn soft_fallback_applies(config: &Config, error: &ClassifiedError) -> bool {
    config.soft_fallback && error.kind == ErrorKind::RateLimit
}

/// HTTP status for an exhausted chain: Auth 401, RateLimit 429, else 500
pub(crate) fn status_code(error: &ClassifiedError) -> StatusCode {
    StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// serde helper so `false` flags stay off the wire
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Register all gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/assistant")
            .route("/ask", web::post().to(assistant::ask))
            .route("/summarize", web::post().to(summarize::summarize))
            .route("/extract", web::post().to(extract::extract)),
    )
    .route("/health", web::get().to(health::health));
}
