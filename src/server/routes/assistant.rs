//! Editorial assistant chat endpoint

use super::{is_false, soft_fallback_applies, status_code, SOFT_FALLBACK_MESSAGE};
use crate::core::classify::ClassifiedError;
use crate::core::types::GenerationOptions;
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub prompt: String,
    /// Prefer the cheaper model of each provider
    #[serde(default)]
    pub fast: bool,
    /// Skip cache lookup and write for this call
    #[serde(default)]
    pub no_cache: bool,
    /// Disable the canned-greeting fast path
    #[serde(default)]
    pub no_canned: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub success: bool,
    pub answer: Option<String>,
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub cached: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub canned: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub soft_fallback: bool,
}

impl AskResponse {
    fn failure(error: &'static str, details: String) -> Self {
        Self {
            success: false,
            answer: None,
            error: Some(error),
            details: Some(details),
            model: None,
            cached: false,
            canned: false,
            soft_fallback: false,
        }
    }
}

/// `POST /v1/assistant/ask`
pub async fn ask(state: web::Data<AppState>, body: web::Json<AskRequest>) -> HttpResponse {
    let request = body.into_inner();
    if request.prompt.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(AskResponse::failure("VALIDATION", "prompt must not be empty".to_string()));
    }
    info!(fast = request.fast, "assistant request");

    let options = GenerationOptions {
        fast: request.fast,
        bypass_cache: request.no_cache,
        allow_canned: !request.no_canned,
        ..Default::default()
    };

    match state.orchestrator.ask(&request.prompt, options).await {
        Ok(outcome) => HttpResponse::Ok().json(AskResponse {
            success: true,
            answer: Some(outcome.answer),
            error: None,
            details: None,
            model: outcome.model,
            cached: outcome.cached,
            canned: outcome.canned,
            soft_fallback: false,
        }),
        Err(error) => ask_failure(&state, error),
    }
}

fn ask_failure(state: &AppState, error: ClassifiedError) -> HttpResponse {
    if soft_fallback_applies(&state.config, &error) {
        info!(provider = %error.provider, "rate limit hidden behind soft fallback");
        return HttpResponse::Ok().json(AskResponse {
            success: true,
            answer: Some(SOFT_FALLBACK_MESSAGE.to_string()),
            error: None,
            details: None,
            model: None,
            cached: false,
            canned: false,
            soft_fallback: true,
        });
    }
    HttpResponse::build(status_code(&error))
        .json(AskResponse::failure(error.code(), error.message.clone()))
}
