//! Article summarization endpoint

use super::{is_false, soft_fallback_applies, status_code, SOFT_FALLBACK_MESSAGE};
use crate::core::types::{GenerationOptions, TaskKind, Usage};
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_BULLETS: usize = 5;
const MAX_BULLETS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub text: String,
    /// Number of final bullet points, clamped to 1..=10
    pub bullets: Option<usize>,
    #[serde(default)]
    pub no_cache: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "is_false")]
    pub cached: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub soft_fallback: bool,
}

impl SummarizeResponse {
    fn failure(error: &'static str, detail: String) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error),
            detail: Some(detail),
            model: None,
            usage: None,
            chunks: None,
            cached: false,
            soft_fallback: false,
        }
    }
}

/// `POST /v1/assistant/summarize`
pub async fn summarize(
    state: web::Data<AppState>,
    body: web::Json<SummarizeRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    if request.text.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(SummarizeResponse::failure("VALIDATION", "text must not be empty".to_string()));
    }
    let bullets = request.bullets.unwrap_or(DEFAULT_BULLETS).clamp(1, MAX_BULLETS);

    let options = GenerationOptions {
        task: TaskKind::Summarize,
        bypass_cache: request.no_cache,
        allow_canned: false,
        ..Default::default()
    };

    match state.orchestrator.summarize(&request.text, bullets, options).await {
        Ok(outcome) => {
            info!(chunks = outcome.chunks, cached = outcome.cached, "summary produced");
            HttpResponse::Ok().json(SummarizeResponse {
                ok: true,
                result: Some(outcome.summary),
                error: None,
                detail: None,
                model: Some(outcome.model),
                usage: Some(outcome.usage),
                chunks: Some(outcome.chunks),
                cached: outcome.cached,
                soft_fallback: false,
            })
        }
        Err(error) => {
            if soft_fallback_applies(&state.config, &error) {
                return HttpResponse::Ok().json(SummarizeResponse {
                    ok: true,
                    result: Some(SOFT_FALLBACK_MESSAGE.to_string()),
                    error: None,
                    detail: None,
                    model: None,
                    usage: None,
                    chunks: None,
                    cached: false,
                    soft_fallback: true,
                });
            }
            HttpResponse::build(status_code(&error))
                .json(SummarizeResponse::failure(error.code(), error.message.clone()))
        }
    }
}
