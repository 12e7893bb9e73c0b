//! Structured extraction endpoint (5W1H, headline, SEO meta, translation)

use super::{is_false, soft_fallback_applies, status_code, SOFT_FALLBACK_MESSAGE};
use crate::core::assemble::Assembled;
use crate::core::types::{GenerationOptions, TaskKind, Usage};
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractTask {
    FiveWOneH,
    Headline,
    SeoMeta,
    Translate,
}

impl From<ExtractTask> for TaskKind {
    fn from(task: ExtractTask) -> Self {
        match task {
            ExtractTask::FiveWOneH => TaskKind::FiveWOneH,
            ExtractTask::Headline => TaskKind::Headline,
            ExtractTask::SeoMeta => TaskKind::SeoMeta,
            ExtractTask::Translate => TaskKind::Translate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub text: String,
    pub task: ExtractTask,
    pub title: Option<String>,
    pub target_lang: Option<String>,
    #[serde(default)]
    pub no_cache: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Degraded success: unparseable model output, returned verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "is_false")]
    pub cached: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub soft_fallback: bool,
}

impl ExtractResponse {
    fn empty_ok() -> Self {
        Self {
            ok: true,
            result: None,
            raw: None,
            note: None,
            error: None,
            detail: None,
            model: None,
            usage: None,
            cached: false,
            soft_fallback: false,
        }
    }

    fn failure(error: &'static str, detail: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
            detail: Some(detail),
            ..Self::empty_ok()
        }
    }
}

/// `POST /v1/assistant/extract`
pub async fn extract(state: web::Data<AppState>, body: web::Json<ExtractRequest>) -> HttpResponse {
    let request = body.into_inner();
    if request.text.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ExtractResponse::failure("VALIDATION", "text must not be empty".to_string()));
    }
    if matches!(request.task, ExtractTask::Translate) && request.target_lang.is_none() {
        return HttpResponse::BadRequest().json(ExtractResponse::failure(
            "VALIDATION",
            "targetLang is required for translate".to_string(),
        ));
    }

    let task: TaskKind = request.task.into();
    let options = GenerationOptions {
        task,
        target_lang: request.target_lang.clone(),
        bypass_cache: request.no_cache,
        allow_canned: false,
        ..Default::default()
    };

    match state
        .orchestrator
        .extract(&request.text, request.title.as_deref(), options)
        .await
    {
        Ok(outcome) => {
            info!(task = %task, cached = outcome.cached, "extraction produced");
            let mut response = ExtractResponse {
                model: Some(outcome.model),
                usage: Some(outcome.usage),
                cached: outcome.cached,
                ..ExtractResponse::empty_ok()
            };
            match outcome.result {
                Assembled::Structured(value) => response.result = Some(value),
                Assembled::Raw { text, note } => {
                    response.raw = Some(text);
                    response.note = Some(note);
                }
            }
            HttpResponse::Ok().json(response)
        }
        Err(error) => {
            if soft_fallback_applies(&state.config, &error) {
                return HttpResponse::Ok().json(ExtractResponse {
                    raw: Some(SOFT_FALLBACK_MESSAGE.to_string()),
                    soft_fallback: true,
                    ..ExtractResponse::empty_ok()
                });
            }
            HttpResponse::build(status_code(&error))
                .json(ExtractResponse::failure(error.code(), error.message.clone()))
        }
    }
}
