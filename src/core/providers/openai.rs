//! OpenAI chat-completions provider client

use super::{GenerativeProvider, ProviderError, ProviderRequest, ProviderResponse};
use crate::config::ProviderSettings;
use crate::core::types::Usage;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER_ID: &str = "openai";

/// Client for the OpenAI chat-completions API
///
/// Also works against any OpenAI-compatible endpoint via `base_url`,
/// which the tests use to point at a local mock server.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        // No client-level timeout: the executor owns the per-attempt
        // timeout and dropping the call future aborts the request.
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<UsageBody>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsageBody {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<UsageBody> for Usage {
    fn from(body: UsageBody) -> Self {
        Usage {
            prompt_tokens: body.prompt_tokens,
            completion_tokens: body.completion_tokens,
            total_tokens: body.total_tokens,
        }
    }
}

/// Pull the upstream error message out of an error body, falling back to
/// a truncated raw body when it is not the usual `{"error":{"message"}}`.
pub(super) fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    let mut message: String = body.chars().take(200).collect();
    if message.is_empty() {
        message.push_str("(empty error body)");
    }
    message
}

pub(super) fn error_for_status(
    provider: &str,
    model: &str,
    status: u16,
    body: &str,
    retry_after: Option<u64>,
) -> ProviderError {
    let message = extract_error_message(body);
    match status {
        401 | 403 => ProviderError::authentication(provider, message),
        429 => ProviderError::rate_limit(provider, message, retry_after),
        404 => ProviderError::model_not_available(provider, model, message),
        _ => ProviderError::api(provider, status, message),
    }
}

pub(super) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, 0)
    } else {
        ProviderError::network(provider, err.to_string())
    }
}

pub(super) fn retry_after_seconds(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[async_trait]
impl GenerativeProvider for OpenAiProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(
        &self,
        request: &ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_seconds(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(
                PROVIDER_ID,
                &request.model,
                status.as_u16(),
                &text,
                retry_after,
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER_ID, e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::malformed(PROVIDER_ID, "response carried no choices"))?;

        Ok(ProviderResponse {
            text,
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
            usage: parsed.usage.map(Usage::from).unwrap_or_default(),
        })
    }
}
