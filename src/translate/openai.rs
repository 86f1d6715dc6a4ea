use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::interface::{TranslationProvider, TranslationRequest, TranslationResult};
use crate::error::GatewayError;

const PROVIDER: &str = "openai";

pub const SYSTEM_PROMPT: &str = "You are a high-quality translation engine.";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client used as a translator
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAIProvider {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        info!(
            "Initialized OpenAIProvider: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            base_url,
            api_key,
            model,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// User instruction sent alongside [`SYSTEM_PROMPT`].
pub fn build_prompt(request: &TranslationRequest) -> String {
    let from = request
        .source
        .as_deref()
        .map(|source| format!(" from {source}"))
        .unwrap_or_default();
    format!(
        "Translate the following text into {}{}. Only return the translation:\n\n{}",
        request.target, from, request.text
    )
}

#[async_trait]
impl TranslationProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, GatewayError> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(PROVIDER, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::from_transport(PROVIDER, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "openai error".to_string());
            return Err(GatewayError::Upstream {
                provider: PROVIDER,
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed = serde_json::from_str::<ChatResponse>(&text).unwrap_or_else(|e| {
            warn!("Unexpected chat completion response shape: {}", e);
            ChatResponse::default()
        });
        let translated = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        Ok(TranslationResult::new(PROVIDER, translated))
    }
}
