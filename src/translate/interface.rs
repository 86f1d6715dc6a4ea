use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Inbound JSON body as sent by the client form
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A validated translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub target: String,
    pub source: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: target.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check required fields; `text` is kept verbatim, language codes are trimmed.
    pub fn from_body(body: TranslateBody) -> Result<Self, GatewayError> {
        let text = body.text.filter(|t| !t.trim().is_empty());
        let target = body
            .target
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let (Some(text), Some(target)) = (text, target) else {
            return Err(GatewayError::validation("text & target required"));
        };

        let source = body
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            text,
            target,
            source,
        })
    }
}

/// Uniform result shape, whichever path produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub provider: String,
    pub translated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TranslationResult {
    pub fn new(provider: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            translated: translated.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A backend able to translate one request with at most one outbound call
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Tag reported in `TranslationResult::provider`
    fn name(&self) -> &'static str;

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, GatewayError>;
}
