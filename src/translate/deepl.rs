use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::interface::{TranslationProvider, TranslationRequest, TranslationResult};
use crate::error::GatewayError;

const PROVIDER: &str = "deepl";

#[derive(Debug, Default, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    #[serde(default)]
    text: String,
}

/// DeepL `/v2/translate` client
pub struct DeepLProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl DeepLProvider {
    pub fn new(client: Client, api_url: String, api_key: String) -> Self {
        info!("Initialized DeepLProvider: api_url={}", api_url);
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Form fields for the outbound request, language codes upper-cased.
    pub fn form_params(request: &TranslationRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("text", request.text.clone()),
            ("target_lang", request.target.to_uppercase()),
        ];
        if let Some(source) = &request.source {
            params.push(("source_lang", source.to_uppercase()));
        }
        params
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, GatewayError> {
        let params = Self::form_params(request);
        debug!("DeepL request: target_lang={}", params[1].1);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_transport(PROVIDER, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "deepl error".to_string());
            return Err(GatewayError::Upstream {
                provider: PROVIDER,
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed = serde_json::from_str::<DeepLResponse>(&body).unwrap_or_else(|e| {
            warn!("Unexpected DeepL response shape: {}", e);
            DeepLResponse::default()
        });
        let translated = parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .unwrap_or_default();

        Ok(TranslationResult::new(PROVIDER, translated))
    }
}
