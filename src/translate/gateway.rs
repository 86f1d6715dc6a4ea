use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{debug, info};

use super::deepl::DeepLProvider;
use super::interface::{TranslateBody, TranslationProvider, TranslationRequest, TranslationResult};
use super::noop::NoopProvider;
use super::openai::OpenAIProvider;
use super::selection::ProviderSelection;
use crate::error::GatewayError;
use crate::settings::TranslationSettings;

/// Single entry point turning a request body into a translation or an error
#[derive(Clone)]
pub struct TranslationGateway {
    provider: Arc<dyn TranslationProvider>,
}

impl TranslationGateway {
    /// Build the gateway for the provider the settings select.
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        let selection = ProviderSelection::resolve(settings);
        info!("Initializing translation provider: {}", selection.tag());

        let provider: Arc<dyn TranslationProvider> = match selection {
            ProviderSelection::DeepL { api_key } => Arc::new(DeepLProvider::new(
                build_client(settings.timeout_secs)?,
                settings.deepl.api_url.clone(),
                api_key,
            )),
            ProviderSelection::LlmChat { api_key, model } => Arc::new(OpenAIProvider::new(
                build_client(settings.timeout_secs)?,
                settings.openai.base_url.clone(),
                api_key,
                model,
                settings.openai.temperature,
            )),
            ProviderSelection::None => Arc::new(NoopProvider),
        };

        Ok(Self { provider })
    }

    /// Use an arbitrary provider, bypassing settings.
    pub fn with_provider(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Validate, then make at most one upstream call.
    pub async fn translate(&self, body: TranslateBody) -> Result<TranslationResult, GatewayError> {
        let request = TranslationRequest::from_body(body)?;
        debug!(
            "Translating {} chars into {} via {}",
            request.text.chars().count(),
            request.target,
            self.provider.name()
        );
        self.provider.translate(&request).await
    }
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    let mut builder = Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    Ok(builder.build()?)
}
