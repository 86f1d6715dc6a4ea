use tracing::warn;

use crate::settings::TranslationSettings;

/// Which path serves translations for this process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    DeepL { api_key: String },
    LlmChat { api_key: String, model: String },
    None,
}

impl ProviderSelection {
    /// Resolve the active provider from settings.
    ///
    /// Checks run in a fixed order: DeepL, then LLM chat, then the fallback.
    /// A provider named without its credential falls through to the next check.
    pub fn resolve(settings: &TranslationSettings) -> Self {
        let requested = settings
            .provider
            .as_deref()
            .map(|p| p.trim().to_ascii_lowercase());

        if requested.as_deref() == Some("deepl") {
            if let Some(api_key) = settings.deepl.api_key.clone() {
                return Self::DeepL { api_key };
            }
            // TODO: confirm with product whether a missing key should fail start-up instead
            warn!("Provider 'deepl' requested but no DeepL API key is set; using fallback");
        }

        if requested.as_deref() == Some("openai") {
            if let Some(api_key) = settings.openai.api_key.clone() {
                return Self::LlmChat {
                    api_key,
                    model: settings.openai.model.clone(),
                };
            }
            warn!("Provider 'openai' requested but no OpenAI API key is set; using fallback");
        }

        if let Some(other) = requested.as_deref() {
            if other != "deepl" && other != "openai" {
                warn!("Unknown translation provider '{}'; using fallback", other);
            }
        }

        Self::None
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::DeepL { .. } => "deepl",
            Self::LlmChat { .. } => "openai",
            Self::None => "noop",
        }
    }
}
