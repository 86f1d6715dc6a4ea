use async_trait::async_trait;

use super::interface::{TranslationProvider, TranslationRequest, TranslationResult};
use crate::error::GatewayError;

pub const NOOP_NOTE: &str = "no provider configured";

/// Placeholder used when no provider is usable; never touches the network
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProvider;

/// `[TARGET] UPPERCASED TEXT`, so fallback output is never mistaken for a real translation.
pub fn placeholder_translation(request: &TranslationRequest) -> String {
    format!("[{}] {}", request.target, request.text.to_uppercase())
}

#[async_trait]
impl TranslationProvider for NoopProvider {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, GatewayError> {
        Ok(TranslationResult::new(self.name(), placeholder_translation(request)).with_note(NOOP_NOTE))
    }
}
