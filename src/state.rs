use std::sync::Arc;

use crate::settings::Settings;
use crate::translate::TranslationGateway;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub gateway: TranslationGateway,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let gateway = TranslationGateway::new(&settings.translation)?;
        Ok(Self::with_gateway(settings, gateway))
    }

    pub fn with_gateway(settings: Settings, gateway: TranslationGateway) -> Self {
        Self {
            settings: Arc::new(settings),
            gateway,
        }
    }
}
