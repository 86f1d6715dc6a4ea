pub mod deepl;
pub mod gateway;
pub mod interface;
pub mod noop;
pub mod openai;
pub mod selection;

pub use gateway::TranslationGateway;
pub use interface::{TranslateBody, TranslationProvider, TranslationRequest, TranslationResult};
pub use selection::ProviderSelection;
