//! HTTP gateway forwarding translation requests to DeepL, an OpenAI-compatible
//! chat completion API, or a local placeholder when neither is configured.

pub mod error;
pub mod routes;
pub mod settings;
pub mod state;
pub mod translate;

pub use error::GatewayError;
pub use routes::create_router;
pub use settings::Settings;
pub use state::AppState;
