use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Message returned for every internal fault
pub const INTERNAL_ERROR_MESSAGE: &str = "translate failed";

/// Every way a translation request can fail, as seen by the caller
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller sent an incomplete or unreadable request
    #[error("{0}")]
    Validation(String),

    /// The selected provider failed or answered with a non-success status
    #[error("{message}")]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// Anything else; the source is logged, never returned
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a failed outbound call.
    ///
    /// Errors building the request are ours; everything after that is the upstream's.
    pub fn from_transport(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Internal(err.into());
        }
        debug!("{} request failed: {}", provider, err);
        Self::Upstream {
            provider,
            status: None,
            message: format!("{provider} request failed"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(source) => error!("Internal error: {:#}", source),
            Self::Upstream {
                provider, status, ..
            } => warn!("Upstream {} failed (status {:?}): {}", provider, status, self),
            Self::Validation(message) => warn!("Rejected request: {}", message),
        }

        (self.status_code(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
