use std::any::Any;
use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info_span, warn};
use uuid::Uuid;

use crate::error::{GatewayError, INTERNAL_ERROR_MESSAGE};
use crate::state::AppState;
use crate::translate::{TranslateBody, TranslationResult};

pub const TRANSLATE_PATH: &str = "/api/translate";

/// Full application router, layers included.
pub fn create_router(state: AppState) -> Router {
    let static_dir = PathBuf::from(&state.settings.server.static_dir);

    Router::new()
        .route(
            TRANSLATE_PATH,
            get(liveness).post(translate).fallback(method_not_allowed),
        )
        .route("/api/health", get(health_check))
        .route_service("/translate", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        info_span!(
                            "http",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %Uuid::new_v4(),
                        )
                    }),
                )
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn liveness() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.gateway.provider_name(),
    }))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method not allowed" })),
    )
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TranslationResult>, GatewayError> {
    let body = parse_body(payload)?;
    let result = state.gateway.translate(body).await?;
    Ok(Json(result))
}

/// Only a JSON object is a valid body; serde would otherwise read `["hi","fr"]` positionally.
fn parse_body(payload: Result<Json<Value>, JsonRejection>) -> Result<TranslateBody, GatewayError> {
    let Json(value) = payload.map_err(|rejection| {
        warn!("Unreadable translate body: {}", rejection.body_text());
        GatewayError::validation("invalid JSON body")
    })?;

    if !value.is_object() {
        return Err(GatewayError::validation("invalid JSON body"));
    }

    serde_json::from_value(value).map_err(|e| {
        warn!("Translate body has wrong field types: {}", e);
        GatewayError::validation("invalid JSON body")
    })
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        json!({ "error": INTERNAL_ERROR_MESSAGE }).to_string(),
    )
        .into_response()
}
