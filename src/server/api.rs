//! Route handlers for the coupon API
//!
//! Each adapter runs in its own task so that a panic while parsing a page
//! is reported as a 500 envelope instead of tearing down the connection.

use std::any::Any;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::error;

use super::health::health_check;
use super::AppState;
use crate::sources::SourceKind;

/// Content type of every response body
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Body returned when an adapter fails
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: SourceKind, message: impl Into<String>) -> Self {
        Self {
            error: kind.failure_message(),
            message: message.into(),
        }
    }
}

/// Serialise `body` with the UTF-8 JSON content type
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            error!(error = %e, "Failed to serialise response body");
            let fallback = serde_json::json!({
                "error": "Serialization failed",
                "message": e.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, fallback.to_string().into_bytes())
        }
    };

    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
        bytes,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let craw = Router::new()
        .route("/genshin", get(genshin))
        .route("/honkai-star-rail", get(honkai_star_rail))
        .route("/blox-fruits", get(blox_fruits))
        .route("/play-together", get(play_together))
        .route("/fc-mobile", get(fc_mobile))
        .route("/health", get(health_check));

    Router::new().nest("/craw", craw).with_state(state)
}

async fn genshin(State(state): State<AppState>) -> Response {
    coupons_response(state, SourceKind::Genshin).await
}

async fn honkai_star_rail(State(state): State<AppState>) -> Response {
    coupons_response(state, SourceKind::HonkaiStarRail).await
}

async fn blox_fruits(State(state): State<AppState>) -> Response {
    coupons_response(state, SourceKind::BloxFruits).await
}

async fn play_together(State(state): State<AppState>) -> Response {
    coupons_response(state, SourceKind::PlayTogether).await
}

async fn fc_mobile(State(state): State<AppState>) -> Response {
    coupons_response(state, SourceKind::FcMobile).await
}

/// Run one adapter and turn its outcome into a response
async fn coupons_response(state: AppState, kind: SourceKind) -> Response {
    let Some(source) = state.registry.get(kind) else {
        error!(source = %kind, "No adapter registered");
        return failure(kind, "source is not configured");
    };

    let task = tokio::spawn(async move { source.active_coupons().await });

    match task.await {
        Ok(Ok(records)) => json_response(StatusCode::OK, &records),
        Ok(Err(e)) => {
            error!(source = %kind, error = %e, "Adapter failed");
            failure(kind, e.to_string())
        }
        Err(join_error) => {
            let reason = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            error!(source = %kind, reason = %reason, "Adapter task aborted");
            failure(kind, reason)
        }
    }
}

fn failure(kind: SourceKind, message: impl Into<String>) -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorResponse::new(kind, message),
    )
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "adapter panicked".to_string()
    }
}
