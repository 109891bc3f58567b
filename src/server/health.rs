//! Liveness endpoint

use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use super::api::json_response;
use crate::utils::epoch_millis;

pub const SERVICE_NAME: &str = "HoYoverse Games Coupon Scraper";

/// Body of `GET /craw/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// Milliseconds since the Unix epoch, as a string
    pub timestamp: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP",
            service: SERVICE_NAME,
            timestamp: epoch_millis().to_string(),
        }
    }
}

pub async fn health_check() -> Response {
    json_response(StatusCode::OK, &HealthResponse::up())
}
