//! API response structures

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::{EditError, RuntimeError, StoreError},
    runtime::progress::format_minutes,
    state::TimerConfig,
};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub host: String,
    pub port: u16,
    /// Config id of the active timer, if any
    pub active_timer: Option<String>,
}

impl HealthResponse {
    pub fn ok(uptime: String, host: String, port: u16, active_timer: Option<String>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
            host,
            port,
            active_timer,
        }
    }
}

/// Listing entry for a saved timer, without the encoded media
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSummary {
    pub id: String,
    pub name: String,
    pub duration: f64,
    pub duration_label: String,
    pub intervals: Vec<f64>,
    pub has_video: bool,
}

impl From<&TimerConfig> for TimerSummary {
    fn from(config: &TimerConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            duration: config.duration,
            duration_label: format_minutes(config.duration),
            intervals: config.notifications.intervals.clone(),
            has_video: config.has_video(),
        }
    }
}

/// Body of `POST /timers/:id/intervals`
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalRequest {
    pub minutes: f64,
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!("Storage failure: {}", e);
        Self::internal(format!("storage failure: {}", e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<EditError> for ApiError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::Invalid(e) => Self::unprocessable(e.to_string()),
            EditError::Store(e) => e.into(),
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::NoActiveTimer => Self::not_found(e.to_string()),
            RuntimeError::Timer(ref inner) => {
                error!("Timer runtime failure: {}", inner);
                Self::internal(e.to_string())
            }
        }
    }
}
