use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;

pub mod chat;
pub mod quiz;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let completion = &state.config.completion;

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "studymunch-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": {
                "completion_api": {
                    "configured": completion.api_key.is_some(),
                    "quiz_model": completion.quiz_model,
                    "chat_model": completion.chat_model,
                }
            }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects /metrics with HTTP Basic auth (`user:password` from config)
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if credentials != state.config.metrics_auth {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Fallback for routes that only accept POST.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Option<String>,
    },
    MethodNotAllowed,
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details,
        }
    }
}

fn error_body(message: String, details: Option<String>) -> serde_json::Value {
    match details {
        Some(details) => json!({ "error": message, "details": details }),
        None => json!({ "error": message }),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, error_body(message, details))
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                error_body("Method Not Allowed".to_string(), None),
            ),
            ApiError::Internal { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(message, details))
            }
        };
        (status, Json(body)).into_response()
    }
}
