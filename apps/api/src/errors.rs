use std::time::Duration;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::mail::MailError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every body has the `{success: false, message}` shape the frontend toasts.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
                None,
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
                None,
            ),
            AppError::Mail(e) => {
                tracing::error!("Error sending email: {e}");
                if e.is_auth() {
                    tracing::error!("OAuth2 authentication error. Check your credentials.");
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.user_message().to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to improve summary. Please try again.".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message
        });
        if let Some(detail) = detail {
            body["error"] = json!(detail);
        }

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            // Round up so clients never retry inside the window
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}
