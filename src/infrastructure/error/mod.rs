use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::mail::MailError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

/// Hide internal details from clients in production
fn redact(log_message: &str, public: &str) -> String {
    if is_production() {
        public.to_string()
    } else {
        log_message.to_string()
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Template(e) => template_parts(e),
            AppError::Cache(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CACHE_ERROR",
                redact(&e.to_string(), "Template cache unavailable"),
            ),
            AppError::Mail(MailError::Template(e)) => template_parts(e),
            AppError::Mail(e @ MailError::InvalidRecipient(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Mail(e @ MailError::Delivery(_)) => (
                StatusCode::BAD_GATEWAY,
                "DELIVERY_FAILED",
                redact(&e.to_string(), "Mail delivery failed"),
            ),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

fn template_parts(e: &TemplateError) -> (StatusCode, &'static str, String) {
    match e {
        TemplateError::NotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND", e.to_string()),
        TemplateError::ApiFailure { .. } => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            redact(&e.to_string(), "Failed to fetch template"),
        ),
        TemplateError::InvalidId(_) | TemplateError::InvalidVariable(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
        }
        TemplateError::Client(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            redact(&e.to_string(), "Internal server error"),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message) = self.parts();

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %self,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
