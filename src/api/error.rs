// 🚨 API errors - domain failures mapped to HTTP status + JSON body
//
// { "success": false, "error": { "code": "VALIDATION_ERROR", "message": "...", "details": [...] } }

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::entities::RegistryError;
use crate::form::FieldError;
use crate::lookup::LookupError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Input failed validation (422). `details` lists the offending fields.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Conflict with an existing record (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The CNPJ registry failed (502).
    #[error("upstream registry error: {0}")]
    Upstream(String),

    /// The CNPJ registry did not answer in time (504).
    #[error("upstream registry timeout: {0}")]
    GatewayTimeout(String),

    /// Lookup client not usable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

impl AppError {
    /// Validation failure carrying a single field error
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        AppError::Validation {
            message: message.clone(),
            details: vec![FieldError {
                field: field.to_string(),
                message,
            }],
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let (message, details) = match self {
            AppError::Validation { message, details } => (message, details),
            AppError::NotFound(m)
            | AppError::BadRequest(m)
            | AppError::Conflict(m)
            | AppError::Upstream(m)
            | AppError::GatewayTimeout(m)
            | AppError::ServiceUnavailable(m) => (m, Vec::new()),
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(details: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: "Formulário inválido".to_string(),
            details,
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateCnpj(_) => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(_) => AppError::NotFound(err.to_string()),
            LookupError::Timeout(_) => AppError::GatewayTimeout(err.to_string()),
            LookupError::NotConfigured(_) => AppError::ServiceUnavailable(err.to_string()),
            LookupError::Upstream { .. } | LookupError::Http(_) | LookupError::Decode(_) => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}
