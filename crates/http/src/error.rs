//! Error handling for the Libris HTTP layer

use std::any::Any;

use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const INTERNAL_MESSAGE: &str = "Internal server error";
const HIDDEN_DETAIL: &str = "Something went wrong";
const TIMEOUT_MESSAGE: &str = "Request timed out";

static EXPOSE_DETAILS: OnceCell<bool> = OnceCell::new();

/// Decide once per process whether internal error details reach clients.
///
/// Unconfigured processes (tests, tooling) expose details.
pub fn configure(expose_details: bool) {
    if EXPOSE_DETAILS.set(expose_details).is_err() {
        tracing::debug!("error detail exposure already configured");
    }
}

fn exposes_details() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(true)
}

/// Failure envelope returned for every error status.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("validation error: {}", .errors.join("; "))]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    #[error("{message}: {source:#}")]
    Internal {
        message: String,
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a field validation error carrying one message per violated constraint
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation error".to_string(),
            errors,
        }
    }

    /// Create an internal error with an operator-facing summary
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// The request outlived the configured deadline
    pub fn timeout(elapsed_ms: u64) -> Self {
        Self::Timeout { elapsed_ms }
    }

    /// Unmatched route
    pub fn route_not_found() -> Self {
        Self::not_found("Route not found")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "bad_request",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound { .. } => "not_found",
            AppError::Timeout { .. } => "timeout",
            AppError::Validation { .. } => "validation_error",
            AppError::Internal { .. } => "internal_error",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self::internal(INTERNAL_MESSAGE, source)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::bad_request(format!("Invalid form body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl AppError {
    /// Client-facing envelope. `expose_details` decides whether an internal
    /// error carries its source chain or only a generic hint.
    pub fn into_body(self, expose_details: bool) -> ErrorBody {
        match self {
            AppError::Internal { message, source } => ErrorBody {
                success: false,
                message,
                errors: None,
                error: Some(if expose_details {
                    format!("{source:#}")
                } else {
                    HIDDEN_DETAIL.to_string()
                }),
            },
            AppError::Validation { message, errors } => ErrorBody {
                success: false,
                message,
                errors: Some(errors),
                error: None,
            },
            AppError::Timeout { .. } => ErrorBody {
                success: false,
                message: TIMEOUT_MESSAGE.to_string(),
                errors: None,
                error: None,
            },
            AppError::BadRequest { message }
            | AppError::Conflict { message }
            | AppError::NotFound { message } => ErrorBody {
                success: false,
                message,
                errors: None,
                error: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();
        let error_code = self.code();

        match &self {
            AppError::Internal { message, source } => tracing::error!(
                error_id = %error_id,
                error_code,
                status_code = status.as_u16(),
                error = ?source,
                "{message}"
            ),
            AppError::Validation { errors, .. } => tracing::warn!(
                error_id = %error_id,
                error_code,
                status_code = status.as_u16(),
                violations = errors.len(),
                "request rejected"
            ),
            AppError::Timeout { elapsed_ms } => tracing::warn!(
                error_id = %error_id,
                error_code,
                status_code = status.as_u16(),
                elapsed_ms,
                "request timed out"
            ),
            _ => tracing::warn!(
                error_id = %error_id,
                error_code,
                status_code = status.as_u16(),
                "request rejected"
            ),
        }

        (status, Json(self.into_body(exposes_details()))).into_response()
    }
}

/// Last-resort conversion for panics caught by the `CatchPanic` layer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(INTERNAL_MESSAGE, anyhow::anyhow!(detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let errors = vec!["Title cannot be more than 200 characters".to_string()];
        let error = AppError::validation(errors.clone());

        match error {
            AppError::Validation {
                errors: e,
                message,
            } => {
                assert_eq!(e, errors);
                assert_eq!(message, "Validation error");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::timeout(30_000).status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            AppError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found("Book not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            body_of(response).await,
            ErrorBody {
                success: false,
                message: "Book not found".to_string(),
                errors: None,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_messages() {
        let response = AppError::validation(vec![
            "Published year must be at least 1000".to_string(),
            "Author name cannot be more than 100 characters".to_string(),
        ])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.message, "Validation error");
        assert_eq!(body.errors.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_internal_error_carries_operator_message() {
        let error = AppError::internal(
            "Failed to fetch books",
            anyhow::anyhow!("Database connection failed"),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.message, "Failed to fetch books");
        assert!(body.error.is_some());
    }

    #[tokio::test]
    async fn test_panic_payload_becomes_internal_error() {
        let response = panic_response(Box::new("handler exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.message, "Internal server error");
    }

    #[test]
    fn hidden_details_replace_the_source_chain() {
        let error = AppError::internal(
            "Failed to fetch books",
            anyhow::anyhow!("connection refused").context("server selection failed"),
        );

        assert_eq!(
            error.into_body(false),
            ErrorBody {
                success: false,
                message: "Failed to fetch books".to_string(),
                errors: None,
                error: Some("Something went wrong".to_string()),
            }
        );
    }

    #[test]
    fn exposed_details_carry_the_source_chain() {
        let error = AppError::internal(
            "Failed to fetch books",
            anyhow::anyhow!("connection refused").context("server selection failed"),
        );

        assert_eq!(
            error.into_body(true).error.as_deref(),
            Some("server selection failed: connection refused")
        );
    }

    #[test]
    fn client_errors_ignore_detail_exposure() {
        let body = AppError::conflict("A book with this title and author already exists")
            .into_body(false);
        assert_eq!(body.error, None);
        assert_eq!(body.message, "A book with this title and author already exists");
    }

    #[tokio::test]
    async fn test_timeout_envelope() {
        let response = AppError::timeout(20).into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_of(response).await,
            ErrorBody {
                success: false,
                message: "Request timed out".to_string(),
                errors: None,
                error: None,
            }
        );
    }
}
