use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editing::controller::AddressingError;
use crate::editing::rewrite::RewriteError;
use crate::export::ExportError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Addressing error: {0}")]
    Addressing(#[from] AddressingError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Rewrite service is not configured")]
    RewriteUnavailable,

    #[error("Rewrite superseded: {0}")]
    RewriteSuperseded(String),

    #[error("Session capacity of {0} reached")]
    Capacity(usize),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotResume => AppError::Validation(e.to_string()),
            SessionError::Addressing(e) => AppError::Addressing(e),
            SessionError::ProposalNotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Capacity(n) => AppError::Capacity(n),
            SessionError::RewriteSuperseded => AppError::RewriteSuperseded(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Addressing(e) => {
                tracing::warn!("Addressing error: {e}");
                (StatusCode::CONFLICT, "ADDRESSING_ERROR", e.to_string())
            }
            AppError::Export(ExportError::MissingSurface(msg)) => {
                tracing::warn!("PDF export without a surface");
                (StatusCode::CONFLICT, "MISSING_SURFACE", msg.clone())
            }
            AppError::Export(e @ ExportError::Serialization(_)) => {
                tracing::error!("Export failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED", e.to_string())
            }
            AppError::Rewrite(e) => {
                tracing::error!("Rewrite error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "REWRITE_ERROR",
                    "The rewrite service could not produce a suggestion".to_string(),
                )
            }
            AppError::RewriteSuperseded(msg) => {
                tracing::warn!("Discarded rewrite: {msg}");
                (StatusCode::CONFLICT, "REWRITE_SUPERSEDED", msg.clone())
            }
            AppError::RewriteUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "REWRITE_UNAVAILABLE",
                "Bullet rewriting is not configured on this server".to_string(),
            ),
            AppError::Capacity(n) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CAPACITY",
                format!("Session limit of {n} reached. Close a document and try again."),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Addressing(AddressingError::ExperienceOutOfRange {
                    experience_index: 5,
                    len: 1,
                }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Export(ExportError::missing_surface()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Export(ExportError::Serialization("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::RewriteUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::from(SessionError::RewriteSuperseded),
                StatusCode::CONFLICT,
            ),
            (AppError::Capacity(1), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_session_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(SessionError::NotResume),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::ProposalNotFound(uuid::Uuid::nil())),
            AppError::NotFound(_)
        ));
    }
}
