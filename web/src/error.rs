//! Error types for web handlers.
//!
//! Bridges [`LinkedRoleError`] to HTTP responses. Clients only ever see a
//! status, a code and a generic message; the full error is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linked_roles_discord::LinkedRoleError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState<T, M>>) -> Result<StatusCode, AppError> {
///     state.linked_roles.update_metadata(&user_id).await?;
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// State mismatches are forbidden; everything else is an opaque 500.
impl From<LinkedRoleError> for AppError {
    fn from(err: LinkedRoleError) -> Self {
        if err.is_security_issue() {
            tracing::warn!(error = %err, "Rejected OAuth callback");
            return Self::forbidden("Request could not be verified");
        }

        Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linked_roles_discord::Operation;

    #[test]
    fn test_error_display() {
        let err = AppError::internal("An internal error occurred");
        assert_eq!(
            err.to_string(),
            "[INTERNAL_SERVER_ERROR] An internal error occurred"
        );
    }

    #[test]
    fn test_state_mismatch_is_forbidden() {
        let err = AppError::from(LinkedRoleError::StateMismatch);
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, "FORBIDDEN");
    }

    #[test]
    fn test_provider_error_is_opaque() {
        let err = AppError::from(LinkedRoleError::Provider {
            operation: Operation::Refresh,
            status: 401,
            status_text: "Unauthorized".to_string(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("401"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_linked_is_internal() {
        let err = AppError::from(LinkedRoleError::NotLinked {
            user_id: "42".to_string(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
