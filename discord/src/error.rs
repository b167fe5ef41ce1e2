//! Error types for the linked-role flow.

use std::fmt;
use thiserror::Error;

/// Result type alias for linked-role operations.
pub type Result<T> = std::result::Result<T, LinkedRoleError>;

/// Discord API call that produced an error.
///
/// The string form is stable and appears in logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Authorization-code grant at the token endpoint.
    TokenExchange,
    /// Refresh-token grant at the token endpoint.
    Refresh,
    /// Current authorization lookup (`/oauth2/@me`).
    Identity,
    /// Role-connection `PUT`.
    MetadataPush,
    /// Role-connection `GET`.
    MetadataFetch,
    /// Application role-connection metadata schema `PUT`.
    SchemaRegistration,
}

impl Operation {
    /// Stable name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenExchange => "token-exchange",
            Self::Refresh => "refresh",
            Self::Identity => "identity",
            Self::MetadataPush => "metadata-push",
            Self::MetadataFetch => "metadata-fetch",
            Self::SchemaRegistration => "schema-registration",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while linking a Discord account or syncing its metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkedRoleError {
    // ═══════════════════════════════════════════════════════════
    // Provider Errors
    // ═══════════════════════════════════════════════════════════

    /// Discord answered with a non-success status.
    ///
    /// `status` is `0` when no response was received (connect failure or timeout).
    #[error("Discord {operation} request failed: [{status}] {status_text}")]
    Provider {
        /// Call that failed
        operation: Operation,
        /// HTTP status code, `0` for transport failures
        status: u16,
        /// Reason phrase or transport error description
        status_text: String,
    },

    /// Discord answered with a body we could not interpret.
    #[error("Invalid {operation} response: {message}")]
    InvalidResponse {
        /// Call whose response was malformed
        operation: Operation,
        /// Decoder message
        message: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Flow Errors
    // ═══════════════════════════════════════════════════════════

    /// The OAuth `state` presented on callback does not match the issued one.
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// No token record exists for this user.
    #[error("No Discord tokens stored for user {user_id}")]
    NotLinked {
        /// Discord user id
        user_id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Token store or profile source failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encoding or decoding of a stored value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LinkedRoleError {
    /// Build a provider error from a non-success HTTP status.
    #[must_use]
    pub fn provider(operation: Operation, status: reqwest::StatusCode) -> Self {
        Self::Provider {
            operation,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Build a provider error for a request that never produced a response.
    #[must_use]
    pub fn transport(operation: Operation, error: &reqwest::Error) -> Self {
        let status_text = if error.is_timeout() {
            "request timed out".to_string()
        } else {
            error.to_string()
        };

        Self::Provider {
            operation,
            status: 0,
            status_text,
        }
    }

    /// HTTP status of a provider error, if this is one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_roles_discord::{LinkedRoleError, Operation};
    /// let err = LinkedRoleError::Provider {
    ///     operation: Operation::TokenExchange,
    ///     status: 400,
    ///     status_text: "Bad Request".to_string(),
    /// };
    /// assert_eq!(err.provider_status(), Some(400));
    /// assert_eq!(LinkedRoleError::StateMismatch.provider_status(), None);
    /// ```
    #[must_use]
    pub const fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error indicates a forged or replayed callback.
    #[must_use]
    pub const fn is_security_issue(&self) -> bool {
        matches!(self, Self::StateMismatch)
    }
}
