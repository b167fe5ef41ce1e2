//! Linked-role state types.
//!
//! [`TokenRecord`] is the only persisted state: one per authorized Discord
//! user, replaced wholesale whenever the access token is refreshed.

use crate::error::{LinkedRoleError, Operation, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Discord user id (snowflake, kept as its string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wrap a Discord user id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Token Types
// ═══════════════════════════════════════════════════════════════════════

/// Raw token endpoint payload, for both grant types.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Bearer credential.
    pub access_token: String,

    /// Credential used to mint the next access token.
    pub refresh_token: String,

    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,

    /// Token type (always "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,

    /// Granted scopes (space-delimited).
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Stored Discord credential for one user.
///
/// `expires_at` is only ever derived from a [`TokenGrant`] and the clock at
/// the moment the grant was received.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Bearer credential, short-lived.
    pub access_token: String,

    /// Long-lived credential used to mint new access tokens.
    pub refresh_token: String,

    /// Instant after which `access_token` must not be used.
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Build a record from a token grant received at `received_at`.
    ///
    /// `operation` names the call that produced the grant and tags the error
    /// when `expires_in` cannot be represented as an instant.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::InvalidResponse`] if `expires_in` pushes the
    /// expiry past the representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use linked_roles_discord::error::Operation;
    /// use linked_roles_discord::state::{TokenGrant, TokenRecord};
    ///
    /// let t0 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    /// let grant = TokenGrant {
    ///     access_token: "AT1".to_string(),
    ///     refresh_token: "RT1".to_string(),
    ///     expires_in: 600,
    ///     token_type: None,
    ///     scope: None,
    /// };
    /// let record = TokenRecord::from_grant(grant, t0, Operation::TokenExchange).unwrap();
    /// assert_eq!(record.expires_at, t0 + Duration::milliseconds(600_000));
    /// ```
    pub fn from_grant(
        grant: TokenGrant,
        received_at: DateTime<Utc>,
        operation: Operation,
    ) -> Result<Self> {
        let expires_at = Duration::try_seconds(grant.expires_in)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| LinkedRoleError::InvalidResponse {
                operation,
                message: format!("expires_in out of range: {}", grant.expires_in),
            })?;

        Ok(Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
        })
    }

    /// Whether the access token is past its expiry at `now`.
    ///
    /// A token is still usable at exactly `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Authorization Types
// ═══════════════════════════════════════════════════════════════════════

/// Consent redirect and the correlation token that must come back with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Discord consent page URL.
    pub url: String,

    /// Random correlation token, sent as the OAuth `state` parameter.
    pub state: String,
}

/// Response of `GET /oauth2/@me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationInfo {
    /// Scopes the user authorized.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token expires (ISO 8601).
    #[serde(default)]
    pub expires: Option<String>,

    /// The authorizing user (present when `identify` was granted).
    #[serde(default)]
    pub user: Option<DiscordUser>,
}

/// Discord user object, trimmed to the fields this service reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordUser {
    /// Snowflake id.
    pub id: String,

    /// Unique username.
    pub username: String,

    /// Display name, if set.
    #[serde(default)]
    pub global_name: Option<String>,

    /// Avatar hash, if set.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordUser {
    /// Id of this user as a [`UserId`].
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id.clone())
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn record(expires_at: DateTime<Utc>) -> TokenRecord {
        TokenRecord {
            access_token: "AT1".to_string(),
            refresh_token: "RT1".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let rec = record(t0());
        assert!(!rec.is_expired(t0() - Duration::milliseconds(1)));
        assert!(!rec.is_expired(t0()));
        assert!(rec.is_expired(t0() + Duration::milliseconds(1)));
    }

    fn grant(expires_in: i64) -> TokenGrant {
        TokenGrant {
            access_token: "AT1".to_string(),
            refresh_token: "RT1".to_string(),
            expires_in,
            token_type: None,
            scope: None,
        }
    }

    #[test]
    fn test_from_grant_rejects_unrepresentable_lifetime() {
        for expires_in in [i64::MAX, i64::MAX / 1000, i64::MIN] {
            let err = TokenRecord::from_grant(grant(expires_in), t0(), Operation::Refresh)
                .unwrap_err();
            assert!(matches!(
                err,
                LinkedRoleError::InvalidResponse {
                    operation: Operation::Refresh,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_from_grant_accepts_zero_lifetime() {
        let record = TokenRecord::from_grant(grant(0), t0(), Operation::TokenExchange).unwrap();
        assert_eq!(record.expires_at, t0());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", record(t0()));
        assert!(!rendered.contains("AT1"));
        assert!(!rendered.contains("RT1"));
        assert!(rendered.contains("expires_at"));
    }

    #[test]
    fn test_token_grant_parses_discord_payload() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"access_token":"AT1","token_type":"Bearer","expires_in":604800,"refresh_token":"RT1","scope":"identify role_connections.write"}"#,
        )
        .unwrap();
        assert_eq!(grant.access_token, "AT1");
        assert_eq!(grant.refresh_token, "RT1");
        assert_eq!(grant.expires_in, 604_800);
    }

    #[test]
    fn test_authorization_info_without_user() {
        let info: AuthorizationInfo =
            serde_json::from_str(r#"{"scopes":["role_connections.write"]}"#).unwrap();
        assert!(info.user.is_none());
        assert_eq!(info.scopes, vec!["role_connections.write"]);
    }

    #[test]
    fn test_display_name_prefers_global_name() {
        let mut user = DiscordUser {
            id: "80351110224678912".to_string(),
            username: "nelly".to_string(),
            global_name: Some("Nelly".to_string()),
            avatar: None,
        };
        assert_eq!(user.display_name(), "Nelly");
        user.global_name = None;
        assert_eq!(user.display_name(), "nelly");
        assert_eq!(user.user_id(), UserId::from("80351110224678912"));
    }
}
