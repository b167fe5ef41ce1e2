//! Account linking service.
//!
//! Ties the OAuth client, the token store, the metadata source and the
//! pusher together into the two flows the front door exposes: completing an
//! authorization and re-syncing a linked user's metadata.

use crate::error::{LinkedRoleError, Operation, Result};
use crate::oauth::OAuthClient;
use crate::providers::{MetadataSource, TokenStore};
use crate::pusher::MetadataPusher;
use crate::state::{AuthorizationRequest, DiscordUser, TokenRecord, UserId};
use std::sync::Arc;

/// Linked-role service for one Discord application.
///
/// # Type Parameters
///
/// - `T`: Token store
/// - `M`: Metadata source
#[derive(Debug)]
pub struct LinkedRoles<T, M> {
    oauth: Arc<OAuthClient>,
    pusher: MetadataPusher,
    tokens: T,
    metadata: M,
}

impl<T: TokenStore, M: MetadataSource> LinkedRoles<T, M> {
    /// Wire the service.
    #[must_use]
    pub fn new(oauth: Arc<OAuthClient>, tokens: T, metadata: M) -> Self {
        Self {
            pusher: MetadataPusher::new(Arc::clone(&oauth)),
            oauth,
            tokens,
            metadata,
        }
    }

    /// OAuth client shared with the pusher.
    #[must_use]
    pub const fn oauth(&self) -> &Arc<OAuthClient> {
        &self.oauth
    }

    /// Metadata pusher.
    #[must_use]
    pub const fn pusher(&self) -> &MetadataPusher {
        &self.pusher
    }

    /// Token store.
    #[must_use]
    pub const fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Start an authorization: consent URL plus the state to remember.
    ///
    /// # Errors
    ///
    /// See [`OAuthClient::begin_authorization`].
    pub fn begin(&self) -> Result<AuthorizationRequest> {
        self.oauth.begin_authorization()
    }

    /// Finish an authorization whose state has already been verified.
    ///
    /// Exchanges `code`, identifies the user, stores their tokens and pushes
    /// their first metadata document. Returns the linked Discord user.
    ///
    /// # Errors
    ///
    /// Fails on the first provider or storage error; tokens are only stored
    /// once the identity lookup has succeeded.
    pub async fn complete_authorization(&self, code: &str) -> Result<DiscordUser> {
        let grant = self.oauth.exchange_code(code).await?;
        let record = TokenRecord::from_grant(grant, self.oauth.now(), Operation::TokenExchange)?;

        let info = self.oauth.fetch_identity(&record).await?;
        let user = info.user.ok_or_else(|| LinkedRoleError::InvalidResponse {
            operation: Operation::Identity,
            message: "authorization carries no user; is the identify scope granted?".to_string(),
        })?;
        let user_id = user.user_id();

        self.oauth
            .store_record(&self.tokens, &user_id, &record)
            .await?;
        tracing::info!(user_id = %user_id, username = %user.username, "Linked Discord account");

        self.push_document(&user_id, &record).await?;

        Ok(user)
    }

    /// Recompute and push the metadata of an already linked user.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::NotLinked`] if no tokens are stored for
    /// `user_id`, otherwise the first provider or storage error.
    pub async fn update_metadata(&self, user_id: &UserId) -> Result<()> {
        let record = self
            .tokens
            .get(user_id)
            .await?
            .ok_or_else(|| LinkedRoleError::NotLinked {
                user_id: user_id.to_string(),
            })?;

        self.push_document(user_id, &record).await
    }

    async fn push_document(&self, user_id: &UserId, record: &TokenRecord) -> Result<()> {
        let document = self.metadata.compute_metadata(user_id).await?;
        self.pusher
            .push(&self.tokens, user_id, record, &document)
            .await
    }
}

/// Check the state Discord sent back against the one issued.
///
/// Fails when either side is missing or the two differ. The comparison
/// runs in constant time.
///
/// # Errors
///
/// Returns [`LinkedRoleError::StateMismatch`].
pub fn verify_state(expected: Option<&str>, presented: Option<&str>) -> Result<()> {
    match (expected, presented) {
        (Some(expected), Some(presented))
            if !expected.is_empty()
                && constant_time_eq::constant_time_eq(
                    expected.as_bytes(),
                    presented.as_bytes(),
                ) =>
        {
            Ok(())
        }
        _ => Err(LinkedRoleError::StateMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_must_match() {
        assert!(verify_state(Some("abc"), Some("abc")).is_ok());
        assert_eq!(
            verify_state(Some("abc"), Some("abd")),
            Err(LinkedRoleError::StateMismatch)
        );
    }

    #[test]
    fn test_state_missing_on_either_side() {
        assert!(verify_state(None, Some("abc")).is_err());
        assert!(verify_state(Some("abc"), None).is_err());
        assert!(verify_state(None, None).is_err());
        assert!(verify_state(Some(""), Some("")).is_err());
    }
}
