//! Role-connection metadata push and fetch.

use crate::error::{Operation, Result};
use crate::metadata::{MetadataDocument, RoleConnection};
use crate::oauth::OAuthClient;
use crate::providers::TokenStore;
use crate::request;
use crate::state::{TokenRecord, UserId};
use std::sync::Arc;

/// Writes and reads a user's role-connection metadata.
///
/// Both calls first obtain a fresh access token through the shared
/// [`OAuthClient`], so an expired record is refreshed (and persisted) before
/// the role-connection endpoint is touched.
#[derive(Debug, Clone)]
pub struct MetadataPusher {
    oauth: Arc<OAuthClient>,
}

impl MetadataPusher {
    /// Create a pusher sharing `oauth` for token refreshes.
    #[must_use]
    pub const fn new(oauth: Arc<OAuthClient>) -> Self {
        Self { oauth }
    }

    /// Replace the user's role-connection metadata with `document`.
    ///
    /// The document is sent nested under `metadata`, next to the configured
    /// platform name. No retry on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`](crate::LinkedRoleError::Provider)
    /// tagged `refresh` or `metadata-push`.
    pub async fn push<T: TokenStore>(
        &self,
        store: &T,
        user_id: &UserId,
        record: &TokenRecord,
        document: &MetadataDocument,
    ) -> Result<()> {
        let access_token = self
            .oauth
            .ensure_fresh_access_token(store, user_id, record)
            .await?;

        let config = self.oauth.config();
        let body = RoleConnection {
            platform_name: Some(config.platform_name.clone()),
            platform_username: None,
            metadata: document.clone(),
        };

        let request = self
            .oauth
            .http_client()
            .put(config.role_connection_url())
            .bearer_auth(access_token)
            .json(&body);

        request::execute(Operation::MetadataPush, request).await?;

        metrics::counter!("linked_roles.metadata_push").increment(1);
        tracing::info!(user_id = %user_id, fields = document.len(), "Pushed role-connection metadata");

        Ok(())
    }

    /// Read back the user's current role-connection metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`](crate::LinkedRoleError::Provider)
    /// tagged `refresh` or `metadata-fetch`, or
    /// [`LinkedRoleError::InvalidResponse`](crate::LinkedRoleError::InvalidResponse)
    /// if the body cannot be decoded.
    pub async fn fetch<T: TokenStore>(
        &self,
        store: &T,
        user_id: &UserId,
        record: &TokenRecord,
    ) -> Result<MetadataDocument> {
        let access_token = self
            .oauth
            .ensure_fresh_access_token(store, user_id, record)
            .await?;

        let request = self
            .oauth
            .http_client()
            .get(self.oauth.config().role_connection_url())
            .bearer_auth(access_token);

        let response = request::execute(Operation::MetadataFetch, request).await?;
        let connection: RoleConnection =
            request::read_json(Operation::MetadataFetch, response).await?;

        Ok(connection.metadata)
    }
}
