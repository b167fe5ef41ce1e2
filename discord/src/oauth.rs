//! Discord OAuth2 client.
//!
//! Drives the authorization-code flow and owns the refresh decision for
//! stored credentials:
//!
//! 1. [`OAuthClient::begin_authorization`] builds the consent redirect and a
//!    fresh correlation token.
//! 2. [`OAuthClient::exchange_code`] trades the callback `code` for a grant.
//! 3. [`OAuthClient::ensure_fresh_access_token`] hands out a usable access
//!    token, refreshing and persisting a new record when the stored one has
//!    expired.
//!
//! Refreshes for the same user are serialized. A caller that waited on
//! another caller's refresh re-reads the store and uses the rotated token
//! instead of spending the (now revoked) refresh token a second time.

use crate::config::DiscordConfig;
use crate::constants::{OAUTH_SCOPES, STATE_TOKEN_BYTES};
use crate::environment::{Clock, SystemClock};
use crate::error::{LinkedRoleError, Operation, Result};
use crate::locks::KeyedLocks;
use crate::providers::TokenStore;
use crate::request;
use crate::state::{AuthorizationInfo, AuthorizationRequest, TokenGrant, TokenRecord, UserId};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;

/// Discord OAuth2 client.
///
/// # Example
///
/// ```no_run
/// use linked_roles_discord::{DiscordConfig, OAuthClient};
///
/// # fn main() -> linked_roles_discord::Result<()> {
/// let client = OAuthClient::new(DiscordConfig::from_env()?)?;
/// let request = client.begin_authorization()?;
/// println!("redirect to {}", request.url);
/// # Ok(())
/// # }
/// ```
pub struct OAuthClient {
    config: DiscordConfig,
    http_client: Client,
    clock: Arc<dyn Clock>,
    refresh_locks: KeyedLocks,
}

impl OAuthClient {
    /// Create a client using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let http_client = request::build_client(config.request_timeout)?;

        Ok(Self {
            config,
            http_client,
            clock: Arc::new(SystemClock),
            refresh_locks: KeyedLocks::new(),
        })
    }

    /// Replace the clock used for expiry decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Application configuration.
    #[must_use]
    pub const fn config(&self) -> &DiscordConfig {
        &self.config
    }

    pub(crate) const fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Current time according to the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Build the consent redirect for a new authorization.
    ///
    /// The returned `state` must be kept by the caller (signed cookie) and
    /// compared against the one Discord sends back.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Serialization`] if the query cannot be
    /// encoded.
    pub fn begin_authorization(&self) -> Result<AuthorizationRequest> {
        let state = generate_state();
        let scope = OAUTH_SCOPES.join(" ");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("state", state.as_str()),
            ("scope", scope.as_str()),
            ("prompt", "consent"),
        ];

        let query = serde_urlencoded::to_string(&params[..])
            .map_err(|e| LinkedRoleError::Serialization(format!("Failed to build URL: {e}")))?;

        Ok(AuthorizationRequest {
            url: format!("{}?{query}", self.config.authorize_url),
            state,
        })
    }

    /// Trade an authorization code for a token grant.
    ///
    /// The caller turns the grant into a [`TokenRecord`] with
    /// [`TokenRecord::from_grant`] and [`OAuthClient::now`].
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`] tagged `token-exchange` on a
    /// non-success answer or timeout.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        self.request_grant(Operation::TokenExchange, &form).await
    }

    /// Return an access token that is valid now.
    ///
    /// If `record` has not expired its access token is returned without any
    /// network call. Otherwise the refresh grant runs once for this user, the
    /// new record is written to `store` and its access token returned.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`] tagged `refresh` if Discord
    /// rejects the refresh; nothing is persisted in that case. Store failures
    /// surface as [`LinkedRoleError::Storage`].
    pub async fn ensure_fresh_access_token<T: TokenStore>(
        &self,
        store: &T,
        user_id: &UserId,
        record: &TokenRecord,
    ) -> Result<String> {
        if !record.is_expired(self.now()) {
            return Ok(record.access_token.clone());
        }

        let _guard = self.refresh_locks.lock(user_id.as_str()).await;

        let current = store.get(user_id).await?.unwrap_or_else(|| record.clone());
        if !current.is_expired(self.now()) {
            tracing::debug!(user_id = %user_id, "Token already refreshed by a concurrent caller");
            record_refresh("coalesced");
            return Ok(current.access_token);
        }

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
        ];

        let grant = match self.request_grant(Operation::Refresh, &form).await {
            Ok(grant) => grant,
            Err(e) => {
                record_refresh("failure");
                return Err(e);
            }
        };

        let refreshed = match TokenRecord::from_grant(grant, self.now(), Operation::Refresh) {
            Ok(record) => record,
            Err(e) => {
                record_refresh("failure");
                return Err(e);
            }
        };
        store.put(user_id, &refreshed).await?;
        record_refresh("success");

        tracing::info!(
            user_id = %user_id,
            expires_at = %refreshed.expires_at,
            "Refreshed Discord access token"
        );

        Ok(refreshed.access_token)
    }

    /// Persist a freshly authorized record for `user_id`.
    ///
    /// Takes the same per-user lock as [`OAuthClient::ensure_fresh_access_token`],
    /// so a refresh already in flight finishes before this write and cannot
    /// overwrite it with a record derived from the old refresh token.
    ///
    /// # Errors
    ///
    /// Store failures surface as [`LinkedRoleError::Storage`].
    pub async fn store_record<T: TokenStore>(
        &self,
        store: &T,
        user_id: &UserId,
        record: &TokenRecord,
    ) -> Result<()> {
        let _guard = self.refresh_locks.lock(user_id.as_str()).await;
        store.put(user_id, record).await
    }

    /// Look up the current authorization, including the authorizing user.
    ///
    /// Uses `record.access_token` as-is; refresh first if freshness matters.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkedRoleError::Provider`] tagged `identity` on a
    /// non-success answer.
    pub async fn fetch_identity(&self, record: &TokenRecord) -> Result<AuthorizationInfo> {
        let request = self
            .http_client
            .get(self.config.identity_url())
            .bearer_auth(&record.access_token);

        let response = request::execute(Operation::Identity, request).await?;
        request::read_json(Operation::Identity, response).await
    }

    async fn request_grant(&self, operation: Operation, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let request = self.http_client.post(self.config.token_url()).form(form);

        let response = request::execute(operation, request).await?;
        request::read_json(operation, response).await
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("config", &self.config)
            .field("pending_refreshes", &self.refresh_locks.len())
            .finish_non_exhaustive()
    }
}

/// Generate an unguessable OAuth correlation token.
///
/// 256 bits of randomness, base64url encoded (43 characters).
#[must_use]
pub fn generate_state() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn record_refresh(outcome: &'static str) {
    metrics::counter!("linked_roles.token_refresh", "outcome" => outcome).increment(1);
}
