//! Application state for Axum handlers.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use linked_roles_discord::LinkedRoles;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use thiserror::Error;

/// Minimum length of the cookie signing secret in bytes.
pub const MIN_COOKIE_SECRET_LEN: usize = 32;

/// Errors building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The cookie signing secret is too short.
    #[error("cookie secret must be at least {MIN_COOKIE_SECRET_LEN} bytes, got {0}")]
    WeakCookieSecret(usize),

    /// The derived key was rejected.
    #[error("invalid cookie signing key: {0}")]
    InvalidKey(String),
}

/// State shared by all handlers.
///
/// # Type Parameters
///
/// - `T`: Token store
/// - `M`: Metadata source
pub struct AppState<T, M> {
    /// Linking service.
    pub linked_roles: Arc<LinkedRoles<T, M>>,

    /// Key signing the OAuth correlation cookie.
    cookie_key: Key,

    /// Whether cookies carry the `Secure` attribute.
    secure_cookies: bool,
}

impl<T, M> AppState<T, M> {
    /// Build the state, deriving the cookie signing key from `cookie_secret`.
    ///
    /// Cookies are marked `Secure` when `redirect_uri` is served over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::WeakCookieSecret`] if the secret is shorter than
    /// [`MIN_COOKIE_SECRET_LEN`] bytes.
    pub fn new(
        linked_roles: Arc<LinkedRoles<T, M>>,
        cookie_secret: &[u8],
        redirect_uri: &str,
    ) -> Result<Self, StateError> {
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(StateError::WeakCookieSecret(cookie_secret.len()));
        }

        let digest = Sha512::digest(cookie_secret);
        let cookie_key =
            Key::try_from(digest.as_slice()).map_err(|e| StateError::InvalidKey(e.to_string()))?;

        Ok(Self {
            linked_roles,
            cookie_key,
            secure_cookies: redirect_uri.starts_with("https://"),
        })
    }

    /// Whether cookies carry the `Secure` attribute.
    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

impl<T, M> Clone for AppState<T, M> {
    fn clone(&self) -> Self {
        Self {
            linked_roles: Arc::clone(&self.linked_roles),
            cookie_key: self.cookie_key.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

impl<T, M> FromRef<AppState<T, M>> for Key {
    fn from_ref(state: &AppState<T, M>) -> Self {
        state.cookie_key.clone()
    }
}

impl<T, M> std::fmt::Debug for AppState<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}
