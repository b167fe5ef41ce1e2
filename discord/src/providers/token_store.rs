//! Discord token storage trait.

use crate::error::Result;
use crate::state::{TokenRecord, UserId};

/// Per-user Discord token store.
///
/// # Implementation Notes
///
/// - `put` is a full-record replace; implementations must never merge fields
///   from a previous record.
/// - Tokens are credentials. Production stores encrypt them at rest.
///
/// # Example
///
/// ```ignore
/// // Store tokens after the OAuth callback
/// token_store.put(&user_id, &record).await?;
///
/// // Retrieve them when metadata needs pushing
/// let record = token_store.get(&user_id).await?;
/// ```
pub trait TokenStore: Send + Sync {
    /// Get the token record for a user.
    ///
    /// # Returns
    ///
    /// - `Some(record)` if the user has linked their account
    /// - `None` otherwise
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Storage`](crate::LinkedRoleError::Storage)
    /// if retrieval fails.
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<TokenRecord>>> + Send;

    /// Store (replace) the token record for a user.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Storage`](crate::LinkedRoleError::Storage)
    /// if storage fails.
    fn put(
        &self,
        user_id: &UserId,
        record: &TokenRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
