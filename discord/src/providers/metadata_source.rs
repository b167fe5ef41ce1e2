//! Metadata computation trait.

use crate::error::Result;
use crate::metadata::MetadataDocument;
use crate::state::UserId;

/// Computes the linked-role metadata document for a Discord user.
///
/// This is the boundary to the external game profile store; the linking
/// service never sees how the document is derived.
pub trait MetadataSource: Send + Sync {
    /// Compute the full metadata document for `user_id`.
    ///
    /// Users unknown to the backing store get a document, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Storage`](crate::LinkedRoleError::Storage)
    /// if the backing store cannot be queried.
    fn compute_metadata(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<MetadataDocument>> + Send;
}
