//! Mock metadata source.

use crate::error::Result;
use crate::metadata::{LinkedProfile, MetadataDocument};
use crate::providers::MetadataSource;
use crate::state::UserId;
use std::collections::HashMap;

/// Metadata source with fixed per-user documents.
///
/// Users without a configured document get the document of an empty
/// [`LinkedProfile`].
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    documents: HashMap<UserId, MetadataDocument>,
}

impl StaticMetadataSource {
    /// Create a source that knows no users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `document` for `user_id`.
    #[must_use]
    pub fn with_document(mut self, user_id: &UserId, document: MetadataDocument) -> Self {
        self.documents.insert(user_id.clone(), document);
        self
    }
}

impl MetadataSource for StaticMetadataSource {
    async fn compute_metadata(&self, user_id: &UserId) -> Result<MetadataDocument> {
        Ok(self
            .documents
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| LinkedProfile::default().to_document()))
    }
}
