//! Mock token store.

use crate::error::Result;
use crate::providers::TokenStore;
use crate::state::{TokenRecord, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory token store.
///
/// Tokens are stored in plain text. Counts writes so tests can assert how
/// many times a record was persisted.
///
/// **WARNING**: Do NOT use in production.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    records: Arc<Mutex<HashMap<UserId, TokenRecord>>>,
    puts: Arc<AtomicUsize>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a write.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn with_record(self, user_id: &UserId, record: TokenRecord) -> Self {
        self.records.lock().unwrap().insert(user_id.clone(), record);
        self
    }

    /// Current record for `user_id`.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn record(&self, user_id: &UserId) -> Option<TokenRecord> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    /// Number of `put` calls so far.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl TokenStore for InMemoryTokenStore {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn get(&self, user_id: &UserId) -> Result<Option<TokenRecord>> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn put(&self, user_id: &UserId, record: &TokenRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(user_id.clone(), record.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::clock::test_clock;
    use crate::environment::Clock;

    fn record(access_token: &str) -> TokenRecord {
        TokenRecord {
            access_token: access_token.to_string(),
            refresh_token: "RT1".to_string(),
            expires_at: test_clock().now(),
        }
    }

    #[tokio::test]
    async fn test_put_replaces_record() {
        let store = InMemoryTokenStore::new();
        let user = UserId::from("42");

        store.put(&user, &record("AT1")).await.unwrap();
        store.put(&user, &record("AT2")).await.unwrap();

        let stored = store.get(&user).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "AT2");
        assert_eq!(store.put_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let store = InMemoryTokenStore::new().with_record(&UserId::from("1"), record("AT1"));
        assert!(store.get(&UserId::from("2")).await.unwrap().is_none());
        assert_eq!(store.put_count(), 0);
    }
}
