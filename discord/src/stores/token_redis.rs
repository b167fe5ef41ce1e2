//! Redis-based Discord token store with encryption at rest.
//!
//! # Security
//!
//! Every record is encrypted with AES-256-GCM before it reaches Redis. The
//! key comes from `TOKEN_ENCRYPTION_KEY` (base64 of 32 random bytes) and must
//! never be committed to version control.
//!
//! # Architecture
//!
//! - **Key**: `linked_roles:token:{user_id}`
//! - **Value**: `[nonce (12 bytes)][ciphertext]`, the plaintext being the
//!   bincode-serialized [`TokenRecord`]
//! - **TTL**: none. The refresh token outlives the access token, and records
//!   are only ever replaced.
//!
//! # Example
//!
//! ```no_run
//! use linked_roles_discord::stores::RedisTokenStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let encryption_key = vec![0u8; 32]; // Replace with actual secure key!
//! let store = RedisTokenStore::new("redis://127.0.0.1:6379", &encryption_key).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{LinkedRoleError, Result};
use crate::providers::TokenStore;
use crate::state::{TokenRecord, UserId};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::sync::Arc;

const NONCE_LEN: usize = 12;

/// AES-256-GCM envelope for stored token records.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Arc<Aes256Gcm>,
}

impl TokenCipher {
    /// Create a cipher from a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(LinkedRoleError::Configuration(
                "Encryption key must be exactly 32 bytes (256 bits) for AES-256-GCM".to_string(),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| {
            LinkedRoleError::Configuration(format!("Failed to initialize AES-256-GCM cipher: {e}"))
        })?;

        Ok(Self {
            cipher: Arc::new(cipher),
        })
    }

    /// Create a cipher from a base64-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if the key is not valid
    /// base64 or does not decode to 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        use base64::Engine;

        let key = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                LinkedRoleError::Configuration(format!("Encryption key is not valid base64: {e}"))
            })?;
        Self::new(&key)
    }

    /// Serialize and encrypt a record.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Serialization`] if encoding or encryption fails.
    pub fn seal(&self, record: &TokenRecord) -> Result<Vec<u8>> {
        let plaintext =
            bincode::serialize(record).map_err(|e| LinkedRoleError::Serialization(e.to_string()))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|e| LinkedRoleError::Serialization(format!("Encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt and deserialize a record produced by [`TokenCipher::seal`].
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Serialization`] if the value is truncated,
    /// was tampered with, or was sealed under another key.
    pub fn open(&self, sealed: &[u8]) -> Result<TokenRecord> {
        if sealed.len() < NONCE_LEN {
            return Err(LinkedRoleError::Serialization(
                "Encrypted data too short (missing nonce)".to_string(),
            ));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| LinkedRoleError::Serialization(format!("Decryption failed: {e}")))?;

        bincode::deserialize(&plaintext).map_err(|e| LinkedRoleError::Serialization(e.to_string()))
    }
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

/// Redis-backed [`TokenStore`].
#[derive(Clone)]
pub struct RedisTokenStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    cipher: TokenCipher,
}

impl RedisTokenStore {
    /// Connect to Redis and set up encryption with a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] for a bad key and
    /// [`LinkedRoleError::Storage`] if Redis is unreachable.
    pub async fn new(redis_url: &str, encryption_key: &[u8]) -> Result<Self> {
        Self::with_cipher(redis_url, TokenCipher::new(encryption_key)?).await
    }

    /// Connect to Redis using an already built cipher.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Storage`] if Redis is unreachable.
    pub async fn with_cipher(redis_url: &str, cipher: TokenCipher) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| LinkedRoleError::Storage(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            LinkedRoleError::Storage(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self {
            conn_manager,
            cipher,
        })
    }

    fn token_key(user_id: &UserId) -> String {
        format!("linked_roles:token:{}", user_id.as_str())
    }
}

impl std::fmt::Debug for RedisTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTokenStore").finish_non_exhaustive()
    }
}

impl TokenStore for RedisTokenStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<TokenRecord>> {
        let mut conn = self.conn_manager.clone();

        let sealed: Option<Vec<u8>> = conn.get(Self::token_key(user_id)).await.map_err(|e| {
            LinkedRoleError::Storage(format!("Failed to get Discord tokens from Redis: {e}"))
        })?;

        sealed.map(|data| self.cipher.open(&data)).transpose()
    }

    async fn put(&self, user_id: &UserId, record: &TokenRecord) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let sealed = self.cipher.seal(record)?;

        let _: () = conn
            .set(Self::token_key(user_id), sealed)
            .await
            .map_err(|e| LinkedRoleError::Storage(format!("Failed to store Discord tokens: {e}")))?;

        tracing::info!(
            user_id = %user_id,
            expires_at = %record.expires_at,
            "Stored Discord tokens in Redis (encrypted)"
        );

        Ok(())
    }
}
