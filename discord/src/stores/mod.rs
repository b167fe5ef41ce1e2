//! Storage implementations.
//!
//! - **Token Store** (Redis) - Encrypted per-user Discord token records
//! - **Metadata Source** (PostgreSQL) - Game profiles rendered as metadata documents

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod token_redis;

// Re-exports
#[cfg(feature = "postgres")]
pub use postgres::PostgresMetadataSource;
pub use token_redis::{RedisTokenStore, TokenCipher};
