//! PostgreSQL storage implementations.

pub mod profile;

// Re-exports
pub use profile::PostgresMetadataSource;
