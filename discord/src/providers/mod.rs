//! Collaborator traits.
//!
//! The OAuth client and the linking service depend on these traits, and the
//! binary provides concrete implementations:
//!
//! - [`TokenStore`]: per-user [`TokenRecord`](crate::state::TokenRecord)
//!   persistence (`Redis` in production, in-memory in tests)
//! - [`MetadataSource`]: computes a user's metadata document from the game
//!   profile store (`PostgreSQL` in production, fixed documents in tests)
//!
//! This enables:
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Use real services (`PostgreSQL`, `Redis`)

pub mod metadata_source;
pub mod token_store;

pub use metadata_source::MetadataSource;
pub use token_store::TokenStore;
