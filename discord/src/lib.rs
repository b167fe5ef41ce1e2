//! # Linked Roles for Discord
//!
//! Links a game account to a Discord user and keeps the user's
//! role-connection metadata in sync, so servers can gate roles on it.
//!
//! ## Features
//!
//! - **OAuth2 authorization-code flow** with signed-state correlation
//! - **Token lifecycle**: refresh on expiry, serialized per user
//! - **Metadata push/fetch** against the role-connection endpoint
//! - **Schema registration** for the application's metadata fields
//! - **Storage**: encrypted Redis token store, `PostgreSQL` profile source
//!
//! ## Architecture
//!
//! ```text
//! Front door → LinkedRoles → OAuthClient ─┬→ Discord token / identity endpoints
//!                   │             │        └→ TokenStore (refreshed records)
//!                   │             └→ MetadataPusher → role-connection endpoint
//!                   └→ MetadataSource (game profile → document)
//! ```
//!
//! ## Example: linking an account
//!
//! ```rust,ignore
//! use linked_roles_discord::*;
//!
//! let oauth = Arc::new(OAuthClient::new(DiscordConfig::from_env()?)?);
//! let service = LinkedRoles::new(oauth, token_store, metadata_source);
//!
//! // 1. Redirect the user to Discord, remember `request.state`
//! let request = service.begin()?;
//!
//! // 2. On callback, check state and finish
//! verify_state(Some(&remembered), Some(&returned))?;
//! let user = service.complete_authorization(&code).await?;
//!
//! // 3. Later, re-sync after the game profile changed
//! service.update_metadata(&user.user_id()).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod linking;
pub mod locks;
pub mod metadata;
pub mod oauth;
pub mod providers;
pub mod pusher;
pub mod registrar;
pub mod state;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

mod request;

// Re-export main types for convenience
pub use config::DiscordConfig;
pub use error::{LinkedRoleError, Operation, Result};
pub use linking::{verify_state, LinkedRoles};
pub use metadata::{LinkedProfile, MetadataDocument, MetadataField, MetadataType};
pub use oauth::OAuthClient;
pub use pusher::MetadataPusher;
pub use registrar::SchemaRegistrar;
pub use state::{DiscordUser, TokenRecord, UserId};
