//! HTTP request handlers.

pub mod health;
pub mod metadata;
pub mod oauth;

pub use health::{health_check, root};
pub use metadata::{update_metadata, UpdateMetadataRequest};
pub use oauth::{linked_role, oauth_callback, CallbackParams};
