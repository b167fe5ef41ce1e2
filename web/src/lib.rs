//! Axum front door for Discord linked roles.
//!
//! Three endpoints sequence calls into [`linked_roles_discord::LinkedRoles`]:
//!
//! ```text
//! GET  /linked-role             → 303 to Discord, signed clientState cookie
//! GET  /discord-oauth-callback  → state check, code exchange, first push
//! POST /update-metadata         → re-push a linked user's metadata
//! ```
//!
//! Handlers stay thin: extract, call the service, map the result. Failures
//! become an [`AppError`], which hides provider detail from the client and
//! logs it server-side.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use linked_roles_web::{router, AppState};
//!
//! let state = AppState::new(Arc::new(linked_roles), secret.as_bytes(), &redirect_uri)?;
//! axum::serve(listener, router(state)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::AppError;
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::router;
pub use state::{AppState, StateError};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
