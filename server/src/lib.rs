//! Discord linked-roles server.
//!
//! Wires the Redis token store, the `PostgreSQL` profile source and the
//! Discord client into the HTTP front door. Two binaries build on it:
//!
//! - `linked-roles-server`: the HTTP service
//! - `register-metadata`: one-shot metadata schema registration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod telemetry;

pub use config::Config;
