//! Mock provider implementations for testing.
//!
//! In-memory implementations of the collaborator traits plus controllable
//! clocks, for use in unit and integration tests.

pub mod clock;
pub mod metadata_source;
pub mod token_store;

pub use clock::{test_clock, FixedClock, ManualClock};
pub use metadata_source::StaticMetadataSource;
pub use token_store::InMemoryTokenStore;
