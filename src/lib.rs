//! Incremental trading-desk progression engine.
//!
//! All gameplay lives in [`desk`]: pure functions over a serializable
//! [`desk::state::DeskState`], with [`desk::Desk`] bundling the state, a
//! seeded session and a fixed-step [`time::TickClock`] for hosts that just
//! want to feed timestamps.

pub mod desk;
pub mod error;
pub mod time;

pub use desk::config::DeskConfig;
pub use desk::Desk;
pub use error::{ConfigError, SnapshotError};
