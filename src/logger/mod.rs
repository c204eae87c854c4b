//! Process-wide `tracing` setup. Session code logs through the re-exported
//! macros; see `bin/session_demo.rs` for the subscriber in action.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
