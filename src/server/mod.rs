//! Server module
//!
//! Listener core, admission control, and command statistics.

mod core;
mod stats;

pub use core::{Server, ShutdownHandle};
pub use stats::CommandStats;
