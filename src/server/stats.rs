//! Command statistics
//!
//! Thread-safe invocation counters keyed by command name, owned by the
//! server instance and shared with every session.

use std::collections::HashMap;
use std::sync::Mutex;

/// Counts how many times each command has been received.
///
/// Each increment is one short critical section; contention is low since
/// sessions touch the map once per command.
#[derive(Debug, Default)]
pub struct CommandStats {
    counts: Mutex<HashMap<&'static str, u64>>,
}

impl CommandStats {
    /// Record one invocation of the given action.
    pub fn record(&self, action: &'static str) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(action).or_insert(0) += 1;
    }

    /// Invocation count for one action.
    pub fn count(&self, action: &str) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.get(action).copied().unwrap_or(0)
    }

    /// Consistent copy of all counters for reporting.
    pub fn snapshot(&self) -> HashMap<&'static str, u64> {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.clone()
    }
}
