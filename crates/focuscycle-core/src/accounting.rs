//! Focus-time accounting.
//!
//! The timer tells a [`FocusTimeSink`] about every completed focus phase and
//! does not care what happens next. [`crate::storage::Database`] is the
//! persistent implementation.

use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Receives the configured focus minutes each time a focus phase completes.
pub trait FocusTimeSink: Send {
    /// # Errors
    ///
    /// Implementations may fail; the timer logs the error and carries on.
    fn focus_completed(&mut self, minutes: u32) -> Result<()>;
}

/// Sink that discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FocusTimeSink for NullSink {
    fn focus_completed(&mut self, _minutes: u32) -> Result<()> {
        Ok(())
    }
}

/// In-memory ledger. Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: Arc<Mutex<Vec<u32>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minutes credited so far, oldest first.
    pub fn entries(&self) -> Vec<u32> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn total_minutes(&self) -> u64 {
        self.entries().iter().map(|&m| u64::from(m)).sum()
    }
}

impl FocusTimeSink for MemoryLedger {
    fn focus_completed(&mut self, minutes: u32) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(minutes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_ledger_clones_share_entries() {
        let ledger = MemoryLedger::new();
        let mut handle = ledger.clone();
        handle.focus_completed(25).unwrap();
        handle.focus_completed(50).unwrap();
        assert_eq!(ledger.entries(), vec![25, 50]);
        assert_eq!(ledger.total_minutes(), 75);
    }

    #[test]
    fn null_sink_accepts_everything() {
        assert!(NullSink.focus_completed(25).is_ok());
    }
}
