//! # Pending Writes
//!
//! What still has to reach the backend, in flush order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. retired_shifts   closed shifts replaced by start_shift before       │
//! │                      their final state was saved                        │
//! │  2. reports          appended once; a duplicate means "already there"   │
//! │  3. catalog_dirty    whole catalog, snapshot taken at flush time        │
//! │  4. shift_dirty      current shift, snapshot taken at flush time        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog and shift are flags rather than copies: the store always writes
//! the latest state, so several queued edits collapse into one write.

use std::collections::VecDeque;

use hearth_core::{Shift, ShiftReport};

#[derive(Debug, Default)]
pub(crate) struct PendingWrites {
    pub(crate) retired_shifts: VecDeque<Shift>,
    pub(crate) reports: VecDeque<ShiftReport>,
    pub(crate) catalog_dirty: bool,
    pub(crate) shift_dirty: bool,
    /// Failed flushes since the last successful one.
    pub(crate) attempts: u32,
    pub(crate) last_error: Option<String>,
}

impl PendingWrites {
    /// Number of queued writes.
    pub(crate) fn len(&self) -> usize {
        self.retired_shifts.len()
            + self.reports.len()
            + usize::from(self.catalog_dirty)
            + usize::from(self.shift_dirty)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current shift is being replaced. If its last state never made it
    /// to the backend, keep that state queued on its own.
    pub(crate) fn retire(&mut self, previous: Shift) {
        if self.shift_dirty {
            self.retired_shifts.push_back(previous);
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.attempts = 0;
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, error: String) {
        self.attempts += 1;
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_flags_and_queues() {
        let mut pending = PendingWrites::default();
        assert!(pending.is_empty());

        pending.catalog_dirty = true;
        pending.shift_dirty = true;
        pending.retired_shifts.push_back(Shift::initial());
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_retire_only_keeps_unsaved_shift() {
        let mut pending = PendingWrites::default();
        pending.retire(Shift::initial());
        assert!(pending.retired_shifts.is_empty());

        pending.shift_dirty = true;
        pending.retire(Shift::initial());
        assert_eq!(pending.retired_shifts.len(), 1);
    }

    #[test]
    fn test_failure_bookkeeping() {
        let mut pending = PendingWrites::default();
        pending.record_failure("locked".to_string());
        pending.record_failure("locked".to_string());
        assert_eq!(pending.attempts, 2);

        pending.record_success();
        assert_eq!(pending.attempts, 0);
        assert_eq!(pending.last_error, None);
    }
}
