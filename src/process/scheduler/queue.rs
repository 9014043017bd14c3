/*!
 * Priority Ready Queue
 * Runnable processes ordered by (priority, arrival)
 */

use crate::core::types::{ArrivalSeq, Pid, Priority};
use crate::process::types::QueueHandle;
use std::collections::BTreeMap;

/// Ready queue
///
/// # Performance
/// Keyed by `(priority, arrival seq)` in an ordered map, so insert, remove
/// by handle and pop are all O(log n). The arrival seq is unique per insert,
/// which makes every key distinct and ties resolve oldest-first.
#[derive(Debug, Default, Clone)]
pub struct ReadyQueue {
    entries: BTreeMap<QueueHandle, Pid>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `pid` at `priority`, stamped with `seq`
    pub fn insert(&mut self, pid: Pid, priority: Priority, seq: ArrivalSeq) -> QueueHandle {
        let handle = QueueHandle { priority, seq };
        let previous = self.entries.insert(handle, pid);
        debug_assert!(previous.is_none(), "arrival seq {} reused", seq);
        handle
    }

    /// Remove the entry behind `handle`, whatever its rank
    pub fn remove(&mut self, handle: QueueHandle) -> Option<Pid> {
        self.entries.remove(&handle)
    }

    /// Remove and return the best entry
    pub fn pop_highest(&mut self) -> Option<(Pid, QueueHandle)> {
        self.entries.pop_first().map(|(handle, pid)| (pid, handle))
    }

    /// Inspect the best entry without removing it
    pub fn peek_highest(&self) -> Option<(Pid, Priority)> {
        self.entries
            .first_key_value()
            .map(|(handle, pid)| (*pid, handle.priority))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = (Pid, QueueHandle)> + '_ {
        self.entries.iter().map(|(handle, pid)| (*pid, *handle))
    }
}
