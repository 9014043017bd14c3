/*!
 * Process Control Block Store
 * Owns one PCB per live pid, keyed for O(1) lookup
 */

use super::types::Pcb;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::Pid;
use ahash::RandomState;
use std::collections::HashMap;

/// Process table
#[derive(Debug, Default)]
pub struct ProcessTable {
    processes: HashMap<Pid, Pcb, RandomState>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            processes: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Insert a PCB. A pid already present is an invariant violation
    /// reported back to the caller as `false`.
    #[must_use]
    pub fn insert(&mut self, pcb: Pcb) -> bool {
        match self.processes.entry(pcb.pid) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(pcb);
                true
            }
        }
    }

    pub fn lookup(&self, pid: Pid) -> SchedulerResult<&Pcb> {
        self.processes
            .get(&pid)
            .ok_or(SchedulerError::NoSuchProcess(pid as i64))
    }

    pub fn lookup_mut(&mut self, pid: Pid) -> SchedulerResult<&mut Pcb> {
        self.processes
            .get_mut(&pid)
            .ok_or(SchedulerError::NoSuchProcess(pid as i64))
    }

    pub fn remove(&mut self, pid: Pid) -> SchedulerResult<Pcb> {
        self.processes
            .remove(&pid)
            .ok_or(SchedulerError::NoSuchProcess(pid as i64))
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.processes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = ProcessTable::new();
        assert!(table.insert(Pcb::new(1, "init", 10)));
        assert!(table.insert(Pcb::new(2, "pi", 5)));

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(2).unwrap().name, "pi");

        table.lookup_mut(2).unwrap().priority = 3;
        assert_eq!(table.lookup(2).unwrap().priority, 3);

        let removed = table.remove(1).unwrap();
        assert_eq!(removed.pid, 1);
        assert!(!table.contains(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_pid_is_no_such_process() {
        let mut table = ProcessTable::new();
        assert_eq!(
            table.lookup(99).unwrap_err(),
            SchedulerError::NoSuchProcess(99)
        );
        assert!(table.remove(99).is_err());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut table = ProcessTable::new();
        assert!(table.insert(Pcb::new(1, "a", 10)));
        assert!(!table.insert(Pcb::new(1, "b", 10)));
        assert_eq!(table.lookup(1).unwrap().name, "a");
    }
}
