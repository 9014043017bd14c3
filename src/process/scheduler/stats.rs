/*!
 * Scheduler Statistics
 * Counters, consistent snapshots and invariant checking
 */

use super::{SchedState, Scheduler};
use crate::core::errors::InvariantViolation;
use crate::core::types::ProcessState;
use crate::process::types::{CoreSnapshot, SchedulerSnapshot, SchedulerStats};

impl Scheduler {
    /// Get scheduler statistics (lock-free snapshot)
    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot()
    }

    /// Copy of the store, the queue and the core slots taken under one lock
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.state.lock();

        let mut processes: Vec<_> = state.table.iter().cloned().collect();
        processes.sort_by_key(|pcb| pcb.pid);

        SchedulerSnapshot {
            processes,
            ready: state.queue.iter().collect(),
            cores: state
                .cores
                .iter()
                .enumerate()
                .map(|(core, slot)| CoreSnapshot {
                    core,
                    current: slot.current,
                    need_resched: slot.need_resched,
                    ticks_used: slot.ticks_used,
                })
                .collect(),
            next_seq: state.next_seq,
            next_pid: state.next_pid,
        }
    }

    /// Cross-check the store, the queue and the core slots.
    ///
    /// Diagnostic only: operations halt the core on corruption themselves,
    /// this reports it without panicking.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        check(&self.state.lock())
    }
}

fn check(state: &SchedState) -> Result<(), InvariantViolation> {
    let fail = |msg: String| Err(InvariantViolation(msg));

    for pcb in state.table.iter() {
        if !pcb.is_consistent() {
            return fail(format!("pcb {} inconsistent in state {}", pcb.pid, pcb.state));
        }
        if let Some(handle) = pcb.queue_position {
            if state.queue.iter().find(|(_, h)| *h == handle).map(|(pid, _)| pid) != Some(pcb.pid) {
                return fail(format!("pcb {} not at its queue position", pcb.pid));
            }
        }
        if let Some(core) = pcb.core {
            if state.cores.get(core).and_then(|slot| slot.current) != Some(pcb.pid) {
                return fail(format!("pcb {} not current on core {}", pcb.pid, core));
            }
        }
    }

    for (pid, _) in state.queue.iter() {
        match state.table.lookup(pid) {
            Ok(pcb) if pcb.state == ProcessState::Runnable => {}
            _ => return fail(format!("queued pid {} is not a runnable process", pid)),
        }
    }

    let runnable = state
        .table
        .iter()
        .filter(|pcb| pcb.state == ProcessState::Runnable)
        .count();
    if runnable != state.queue.len() {
        return fail(format!(
            "{} runnable processes but {} queue entries",
            runnable,
            state.queue.len()
        ));
    }

    for (core, slot) in state.cores.iter().enumerate() {
        if let Some(pid) = slot.current {
            match state.table.lookup(pid) {
                Ok(pcb) if pcb.core == Some(core) => {}
                _ => return fail(format!("core {} runs pid {} which is elsewhere", core, pid)),
            }
        }
    }

    Ok(())
}
