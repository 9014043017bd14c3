/*!
 * Scheduler Priority Management
 * Relocates processes after a priority change and re-evaluates preemption
 */

use super::{SchedState, Scheduler};
use crate::core::errors::{invariant_violation, SchedulerError, SchedulerResult};
use crate::core::types::{Pid, Priority, ProcessState};
use tracing::{debug, info};

impl Scheduler {
    /// Change the priority of a live process. Caller holds the lock and has
    /// already range-checked `new_priority`.
    ///
    /// Returns the previous priority. Same-value updates are a no-op so the
    /// queue position of a runnable process is left untouched.
    pub(crate) fn apply_priority(
        &self,
        state: &mut SchedState,
        pid: Pid,
        new_priority: Priority,
    ) -> SchedulerResult<Priority> {
        let pcb = state.table.lookup(pid)?;
        if !pcb.state.is_live() {
            return Err(SchedulerError::NoSuchProcess(pid as i64));
        }

        let old_priority = pcb.priority;
        if old_priority == new_priority {
            return Ok(old_priority);
        }

        let pcb_state = pcb.state;
        let handle = pcb.queue_position;

        if pcb_state == ProcessState::Runnable {
            let Some(handle) = handle else {
                invariant_violation("runnable process without a queue position");
            };
            if state.queue.remove(handle) != Some(pid) {
                invariant_violation("queue position points at another process");
            }
            // Keep the arrival stamp: waiting time still counts among peers
            let moved = state.queue.insert(pid, new_priority, handle.seq);
            if let Ok(pcb) = state.table.lookup_mut(pid) {
                pcb.queue_position = Some(moved);
            }
        }

        if let Ok(pcb) = state.table.lookup_mut(pid) {
            pcb.priority = new_priority;
        }

        state.flag_preemptions();
        self.stats.inc_priority_changes();

        info!(
            pid,
            old_priority,
            new_priority,
            state = %pcb_state,
            "Updated process priority"
        );
        debug!(best = ?state.queue.peek_highest(), "Preemption re-evaluated");
        Ok(old_priority)
    }
}
