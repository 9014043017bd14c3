/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{ArrivalSeq, CoreId, ExitCode, Pid, Priority, ProcessState};
use serde::{Deserialize, Serialize};

/// Position of a runnable process inside the ready queue.
///
/// Only meaningful to the queue that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueHandle {
    pub(crate) priority: Priority,
    pub(crate) seq: ArrivalSeq,
}

impl QueueHandle {
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn seq(&self) -> ArrivalSeq {
        self.seq
    }
}

/// Process control block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Pcb {
    pub pid: Pid,
    pub parent: Option<Pid>,
    pub name: String,
    pub priority: Priority,
    pub state: ProcessState,
    /// Present iff the process is runnable
    pub queue_position: Option<QueueHandle>,
    /// Present iff the process is running
    pub core: Option<CoreId>,
    pub exit_code: Option<ExitCode>,
    pub dispatches: u64,
    pub ticks_run: u64,
}

impl Pcb {
    pub fn new(pid: Pid, name: impl Into<String>, priority: Priority) -> Self {
        Self {
            pid,
            parent: None,
            name: name.into(),
            priority,
            state: ProcessState::Runnable,
            queue_position: None,
            core: None,
            exit_code: None,
            dispatches: 0,
            ticks_run: 0,
        }
    }

    pub fn with_parent(mut self, parent: Pid) -> Self {
        self.parent = Some(parent);
        self
    }

    /// State and attachment fields agree with each other
    pub fn is_consistent(&self) -> bool {
        let queued_ok = self.queue_position.is_some() == (self.state == ProcessState::Runnable);
        let core_ok = self.core.is_some() == (self.state == ProcessState::Running);
        let prio_ok = self
            .queue_position
            .map_or(true, |handle| handle.priority == self.priority);
        queued_ok && core_ok && prio_ok
    }
}

/// Per-core view captured in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoreSnapshot {
    pub core: CoreId,
    pub current: Option<Pid>,
    pub need_resched: bool,
    pub ticks_used: u32,
}

/// Consistent copy of the whole scheduler state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerSnapshot {
    /// PCBs sorted by pid
    pub processes: Vec<Pcb>,
    /// Ready queue contents in dispatch order
    pub ready: Vec<(Pid, QueueHandle)>,
    pub cores: Vec<CoreSnapshot>,
    pub next_seq: ArrivalSeq,
    pub next_pid: Pid,
}

/// Scheduler statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub total_scheduled: u64,
    pub context_switches: u64,
    pub preemptions: u64,
    pub priority_changes: u64,
    pub active_processes: usize,
    pub quantum_ticks: u32,
}
