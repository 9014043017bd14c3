/*!
 * CPU Scheduler
 * Priority scheduling with arrival-order tie breaking and preemption
 */

use super::table::ProcessTable;
use super::types::Pcb;
use crate::config::SchedulerConfig;
use crate::core::errors::{invariant_violation, ConfigError, SchedulerError, SchedulerResult};
use crate::core::limits::FIRST_PID;
use crate::core::types::{ArrivalSeq, CoreId, Pid, ProcessState};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

mod atomic_stats;
mod operations;
mod policy;
pub mod queue;
mod stats;

use atomic_stats::AtomicSchedulerStats;
use queue::ReadyQueue;

/// Dispatch bookkeeping for one execution core
#[derive(Debug, Clone, Default)]
pub(crate) struct CoreSlot {
    pub current: Option<Pid>,
    pub need_resched: bool,
    pub ticks_used: u32,
    pub claimed: bool,
}

/// Everything guarded by the scheduler lock
#[derive(Debug)]
pub(crate) struct SchedState {
    pub table: ProcessTable,
    pub queue: ReadyQueue,
    pub cores: Vec<CoreSlot>,
    next_seq: ArrivalSeq,
    next_pid: Pid,
}

impl SchedState {
    fn new(cores: usize) -> Self {
        Self {
            table: ProcessTable::new(),
            queue: ReadyQueue::new(),
            cores: vec![CoreSlot::default(); cores],
            next_seq: 0,
            next_pid: FIRST_PID,
        }
    }

    pub fn slot(&self, core: CoreId) -> SchedulerResult<&CoreSlot> {
        self.cores
            .get(core)
            .ok_or(SchedulerError::CoreOutOfRange(core))
    }

    pub fn slot_mut(&mut self, core: CoreId) -> SchedulerResult<&mut CoreSlot> {
        self.cores
            .get_mut(core)
            .ok_or(SchedulerError::CoreOutOfRange(core))
    }

    fn alloc_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    fn alloc_seq(&mut self) -> ArrivalSeq {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Put `pid` at the back of its priority class
    fn enqueue(&mut self, pid: Pid) {
        let seq = self.alloc_seq();
        let pcb = match self.table.lookup_mut(pid) {
            Ok(pcb) => pcb,
            Err(_) => invariant_violation("enqueue of a pid missing from the process table"),
        };
        if pcb.queue_position.is_some() {
            invariant_violation("process already queued");
        }
        let handle = self.queue.insert(pid, pcb.priority, seq);
        pcb.state = ProcessState::Runnable;
        pcb.core = None;
        pcb.queue_position = Some(handle);
    }

    /// The PCB running on `core`, cross-checked against the slot
    fn running_pcb(&self, core: CoreId, pid: Pid) -> &Pcb {
        match self.table.lookup(pid) {
            Ok(pcb) if pcb.state == ProcessState::Running && pcb.core == Some(core) => pcb,
            _ => invariant_violation("core slot names a process that is not running there"),
        }
    }

    /// Flag every core whose running process is strictly worse than the
    /// best runnable candidate, plus idle cores while work is queued.
    fn flag_preemptions(&mut self) {
        let Some((_, best)) = self.queue.peek_highest() else {
            return;
        };

        for core in 0..self.cores.len() {
            let worse = match self.cores[core].current {
                Some(pid) => self.running_pcb(core, pid).priority > best,
                None => true,
            };
            if worse {
                self.cores[core].need_resched = true;
            }
        }
    }
}

/// CPU Scheduler
///
/// Single owned context for the process table, the ready queue and the
/// per-core slots. Cloning yields another handle to the same state.
///
/// Statistics live outside the lock as atomics, so `stats()` never
/// contends with dispatch.
pub struct Scheduler {
    state: Arc<Mutex<SchedState>>,
    config: Arc<SchedulerConfig>,
    stats: Arc<AtomicSchedulerStats>,
}

impl Scheduler {
    /// Create scheduler from a validated configuration
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SchedulerConfig) -> Self {
        info!(
            cores = config.cores,
            quantum_ticks = config.quantum_ticks,
            default_priority = config.default_priority,
            "Scheduler initialized"
        );

        Self {
            state: Arc::new(Mutex::new(SchedState::new(config.cores))),
            stats: Arc::new(AtomicSchedulerStats::new(config.quantum_ticks)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn cores(&self) -> usize {
        self.config.cores
    }

    /// Run `f` with the scheduler lock held
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut SchedState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }

    /// Reserve `core` for a single dispatch loop
    pub(crate) fn claim_core(&self, core: CoreId) -> SchedulerResult<()> {
        let mut state = self.state.lock();
        let slot = state.slot_mut(core)?;
        if slot.claimed {
            return Err(SchedulerError::CoreBusy(core));
        }
        slot.claimed = true;
        Ok(())
    }

    pub(crate) fn release_core(&self, core: CoreId) {
        if let Ok(slot) = self.state.lock().slot_mut(core) {
            slot.claimed = false;
        }
    }
}

impl Clone for Scheduler {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            config: Arc::clone(&self.config),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from_valid_config(SchedulerConfig::default())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
