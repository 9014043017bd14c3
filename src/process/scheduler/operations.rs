/*!
 * Scheduler Core Operations
 * Spawn, dispatch, tick, yield, block, wake, exit and reap
 */

use super::{SchedState, Scheduler};
use crate::core::errors::{invariant_violation, SchedulerError, SchedulerResult};
use crate::core::limits::priority_in_range;
use crate::core::types::{CoreId, ExitCode, Pid, Priority, ProcessState};
use crate::process::types::Pcb;
use tracing::{debug, info, trace};

impl Scheduler {
    /// Create a runnable process. A new runnable process is a scheduling
    /// point, so cores running something worse get flagged.
    pub fn spawn(&self, name: &str, priority: Option<Priority>) -> SchedulerResult<Pid> {
        self.spawn_inner(None, name, priority)
    }

    /// Create a child of `parent`, inheriting its priority
    pub fn fork(&self, parent: Pid, name: &str) -> SchedulerResult<Pid> {
        self.spawn_inner(Some(parent), name, None)
    }

    fn spawn_inner(
        &self,
        parent: Option<Pid>,
        name: &str,
        priority: Option<Priority>,
    ) -> SchedulerResult<Pid> {
        if let Some(priority) = priority {
            if !priority_in_range(priority as i64) {
                return Err(SchedulerError::InvalidPriority(priority as i64));
            }
        }

        let mut state = self.state.lock();

        let priority = match parent {
            Some(ppid) => {
                let pcb = state.table.lookup(ppid)?;
                if !pcb.state.is_live() {
                    return Err(SchedulerError::NoSuchProcess(ppid as i64));
                }
                priority.unwrap_or(pcb.priority)
            }
            None => priority.unwrap_or(self.config.default_priority),
        };

        let pid = state.alloc_pid();
        let mut pcb = Pcb::new(pid, name, priority);
        pcb.parent = parent;
        if !state.table.insert(pcb) {
            invariant_violation("freshly allocated pid already in the process table");
        }
        state.enqueue(pid);
        state.flag_preemptions();
        drop(state);

        self.stats.inc_active();
        info!(pid, name, priority, parent = ?parent, "Process created");
        Ok(pid)
    }

    /// Dispatch decision for `core`.
    ///
    /// The running process keeps the core unless a strictly better
    /// candidate is queued, or its quantum expired and a peer of equal or
    /// better priority is waiting. An expired quantum with only worse
    /// candidates queued is renewed in place. Returns `None` when idle.
    pub fn schedule(&self, core: CoreId) -> SchedulerResult<Option<Pid>> {
        let mut state = self.state.lock();
        self.schedule_locked(&mut state, core)
    }

    pub(super) fn schedule_locked(
        &self,
        state: &mut SchedState,
        core: CoreId,
    ) -> SchedulerResult<Option<Pid>> {
        let quantum = self.config.quantum_ticks;
        let before = state.slot(core)?.clone();

        if let Some(pid) = before.current {
            let priority = state.running_pcb(core, pid).priority;
            let expired = before.ticks_used >= quantum;
            let best = state.queue.peek_highest().map(|(_, best)| best);
            let better = best.is_some_and(|best| best < priority);
            let peer_waiting = best.is_some_and(|best| best <= priority);

            if !better && !(expired && peer_waiting) {
                let slot = &mut state.cores[core];
                slot.need_resched = false;
                if expired {
                    slot.ticks_used = 0;
                    trace!(pid, core, "Quantum renewed");
                }
                return Ok(Some(pid));
            }

            // Fresh arrival stamp: the preempted process goes behind its peers
            state.cores[core].current = None;
            state.enqueue(pid);
            self.stats.inc_preemptions();
            debug!(pid, core, expired, better, "Process preempted");
        }

        Ok(self.dispatch_next(state, core, before.current))
    }

    /// Pop the best runnable process onto an empty `core`
    fn dispatch_next(
        &self,
        state: &mut SchedState,
        core: CoreId,
        previous: Option<Pid>,
    ) -> Option<Pid> {
        state.cores[core].need_resched = false;
        state.cores[core].ticks_used = 0;

        let Some((pid, handle)) = state.queue.pop_highest() else {
            trace!(core, "Core idle");
            return None;
        };

        let pcb = match state.table.lookup_mut(pid) {
            Ok(pcb) => pcb,
            Err(_) => invariant_violation("ready queue holds a pid missing from the process table"),
        };
        if pcb.state != ProcessState::Runnable || pcb.queue_position != Some(handle) {
            invariant_violation("ready queue entry disagrees with its PCB");
        }
        pcb.state = ProcessState::Running;
        pcb.queue_position = None;
        pcb.core = Some(core);
        pcb.dispatches += 1;
        let priority = pcb.priority;

        state.cores[core].current = Some(pid);
        // A preempted process went back into the queue and may beat other cores
        state.flag_preemptions();

        self.stats.inc_scheduled();
        if slot_changed(previous, pid) {
            self.stats.inc_context_switches();
        }

        debug!(pid, core, priority, "Scheduled process");
        Some(pid)
    }

    /// Timer interrupt on `core`. Returns whether a resched is pending.
    pub fn tick(&self, core: CoreId) -> SchedulerResult<bool> {
        let mut state = self.state.lock();
        let quantum = self.config.quantum_ticks;
        let queued = !state.queue.is_empty();
        let slot = state.slot(core)?.clone();

        match slot.current {
            Some(pid) => {
                state.running_pcb(core, pid);
                if let Ok(pcb) = state.table.lookup_mut(pid) {
                    pcb.ticks_run += 1;
                }
                let slot = &mut state.cores[core];
                slot.ticks_used = slot.ticks_used.saturating_add(1);
                if slot.ticks_used >= quantum {
                    slot.need_resched = true;
                }
            }
            None if queued => state.cores[core].need_resched = true,
            None => {}
        }

        Ok(state.cores[core].need_resched)
    }

    /// Voluntarily give up the core, then dispatch
    pub fn yield_now(&self, core: CoreId) -> SchedulerResult<Option<Pid>> {
        let mut state = self.state.lock();
        let previous = state.slot(core)?.current;
        if let Some(pid) = previous {
            state.running_pcb(core, pid);
            state.cores[core].current = None;
            state.enqueue(pid);
            debug!(pid, core, "Process yielded voluntarily");
        }
        Ok(self.dispatch_next(&mut state, core, previous))
    }

    /// Park the process running on `core` until `wake`
    pub fn block(&self, core: CoreId) -> SchedulerResult<Pid> {
        let mut state = self.state.lock();
        let pid = state
            .slot(core)?
            .current
            .ok_or(SchedulerError::NoRunningProcess(core))?;
        state.running_pcb(core, pid);

        if let Ok(pcb) = state.table.lookup_mut(pid) {
            pcb.state = ProcessState::Blocked;
            pcb.core = None;
        }
        let slot = &mut state.cores[core];
        slot.current = None;
        slot.need_resched = true;

        debug!(pid, core, "Process blocked");
        Ok(pid)
    }

    /// Make a blocked process runnable again
    pub fn wake(&self, pid: Pid) -> SchedulerResult<()> {
        let mut state = self.state.lock();
        let pcb = state.table.lookup(pid)?;
        match pcb.state {
            ProcessState::Blocked => {}
            ProcessState::Zombie => return Err(SchedulerError::NoSuchProcess(pid as i64)),
            other => return Err(SchedulerError::InvalidState { pid, state: other }),
        }

        state.enqueue(pid);
        state.flag_preemptions();
        debug!(pid, "Process woken");
        Ok(())
    }

    /// Terminate the process running on `core`
    pub fn exit(&self, core: CoreId, code: ExitCode) -> SchedulerResult<Pid> {
        let mut state = self.state.lock();
        let pid = state
            .slot(core)?
            .current
            .ok_or(SchedulerError::NoRunningProcess(core))?;
        state.running_pcb(core, pid);

        let slot = &mut state.cores[core];
        slot.current = None;
        slot.need_resched = true;
        make_zombie(&mut state, pid, code);
        drop(state);

        self.stats.dec_active();
        info!(pid, core, code, "Process exited");
        Ok(pid)
    }

    /// Terminate any live process, wherever it is
    pub fn kill(&self, pid: Pid, code: ExitCode) -> SchedulerResult<()> {
        let mut state = self.state.lock();
        let pcb = state.table.lookup(pid)?;
        let (pcb_state, handle, core) = (pcb.state, pcb.queue_position, pcb.core);

        match pcb_state {
            ProcessState::Zombie => return Err(SchedulerError::NoSuchProcess(pid as i64)),
            ProcessState::Runnable => {
                let removed = handle.and_then(|handle| state.queue.remove(handle));
                if removed != Some(pid) {
                    invariant_violation("runnable process missing from the ready queue");
                }
            }
            ProcessState::Running => {
                let core = match core {
                    Some(core) => core,
                    None => invariant_violation("running process without a core"),
                };
                let slot = state.slot_mut(core)?;
                slot.current = None;
                slot.need_resched = true;
            }
            ProcessState::Blocked => {}
        }

        make_zombie(&mut state, pid, code);
        drop(state);

        self.stats.dec_active();
        info!(pid, code, "Process killed");
        Ok(())
    }

    /// Remove a zombie from the table, returning its exit code
    pub fn reap(&self, pid: Pid) -> SchedulerResult<ExitCode> {
        let mut state = self.state.lock();
        let pcb = state.table.lookup(pid)?;
        if pcb.state != ProcessState::Zombie {
            return Err(SchedulerError::InvalidState {
                pid,
                state: pcb.state,
            });
        }

        let pcb = state.table.remove(pid)?;
        debug!(pid, "Process reaped");
        Ok(pcb.exit_code.unwrap_or_default())
    }

    /// Process running on `core`
    pub fn current(&self, core: CoreId) -> SchedulerResult<Option<Pid>> {
        Ok(self.state.lock().slot(core)?.current)
    }

    /// Whether `core` must reach a scheduling point
    pub fn needs_resched(&self, core: CoreId) -> SchedulerResult<bool> {
        Ok(self.state.lock().slot(core)?.need_resched)
    }

    /// Copy of a process control block
    pub fn process(&self, pid: Pid) -> Option<Pcb> {
        self.state.lock().table.lookup(pid).ok().cloned()
    }

    /// Best queued candidate, without dequeuing it
    pub fn peek_highest(&self) -> Option<(Pid, Priority)> {
        self.state.lock().queue.peek_highest()
    }

    /// Number of live processes (runnable, running or blocked)
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .table
            .iter()
            .filter(|pcb| pcb.state.is_live())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued processes
    pub fn runnable(&self) -> usize {
        self.state.lock().queue.len()
    }
}

#[inline]
fn slot_changed(previous: Option<Pid>, next: Pid) -> bool {
    previous != Some(next)
}

fn make_zombie(state: &mut SchedState, pid: Pid, code: ExitCode) {
    if let Ok(pcb) = state.table.lookup_mut(pid) {
        pcb.state = ProcessState::Zombie;
        pcb.queue_position = None;
        pcb.core = None;
        pcb.exit_code = Some(code);
    }
}
