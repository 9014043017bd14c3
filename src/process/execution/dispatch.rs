/*!
 * Dispatch Loop
 *
 * Per-core driver that turns scheduler decisions into context switches
 * and runs the chosen process one slice at a time.
 */

use crate::core::errors::SchedulerResult;
use crate::core::types::{CoreId, ExitCode, Pid};
use crate::process::scheduler::Scheduler;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a process did with its slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Still computing, keep it on the core
    Continue,
    /// Gave the core up voluntarily
    Yield,
    /// Waiting for an event
    Block,
    /// Finished with an exit code
    Exit(ExitCode),
}

/// Executes process code on behalf of a dispatch loop
pub trait Executor: Send + Sync {
    /// Transfer the core from `from` to `to`
    fn switch_to(&self, core: CoreId, from: Option<Pid>, to: Option<Pid>);

    /// Run `pid` for one slice
    fn run_slice(&self, core: CoreId, pid: Pid) -> RunOutcome;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn switch_to(&self, core: CoreId, from: Option<Pid>, to: Option<Pid>) {
        (**self).switch_to(core, from, to)
    }

    fn run_slice(&self, core: CoreId, pid: Pid) -> RunOutcome {
        (**self).run_slice(core, pid)
    }
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub running: Option<Pid>,
    pub switched: bool,
    pub outcome: Option<RunOutcome>,
}

/// One dispatch loop per core.
///
/// Creating a loop claims its core and dropping it releases the claim, so
/// two loops can never drive the same core. `step` takes `&mut self`,
/// which keeps a single loop from re-entering itself.
pub struct DispatchLoop<E: Executor> {
    scheduler: Scheduler,
    executor: E,
    core: CoreId,
    running: Option<Pid>,
}

impl<E: Executor> DispatchLoop<E> {
    pub fn new(scheduler: Scheduler, core: CoreId, executor: E) -> SchedulerResult<Self> {
        scheduler.claim_core(core)?;
        debug!(core, "Dispatch loop attached");
        Ok(Self {
            scheduler,
            executor,
            core,
            running: None,
        })
    }

    pub fn core(&self) -> CoreId {
        self.core
    }

    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// One timer period: tick, dispatch if needed, run one slice
    pub fn step(&mut self) -> SchedulerResult<StepReport> {
        let core = self.core;
        let resched = self.scheduler.tick(core)?;

        let next = if resched || self.running.is_none() {
            self.scheduler.schedule(core)?
        } else {
            self.scheduler.current(core)?
        };

        let switched = next != self.running;
        if switched {
            trace!(core, from = ?self.running, to = ?next, "Context switch");
            self.executor.switch_to(core, self.running, next);
            self.running = next;
        }

        let Some(pid) = next else {
            return Ok(StepReport {
                running: None,
                switched,
                outcome: None,
            });
        };

        let outcome = self.executor.run_slice(core, pid);
        match outcome {
            RunOutcome::Continue => {}
            RunOutcome::Yield => {
                let after = self.scheduler.yield_now(core)?;
                if after != Some(pid) {
                    self.executor.switch_to(core, Some(pid), after);
                }
                self.running = after;
            }
            RunOutcome::Block => {
                self.scheduler.block(core)?;
                self.running = None;
            }
            RunOutcome::Exit(code) => {
                self.scheduler.exit(core, code)?;
                self.running = None;
            }
        }

        Ok(StepReport {
            running: self.running,
            switched,
            outcome: Some(outcome),
        })
    }

    /// Step until the core goes idle or `max_steps` is reached
    pub fn run_until_idle(&mut self, max_steps: usize) -> SchedulerResult<usize> {
        for step in 0..max_steps {
            let report = self.step()?;
            if report.running.is_none() && report.outcome.is_none() {
                return Ok(step);
            }
        }
        Ok(max_steps)
    }
}

impl<E: Executor> Drop for DispatchLoop<E> {
    fn drop(&mut self) {
        self.scheduler.release_core(self.core);
        debug!(core = self.core, "Dispatch loop detached");
    }
}
