/*!
 * Program Runner
 * Executor that runs simulated user programs inside dispatch loops
 */

use super::pi::{Pi, PiStep};
use super::set;
use crate::core::types::{CoreId, Pid};
use crate::process::execution::{Executor, RunOutcome};
use crate::process::priority::PriorityService;
use crate::syscalls::SyscallContext;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A loaded user program
#[derive(Debug, Clone)]
pub enum Program {
    Pi(Pi),
    Set(Vec<String>),
}

/// Console line written by a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub pid: Pid,
    pub stderr: bool,
    pub text: String,
}

/// Runs programs registered per pid
pub struct ProgramRunner {
    service: PriorityService,
    programs: Mutex<HashMap<Pid, Program, RandomState>>,
    console: Mutex<Vec<ConsoleLine>>,
}

impl ProgramRunner {
    pub fn new(service: PriorityService) -> Self {
        Self {
            service,
            programs: Mutex::new(HashMap::with_hasher(RandomState::new())),
            console: Mutex::new(Vec::new()),
        }
    }

    /// Bind `program` to an already spawned `pid`
    pub fn load(&self, pid: Pid, program: Program) {
        self.programs.lock().insert(pid, program);
    }

    /// Drop the program bound to `pid`, if any
    pub fn unload(&self, pid: Pid) -> Option<Program> {
        self.programs.lock().remove(&pid)
    }

    /// Drop programs whose process was killed or reaped before finishing.
    /// Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let scheduler = self.service.scheduler();
        let mut programs = self.programs.lock();
        let before = programs.len();
        programs.retain(|pid, _| {
            scheduler
                .process(*pid)
                .is_some_and(|pcb| pcb.state.is_live())
        });
        let dropped = before - programs.len();
        if dropped > 0 {
            debug!(dropped, "Pruned programs of dead processes");
        }
        dropped
    }

    /// Number of programs still bound to a pid
    pub fn loaded(&self) -> usize {
        self.programs.lock().len()
    }

    /// Everything written so far
    pub fn console(&self) -> Vec<ConsoleLine> {
        self.console.lock().clone()
    }

    fn write(&self, pid: Pid, stderr: bool, text: &str) {
        for line in text.lines() {
            self.console.lock().push(ConsoleLine {
                pid,
                stderr,
                text: line.to_string(),
            });
        }
    }
}

impl Executor for ProgramRunner {
    fn switch_to(&self, _core: CoreId, _from: Option<Pid>, _to: Option<Pid>) {}

    fn run_slice(&self, core: CoreId, pid: Pid) -> RunOutcome {
        // Take the program out so no lock is held while it runs
        let Some(program) = self.programs.lock().remove(&pid) else {
            warn!(pid, "No program loaded, terminating process");
            return RunOutcome::Exit(-1);
        };

        match program {
            Program::Pi(mut pi) => match pi.run_slice(pid) {
                PiStep::Running { .. } => {
                    self.programs.lock().insert(pid, Program::Pi(pi));
                    RunOutcome::Continue
                }
                PiStep::Finished { code, message } => {
                    info!(pid, "{}", message);
                    self.write(pid, false, &message);
                    RunOutcome::Exit(code)
                }
            },
            Program::Set(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let ctx = SyscallContext::new(self.service.clone(), core);
                let mut stderr = Vec::new();
                let status = set::main(&args, &ctx, &mut stderr);
                self.write(pid, true, &String::from_utf8_lossy(&stderr));
                RunOutcome::Exit(status)
            }
        }
    }
}
