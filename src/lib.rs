/*!
 * Priority Kernel Library
 * Priority-aware scheduling core exposed as a library
 */

pub mod config;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod syscalls;
pub mod userland;

// Re-exports
pub use config::SchedulerConfig;
pub use crate::core::errors::{ConfigError, InvariantViolation, SchedulerError, SchedulerResult};
pub use crate::core::limits::{DEFAULT_PRIO, MAX_PRIO, MIN_PRIO};
pub use crate::core::types::{CoreId, ExitCode, Pid, Priority, ProcessState};
pub use monitoring::init_tracing;
pub use process::{
    DispatchLoop, DispatchTask, Executor, OwnerOrRoot, Pcb, PermitAll, PriorityPolicy,
    PriorityService, ReadyQueue, RunOutcome, Scheduler, SchedulerSnapshot, SchedulerStats,
};
pub use syscalls::{sys_getpid, sys_set, SchedulerSyscalls, SyscallContext};
