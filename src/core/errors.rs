/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::limits::{EINVAL, EPERM, ESRCH, MAX_PRIO, MIN_PRIO};
use super::types::{CoreId, Pid, ProcessState};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Priority {0} out of range [{min}, {max}]", min = MIN_PRIO, max = MAX_PRIO)]
    #[diagnostic(
        code(scheduler::invalid_priority),
        help("Lower values run first. Pick a value inside the configured range.")
    )]
    InvalidPriority(i64),

    #[error("No such process: {0}")]
    #[diagnostic(
        code(scheduler::no_such_process),
        help("The process may have exited or never existed. Check PID validity.")
    )]
    NoSuchProcess(i64),

    #[error("Process {caller} may not change the priority of process {target}")]
    #[diagnostic(
        code(scheduler::permission_denied),
        help("Only the process itself, its parent, or the root process may do this.")
    )]
    PermissionDenied { caller: Pid, target: Pid },

    #[error("Process {pid} is {state}, operation not allowed")]
    #[diagnostic(
        code(scheduler::invalid_state),
        help("Operation cannot be performed in current process state.")
    )]
    InvalidState { pid: Pid, state: ProcessState },

    #[error("Core {0} does not exist")]
    #[diagnostic(code(scheduler::core_out_of_range))]
    CoreOutOfRange(CoreId),

    #[error("Core {0} already has a dispatch loop")]
    #[diagnostic(
        code(scheduler::core_busy),
        help("Drop the existing dispatch loop before creating another one for this core.")
    )]
    CoreBusy(CoreId),

    #[error("No process running on core {0}")]
    #[diagnostic(code(scheduler::no_running_process))]
    NoRunningProcess(CoreId),
}

impl SchedulerError {
    /// Negative errno surfaced across the syscall boundary
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidPriority(_) => -EINVAL,
            Self::NoSuchProcess(_) | Self::NoRunningProcess(_) => -ESRCH,
            Self::PermissionDenied { .. } => -EPERM,
            Self::InvalidState { .. } | Self::CoreOutOfRange(_) | Self::CoreBusy(_) => -EINVAL,
        }
    }
}

/// Scheduler-internal corruption.
///
/// Kept apart from `SchedulerError` so it can never reach the syscall
/// boundary. `Scheduler::verify` reports it for diagnostics and
/// `invariant_violation` raises it as a panic.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[error("Scheduler invariant violated: {0}")]
#[diagnostic(
    code(scheduler::invariant_violation),
    help("Scheduler state is corrupted. Please report this issue.")
)]
pub struct InvariantViolation(pub String);

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: &'static str, value: String },

    #[error("Configuration out of range: {0}")]
    #[diagnostic(
        code(config::out_of_range),
        help("Review the scheduler configuration parameters.")
    )]
    OutOfRange(String),
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Halt the calling core after the scheduler detected corrupted state.
///
/// Never returned as an error value: continuing would spread the corruption.
#[cold]
#[track_caller]
pub fn invariant_violation(msg: &str) -> ! {
    let err = InvariantViolation(msg.to_string());
    tracing::error!(error = %err, "halting core");
    panic!("{}", err);
}
