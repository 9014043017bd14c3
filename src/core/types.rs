/*!
 * Core Types
 * Common types used across the kernel
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID type
pub type Pid = u32;

/// Priority level (lower value runs first)
pub type Priority = u8;

/// Execution core index
pub type CoreId = usize;

/// Monotonic arrival stamp used to order equal-priority processes
pub type ArrivalSeq = u64;

/// Exit status reported by a terminated process
pub type ExitCode = i32;

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Waiting in the ready queue
    Runnable,
    /// Currently executing on a core
    Running,
    /// Waiting for an external event
    Blocked,
    /// Exited, waiting to be reaped
    Zombie,
}

impl ProcessState {
    /// Zombies are no longer considered live
    #[inline(always)]
    pub const fn is_live(&self) -> bool {
        !matches!(self, Self::Zombie)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Runnable => "runnable",
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Zombie => "zombie",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
