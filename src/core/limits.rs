/*!
 * System Limits and Constants
 *
 * Centralized location for scheduler-wide limits and defaults.
 */

use super::types::{Pid, Priority};
use std::time::Duration;

// =============================================================================
// PRIORITY RANGE
// =============================================================================

/// Best priority value. Lower numbers are dispatched first.
pub const MIN_PRIO: Priority = 0;

/// Worst priority value
pub const MAX_PRIO: Priority = 20;

/// Priority assigned to new processes when none is requested
pub const DEFAULT_PRIO: Priority = 10;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Timer ticks a process may run before a scheduling point is forced
pub const DEFAULT_QUANTUM_TICKS: u32 = 5;

/// Wall-clock length of one simulated timer tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Number of execution cores when not configured
pub const DEFAULT_CORES: usize = 1;

/// Upper bound on configurable cores
pub const MAX_CORES: usize = 64;

// =============================================================================
// PROCESS IDS
// =============================================================================

/// First pid handed out by a fresh scheduler
pub const FIRST_PID: Pid = 1;

/// Pid allowed to retarget any process under restrictive policies
pub const ROOT_PID: Pid = 1;

// =============================================================================
// SYSCALL ERRNO VALUES
// =============================================================================

/// Operation not permitted
pub const EPERM: i32 = 1;

/// No such process
pub const ESRCH: i32 = 3;

/// Invalid argument
pub const EINVAL: i32 = 22;

/// Check a raw integer against the priority range
#[inline]
pub fn priority_in_range(raw: i64) -> bool {
    (MIN_PRIO as i64..=MAX_PRIO as i64).contains(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_bounds() {
        assert!(priority_in_range(MIN_PRIO as i64));
        assert!(priority_in_range(MAX_PRIO as i64));
        assert!(!priority_in_range(MIN_PRIO as i64 - 1));
        assert!(!priority_in_range(MAX_PRIO as i64 + 1));
        assert!(priority_in_range(DEFAULT_PRIO as i64));
    }
}
