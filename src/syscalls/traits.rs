/*!
 * Scheduler Syscall Traits
 * Interface user programs see for scheduler operations
 */

/// Scheduler syscalls, C-style: non-negative on success, negative errno on failure
pub trait SchedulerSyscalls: Send + Sync {
    /// Change the priority of `pid`
    fn set(&self, pid: i32, priority: i32) -> i32;

    /// Pid of the calling process
    fn getpid(&self) -> i32;
}
