/*!
 * Scheduler Syscalls
 * `set` and `getpid` across the user/kernel boundary
 */

use super::traits::SchedulerSyscalls;
use crate::core::limits::{ESRCH, ROOT_PID};
use crate::core::types::{CoreId, Pid};
use crate::process::priority::PriorityService;
use tracing::{debug, instrument};

/// `set(pid, priority)`: 0 on success, negative errno on failure
#[instrument(skip(service), level = "debug")]
pub fn sys_set(service: &PriorityService, caller: Pid, pid: i32, priority: i32) -> i32 {
    match service.request_priority_change(caller, pid as i64, priority as i64) {
        Ok(()) => 0,
        Err(err) => {
            let errno = err.errno();
            debug!(errno, "set failed");
            errno
        }
    }
}

/// Pid running on `core`, or `-ESRCH` when idle
pub fn sys_getpid(service: &PriorityService, core: CoreId) -> i32 {
    match service.scheduler().current(core) {
        Ok(Some(pid)) => i32::try_from(pid).unwrap_or(-ESRCH),
        _ => -ESRCH,
    }
}

/// Syscall entry bound to one core: the caller is whatever runs there
#[derive(Clone)]
pub struct SyscallContext {
    service: PriorityService,
    core: CoreId,
}

impl SyscallContext {
    pub fn new(service: PriorityService, core: CoreId) -> Self {
        Self { service, core }
    }

    /// Calling process, or the root process when the core is in kernel context
    fn caller(&self) -> Pid {
        self.service
            .scheduler()
            .current(self.core)
            .ok()
            .flatten()
            .unwrap_or(ROOT_PID)
    }
}

impl SchedulerSyscalls for SyscallContext {
    fn set(&self, pid: i32, priority: i32) -> i32 {
        sys_set(&self.service, self.caller(), pid, priority)
    }

    fn getpid(&self) -> i32 {
        sys_getpid(&self.service, self.core)
    }
}
