/*!
 * Syscalls Module
 * User/kernel boundary for the scheduler
 */

pub mod scheduler;
pub mod traits;

pub use scheduler::{sys_getpid, sys_set, SyscallContext};
pub use traits::SchedulerSyscalls;
