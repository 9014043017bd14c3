/*!
 * Process Module
 * Process table, ready queue, scheduler core and dispatch
 */

pub mod execution;
pub mod priority;
pub mod scheduler;
pub mod scheduler_task;
pub mod table;
pub mod types;

pub use execution::{DispatchLoop, Executor, RunOutcome, StepReport};
pub use priority::{OwnerOrRoot, PermitAll, PriorityPolicy, PriorityService};
pub use scheduler::queue::ReadyQueue;
pub use scheduler::Scheduler;
pub use scheduler_task::{DispatchCommand, DispatchTask};
pub use table::ProcessTable;
pub use types::{Pcb, QueueHandle, SchedulerSnapshot, SchedulerStats};
