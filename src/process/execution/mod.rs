/*!
 * Process Execution
 * Dispatch loops and the executor seam they drive
 */

mod dispatch;

pub use dispatch::{DispatchLoop, Executor, RunOutcome, StepReport};
