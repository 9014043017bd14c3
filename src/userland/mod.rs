/*!
 * Userland
 * Simulated user programs that exercise the scheduler
 */

pub mod pi;
pub mod runner;
pub mod set;

pub use pi::Pi;
pub use runner::{ConsoleLine, Program, ProgramRunner};
