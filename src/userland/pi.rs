/*!
 * pi - CPU-bound workload
 *
 * Burns a fixed amount of CPU in slices, then reports its pid and exits 0.
 */

use crate::core::types::{ExitCode, Pid};
use std::hint::black_box;

/// Default total work, in loop iterations
pub const DEFAULT_ITERATIONS: u64 = 2_000_000;

/// Default work per dispatch slice
pub const DEFAULT_SLICE: u64 = 100_000;

/// Progress of one slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PiStep {
    Running { remaining: u64 },
    Finished { code: ExitCode, message: String },
}

#[derive(Debug, Clone)]
pub struct Pi {
    remaining: u64,
    per_slice: u64,
}

impl Pi {
    pub fn new(iterations: u64, per_slice: u64) -> Self {
        Self {
            remaining: iterations,
            per_slice: per_slice.max(1),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Spin for one slice
    pub fn run_slice(&mut self, pid: Pid) -> PiStep {
        let work = self.per_slice.min(self.remaining);
        let mut acc = 0u64;
        for i in 0..work {
            acc = black_box(acc.wrapping_add(i));
        }
        black_box(acc);
        self.remaining -= work;

        if self.remaining == 0 {
            PiStep::Finished {
                code: 0,
                message: format!("pi finished for pid {}", pid),
            }
        } else {
            PiStep::Running {
                remaining: self.remaining,
            }
        }
    }
}

impl Default for Pi {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS, DEFAULT_SLICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_finishes_after_expected_slices() {
        let mut pi = Pi::new(250, 100);
        assert_eq!(pi.run_slice(4), PiStep::Running { remaining: 150 });
        assert_eq!(pi.run_slice(4), PiStep::Running { remaining: 50 });
        assert_eq!(
            pi.run_slice(4),
            PiStep::Finished {
                code: 0,
                message: "pi finished for pid 4".to_string()
            }
        );
    }

    #[test]
    fn test_zero_slice_still_progresses() {
        let mut pi = Pi::new(2, 0);
        assert!(matches!(pi.run_slice(1), PiStep::Running { remaining: 1 }));
        assert!(matches!(pi.run_slice(1), PiStep::Finished { .. }));
    }
}
