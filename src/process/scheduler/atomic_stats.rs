/*!
 * Lock-Free Scheduler Statistics
 * Uses atomic counters for zero-contention stats tracking in hot scheduling paths
 */

use crate::process::types::SchedulerStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering for maximum performance
/// - Read-only snapshot requires no synchronization
#[repr(C, align(64))]
pub struct AtomicSchedulerStats {
    total_scheduled: AtomicU64,
    context_switches: AtomicU64,
    preemptions: AtomicU64,
    priority_changes: AtomicU64,
    active_processes: AtomicUsize,
    quantum_ticks: u32,
}

impl AtomicSchedulerStats {
    #[inline]
    pub fn new(quantum_ticks: u32) -> Self {
        Self {
            total_scheduled: AtomicU64::new(0),
            context_switches: AtomicU64::new(0),
            preemptions: AtomicU64::new(0),
            priority_changes: AtomicU64::new(0),
            active_processes: AtomicUsize::new(0),
            quantum_ticks,
        }
    }

    /// Hot path - called on every dispatch
    #[inline(always)]
    pub fn inc_scheduled(&self) {
        self.total_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_priority_changes(&self) {
        self.priority_changes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_active(&self) {
        self.active_processes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn dec_active(&self) {
        self.active_processes.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Counter values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate. This is acceptable for monitoring.
    #[inline]
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            total_scheduled: self.total_scheduled.load(Ordering::Relaxed),
            context_switches: self.context_switches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            priority_changes: self.priority_changes.load(Ordering::Relaxed),
            active_processes: self.active_processes.load(Ordering::Relaxed),
            quantum_ticks: self.quantum_ticks,
        }
    }
}
