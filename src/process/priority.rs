/*!
 * Priority Update Service
 * Validates and applies external priority-change requests
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::limits::{priority_in_range, ROOT_PID};
use crate::core::types::{Pid, Priority};
use crate::process::scheduler::Scheduler;
use crate::process::types::Pcb;
use std::sync::Arc;
use tracing::warn;

/// Decides whether `caller` may retarget `target`
pub trait PriorityPolicy: Send + Sync {
    fn authorize(&self, caller: Pid, target: &Pcb) -> SchedulerResult<()>;
}

/// Any caller may retarget any process
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl PriorityPolicy for PermitAll {
    fn authorize(&self, _caller: Pid, _target: &Pcb) -> SchedulerResult<()> {
        Ok(())
    }
}

/// Only the target itself, its parent, or the root process
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrRoot;

impl PriorityPolicy for OwnerOrRoot {
    fn authorize(&self, caller: Pid, target: &Pcb) -> SchedulerResult<()> {
        if caller == ROOT_PID || caller == target.pid || target.parent == Some(caller) {
            Ok(())
        } else {
            Err(SchedulerError::PermissionDenied {
                caller,
                target: target.pid,
            })
        }
    }
}

/// Kernel-side counterpart of the `set` control client
#[derive(Clone)]
pub struct PriorityService {
    scheduler: Scheduler,
    policy: Arc<dyn PriorityPolicy>,
}

impl PriorityService {
    /// Permissive service
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_policy(scheduler, Arc::new(PermitAll))
    }

    pub fn with_policy(scheduler: Scheduler, policy: Arc<dyn PriorityPolicy>) -> Self {
        Self { scheduler, policy }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Change the priority of `pid` on behalf of `caller`.
    ///
    /// Checks run in order: priority range, pid liveness, authorization.
    /// They share one lock acquisition with the mutation, so a target that
    /// exits concurrently yields `NoSuchProcess` and a failed request
    /// leaves all state unchanged.
    pub fn request_priority_change(
        &self,
        caller: Pid,
        pid: i64,
        new_priority: i64,
    ) -> SchedulerResult<()> {
        let result = self.apply(caller, pid, new_priority);
        if let Err(ref err) = result {
            warn!(caller, pid, new_priority, error = %err, "Priority change rejected");
        }
        result
    }

    fn apply(&self, caller: Pid, pid: i64, new_priority: i64) -> SchedulerResult<()> {
        let priority = validate_priority(new_priority)?;

        self.scheduler.with_state(|state| {
            let target = Pid::try_from(pid)
                .ok()
                .filter(|pid| *pid > 0)
                .ok_or(SchedulerError::NoSuchProcess(pid))?;

            let pcb = state
                .table
                .lookup(target)
                .ok()
                .filter(|pcb| pcb.state.is_live())
                .ok_or(SchedulerError::NoSuchProcess(pid))?;

            self.policy.authorize(caller, pcb)?;
            self.scheduler.apply_priority(state, target, priority)?;
            Ok(())
        })
    }
}

/// Range-check a caller-supplied priority
pub fn validate_priority(raw: i64) -> SchedulerResult<Priority> {
    if !priority_in_range(raw) {
        return Err(SchedulerError::InvalidPriority(raw));
    }
    Priority::try_from(raw).map_err(|_| SchedulerError::InvalidPriority(raw))
}
