/*!
 * Dispatch Task - Timer-Driven Dispatch Loop
 *
 * Runs a per-core dispatch loop on a background task. Each interval tick
 * stands in for a timer interrupt on that core.
 */

use super::execution::{DispatchLoop, Executor};
use crate::core::types::CoreId;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// Control messages for the dispatch task
#[derive(Debug, Clone)]
pub enum DispatchCommand {
    /// Stop stepping on timer ticks
    Pause,
    /// Resume stepping on timer ticks
    Resume,
    /// Run one step immediately
    Trigger,
    /// Shutdown the dispatch task
    Shutdown,
}

/// Handle to a background dispatch loop
pub struct DispatchTask {
    core: CoreId,
    command_tx: mpsc::UnboundedSender<DispatchCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl DispatchTask {
    /// Spawn `dispatch` on the runtime, stepping once per `interval`
    pub fn spawn<E: Executor + 'static>(dispatch: DispatchLoop<E>, interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let core = dispatch.core();

        let handle = tokio::spawn(async move {
            run_dispatch_loop(dispatch, interval, command_rx).await;
        });

        info!(core, ?interval, "Dispatch task spawned");

        Self {
            core,
            command_tx,
            handle: Some(handle),
        }
    }

    pub fn core(&self) -> CoreId {
        self.core
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(DispatchCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(DispatchCommand::Resume);
    }

    pub fn trigger(&self) {
        let _ = self.command_tx.send(DispatchCommand::Trigger);
    }

    /// Whether the loop stopped, by shutdown or by halting its core
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Shutdown the dispatch task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(DispatchCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(core = self.core, error = %e, "Dispatch task shutdown error");
            } else {
                info!(core = self.core, "Dispatch task shutdown complete");
            }
        }
    }
}

async fn run_dispatch_loop<E: Executor>(
    mut dispatch: DispatchLoop<E>,
    period: Duration,
    mut command_rx: mpsc::UnboundedReceiver<DispatchCommand>,
) {
    let core = dispatch.core();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut active = true;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if active {
                    step(&mut dispatch, core);
                }
            }

            Some(cmd) = command_rx.recv() => {
                match cmd {
                    DispatchCommand::Pause => {
                        info!(core, "Dispatch task paused");
                        active = false;
                    }
                    DispatchCommand::Resume => {
                        info!(core, "Dispatch task resumed");
                        active = true;
                    }
                    DispatchCommand::Trigger => {
                        trace!(core, "Manual dispatch trigger");
                        step(&mut dispatch, core);
                    }
                    DispatchCommand::Shutdown => {
                        info!(core, "Dispatch task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

fn step<E: Executor>(dispatch: &mut DispatchLoop<E>, core: CoreId) {
    match dispatch.step() {
        Ok(report) => {
            if let Some(pid) = report.running {
                trace!(core, pid, "Dispatch tick");
            }
        }
        Err(e) => warn!(core, error = %e, "Dispatch step failed"),
    }
}

impl Drop for DispatchTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(DispatchCommand::Shutdown);
        }
    }
}
