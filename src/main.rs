/*!
 * Priority Kernel - Main Entry Point
 *
 * Boots the scheduler, starts one dispatch loop per core, runs a handful
 * of `pi` workloads and retargets one of them with `set`.
 */

use anyhow::Context;
use prio_kernel::userland::{Pi, Program, ProgramRunner};
use prio_kernel::{
    init_tracing, DispatchLoop, DispatchTask, PriorityService, Scheduler, SchedulerConfig,
    MIN_PRIO,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const WORKLOADS: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Priority kernel starting...");

    let config = SchedulerConfig::from_env().context("invalid scheduler configuration")?;
    let tick = config.tick_interval;
    let cores = config.cores;
    let scheduler = Scheduler::new(config).context("failed to initialize scheduler")?;
    let service = PriorityService::new(scheduler.clone());
    let runner = Arc::new(ProgramRunner::new(service));

    let mut workloads = Vec::with_capacity(WORKLOADS);
    for _ in 0..WORKLOADS {
        let pid = scheduler.spawn("pi", None)?;
        runner.load(pid, Program::Pi(Pi::default()));
        workloads.push(pid);
    }

    // Boost the youngest workload ahead of its siblings
    if let Some(&target) = workloads.last() {
        let setter = scheduler.spawn("set", Some(MIN_PRIO))?;
        runner.load(
            setter,
            Program::Set(vec![
                "set".to_string(),
                target.to_string(),
                (MIN_PRIO + 1).to_string(),
            ]),
        );
        workloads.push(setter);
    }

    let mut tasks = Vec::with_capacity(cores);
    for core in 0..cores {
        let dispatch = DispatchLoop::new(scheduler.clone(), core, Arc::clone(&runner))?;
        tasks.push(DispatchTask::spawn(dispatch, tick));
    }

    info!(cores, processes = workloads.len(), "Kernel initialization complete");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(10)) => {
                if scheduler.is_empty() {
                    break;
                }
                if tasks.iter().any(DispatchTask::is_finished) {
                    warn!("Dispatch loop halted, shutting down");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    for task in tasks {
        task.shutdown().await;
    }

    for pid in workloads {
        match scheduler.reap(pid) {
            Ok(code) => info!(pid, code, "Reaped"),
            Err(e) => warn!(pid, error = %e, "Not reaped"),
        }
    }

    let dropped = runner.prune();
    if dropped > 0 {
        warn!(dropped, "Programs left unfinished");
    }

    for line in runner.console() {
        if line.stderr {
            eprintln!("{}", line.text);
        } else {
            println!("{}", line.text);
        }
    }

    let stats = serde_json::to_string(&scheduler.stats()).context("failed to encode stats")?;
    info!(%stats, "Kernel stopped");
    Ok(())
}
