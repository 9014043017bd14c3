/*!
 * Priority Update Tests
 * External priority changes, preemption and state preservation
 */

use pretty_assertions::assert_eq;
use prio_kernel::{
    sys_set, OwnerOrRoot, Pid, PriorityService, ProcessState, Scheduler, SchedulerConfig,
    SchedulerError, MAX_PRIO, MIN_PRIO,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

fn setup() -> (Scheduler, PriorityService) {
    let scheduler = Scheduler::new(SchedulerConfig::new().with_quantum_ticks(100)).unwrap();
    let service = PriorityService::new(scheduler.clone());
    (scheduler, service)
}

#[test]
fn test_boost_queued_process_preempts_runner() {
    let (scheduler, service) = setup();

    let d = scheduler.spawn("d", Some(5)).unwrap();
    let e = scheduler.spawn("e", Some(10)).unwrap();
    assert_eq!(scheduler.schedule(0).unwrap(), Some(d));
    assert!(!scheduler.needs_resched(0).unwrap());

    service.request_priority_change(d, e as i64, 1).unwrap();

    assert!(scheduler.needs_resched(0).unwrap());
    assert_eq!(scheduler.schedule(0).unwrap(), Some(e));
    let d_pcb = scheduler.process(d).unwrap();
    assert_eq!(d_pcb.state, ProcessState::Runnable);
    assert_eq!(d_pcb.priority, 5);
    scheduler.verify().unwrap();
}

#[test]
fn test_demoting_runner_yields_to_waiting_process() {
    let (scheduler, service) = setup();

    let a = scheduler.spawn("a", Some(5)).unwrap();
    let b = scheduler.spawn("b", Some(8)).unwrap();
    assert_eq!(scheduler.schedule(0).unwrap(), Some(a));

    service.request_priority_change(a, a as i64, 10).unwrap();

    assert!(scheduler.needs_resched(0).unwrap());
    assert_eq!(scheduler.schedule(0).unwrap(), Some(b));
    assert_eq!(scheduler.process(a).unwrap().priority, 10);
}

#[test]
fn test_unknown_pid_leaves_state_untouched() {
    let (scheduler, service) = setup();

    scheduler.spawn("a", Some(4)).unwrap();
    scheduler.spawn("b", Some(9)).unwrap();
    scheduler.schedule(0).unwrap();
    let before = scheduler.snapshot();

    let err = service.request_priority_change(1, 999, 3).unwrap_err();
    assert_eq!(err, SchedulerError::NoSuchProcess(999));
    let err = service.request_priority_change(1, -4, 3).unwrap_err();
    assert_eq!(err, SchedulerError::NoSuchProcess(-4));

    assert_eq!(scheduler.snapshot(), before);
}

#[test]
fn test_invalid_priority_checked_before_pid() {
    let (scheduler, service) = setup();
    let before = scheduler.snapshot();

    let err = service.request_priority_change(1, 999, 50).unwrap_err();
    assert_eq!(err, SchedulerError::InvalidPriority(50));
    assert_eq!(scheduler.snapshot(), before);
}

#[test]
fn test_priority_boundaries() {
    let (scheduler, service) = setup();
    let pid = scheduler.spawn("edge", None).unwrap();

    service
        .request_priority_change(pid, pid as i64, MIN_PRIO as i64)
        .unwrap();
    assert_eq!(scheduler.process(pid).unwrap().priority, MIN_PRIO);

    service
        .request_priority_change(pid, pid as i64, MAX_PRIO as i64)
        .unwrap();
    assert_eq!(scheduler.process(pid).unwrap().priority, MAX_PRIO);

    let before = scheduler.snapshot();
    for bad in [MIN_PRIO as i64 - 1, MAX_PRIO as i64 + 1] {
        assert_eq!(
            service.request_priority_change(pid, pid as i64, bad),
            Err(SchedulerError::InvalidPriority(bad))
        );
    }
    assert_eq!(scheduler.snapshot(), before);
}

#[test]
fn test_repeated_update_is_idempotent() {
    let (scheduler, service) = setup();

    let a = scheduler.spawn("a", Some(9)).unwrap();
    scheduler.spawn("b", Some(4)).unwrap();

    service.request_priority_change(a, a as i64, 4).unwrap();
    let once = scheduler.snapshot();
    service.request_priority_change(a, a as i64, 4).unwrap();

    assert_eq!(scheduler.snapshot(), once);
    assert_eq!(scheduler.process(a).unwrap().priority, 4);
    assert_eq!(scheduler.stats().priority_changes, 1);
}

#[test]
fn test_same_value_update_is_noop() {
    let (scheduler, service) = setup();

    let a = scheduler.spawn("a", Some(6)).unwrap();
    scheduler.spawn("b", Some(6)).unwrap();
    let before = scheduler.snapshot();

    service.request_priority_change(a, a as i64, 6).unwrap();

    assert_eq!(scheduler.snapshot(), before);
    assert_eq!(scheduler.stats().priority_changes, 0);
}

#[test]
fn test_priority_changes_race_with_exits() {
    let scheduler = Scheduler::new(
        SchedulerConfig::new()
            .with_cores(2)
            .with_quantum_ticks(2),
    )
    .unwrap();
    let service = PriorityService::new(scheduler.clone());

    for _round in 0..50 {
        let pids: Vec<Pid> = (0..64u8)
            .map(|i| scheduler.spawn("p", Some(i % (MAX_PRIO + 1))).unwrap())
            .collect();

        let reaper = {
            let scheduler = scheduler.clone();
            let pids = pids.clone();
            thread::spawn(move || {
                for (i, pid) in pids.iter().enumerate() {
                    if i % 3 == 0 {
                        match scheduler.exit(i % 2, 0) {
                            Ok(_) | Err(SchedulerError::NoRunningProcess(_)) => {}
                            Err(e) => panic!("unexpected exit error: {}", e),
                        }
                    } else {
                        match scheduler.kill(*pid, -9) {
                            Ok(()) | Err(SchedulerError::NoSuchProcess(_)) => {}
                            Err(e) => panic!("unexpected kill error: {}", e),
                        }
                    }
                }
            })
        };

        let dispatcher = {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    for core in 0..2 {
                        scheduler.tick(core).unwrap();
                        scheduler.schedule(core).unwrap();
                    }
                }
            })
        };

        for (i, pid) in pids.iter().enumerate() {
            let priority = (i as i64 * 7) % (MAX_PRIO as i64 + 1);
            match service.request_priority_change(*pid, *pid as i64, priority) {
                Ok(()) | Err(SchedulerError::NoSuchProcess(_)) => {}
                Err(e) => panic!("unexpected priority change error: {}", e),
            }
        }

        reaper.join().unwrap();
        dispatcher.join().unwrap();
        scheduler.verify().unwrap();

        for pid in &pids {
            let _ = scheduler.kill(*pid, 0);
            scheduler.reap(*pid).unwrap();
        }
        assert!(scheduler.is_empty());
        scheduler.verify().unwrap();
    }
}

#[test]
fn test_relocation_keeps_arrival_order_among_peers() {
    let (scheduler, service) = setup();

    let early = scheduler.spawn("early", Some(9)).unwrap();
    let late = scheduler.spawn("late", Some(4)).unwrap();

    service.request_priority_change(early, early as i64, 4).unwrap();

    assert_eq!(scheduler.schedule(0).unwrap(), Some(early));
    scheduler.exit(0, 0).unwrap();
    assert_eq!(scheduler.schedule(0).unwrap(), Some(late));
}

#[test]
fn test_blocked_process_keeps_new_priority_on_wake() {
    let (scheduler, service) = setup();

    let pid = scheduler.spawn("sleeper", Some(12)).unwrap();
    scheduler.schedule(0).unwrap();
    scheduler.block(0).unwrap();

    service.request_priority_change(pid, pid as i64, 2).unwrap();
    assert_eq!(scheduler.process(pid).unwrap().state, ProcessState::Blocked);

    scheduler.wake(pid).unwrap();
    assert_eq!(scheduler.peek_highest(), Some((pid, 2)));
}

#[test]
fn test_zombie_target_is_no_such_process() {
    let (scheduler, service) = setup();

    let pid = scheduler.spawn("done", None).unwrap();
    scheduler.schedule(0).unwrap();
    scheduler.exit(0, 0).unwrap();

    assert_eq!(
        service.request_priority_change(1, pid as i64, 3),
        Err(SchedulerError::NoSuchProcess(pid as i64))
    );
}

#[test]
fn test_owner_policy_through_syscall() {
    let scheduler = Scheduler::new(SchedulerConfig::new().with_quantum_ticks(100)).unwrap();
    let service = PriorityService::with_policy(scheduler.clone(), Arc::new(OwnerOrRoot));

    let root = scheduler.spawn("init", None).unwrap();
    let child = scheduler.fork(root, "child").unwrap();
    let stranger = scheduler.spawn("stranger", None).unwrap();

    assert_eq!(sys_set(&service, stranger, child as i32, 3), -1);
    assert_eq!(scheduler.process(child).unwrap().priority, 10);
    assert_eq!(sys_set(&service, root, child as i32, 3), 0);
    assert_eq!(scheduler.process(child).unwrap().priority, 3);
}

#[derive(Debug, Clone)]
enum Op {
    Spawn(u8),
    Schedule,
    Tick,
    Yield,
    Block,
    WakeAny(usize),
    Exit,
    SetPriority(usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..=20).prop_map(Op::Spawn),
        Just(Op::Schedule),
        Just(Op::Tick),
        Just(Op::Yield),
        Just(Op::Block),
        any::<usize>().prop_map(Op::WakeAny),
        Just(Op::Exit),
        (any::<usize>(), -2i64..=23).prop_map(|(i, p)| Op::SetPriority(i, p)),
    ]
}

proptest! {
    #[test]
    fn prop_invariants_hold_under_random_workloads(ops in proptest::collection::vec(op(), 1..80)) {
        let scheduler = Scheduler::new(
            SchedulerConfig::new().with_cores(2).with_quantum_ticks(3),
        )
        .unwrap();
        let service = PriorityService::new(scheduler.clone());
        let mut pids = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            let core = step % 2;
            match op {
                Op::Spawn(priority) => pids.push(scheduler.spawn("p", Some(priority)).unwrap()),
                Op::Schedule => { scheduler.schedule(core).unwrap(); }
                Op::Tick => { scheduler.tick(core).unwrap(); }
                Op::Yield => { scheduler.yield_now(core).unwrap(); }
                Op::Block => { let _ = scheduler.block(core); }
                Op::WakeAny(i) if !pids.is_empty() => {
                    let _ = scheduler.wake(pids[i % pids.len()]);
                }
                Op::WakeAny(_) => {}
                Op::Exit => { let _ = scheduler.exit(core, 0); }
                Op::SetPriority(i, priority) if !pids.is_empty() => {
                    let pid = pids[i % pids.len()];
                    let before = scheduler.snapshot();
                    let result = service.request_priority_change(pid, pid as i64, priority);
                    if result.is_err() {
                        prop_assert_eq!(scheduler.snapshot(), before);
                    } else {
                        prop_assert_eq!(scheduler.process(pid).unwrap().priority as i64, priority);
                    }
                }
                Op::SetPriority(..) => {}
            }
            prop_assert!(scheduler.verify().is_ok());

            // A scheduling point never leaves a better process waiting
            if let (Some(running), Some((_, best))) =
                (scheduler.current(core).unwrap(), scheduler.peek_highest())
            {
                let running = scheduler.process(running).unwrap().priority;
                if best < running {
                    prop_assert!(scheduler.needs_resched(core).unwrap());
                }
            }
        }
    }
}
