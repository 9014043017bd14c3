/*!
 * Scheduler Benchmarks
 *
 * Ready-queue operations and priority updates at different queue depths
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prio_kernel::{PriorityService, ReadyQueue, Scheduler, SchedulerConfig, MAX_PRIO};

const DEPTHS: [usize; 3] = [16, 256, 4096];

fn filled_queue(depth: usize) -> ReadyQueue {
    let mut queue = ReadyQueue::new();
    for i in 0..depth {
        queue.insert(i as u32 + 1, (i % (MAX_PRIO as usize + 1)) as u8, i as u64);
    }
    queue
}

fn bench_queue_insert_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_insert_pop");

    for depth in DEPTHS {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut queue = filled_queue(depth);
            let mut seq = depth as u64;
            b.iter(|| {
                seq += 1;
                queue.insert(black_box(0), black_box(7), seq);
                black_box(queue.pop_highest());
            });
        });
    }

    group.finish();
}

fn bench_priority_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_change");

    for depth in DEPTHS {
        let scheduler = Scheduler::new(SchedulerConfig::new()).unwrap();
        let service = PriorityService::new(scheduler.clone());
        let pids: Vec<_> = (0..depth)
            .map(|i| {
                scheduler
                    .spawn("bench", Some((i % (MAX_PRIO as usize + 1)) as u8))
                    .unwrap()
            })
            .collect();
        let target = pids[depth / 2];

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let mut priority = 0i64;
            b.iter(|| {
                priority = (priority + 1) % (MAX_PRIO as i64 + 1);
                service
                    .request_priority_change(target, black_box(target as i64), priority)
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_schedule_rotation(c: &mut Criterion) {
    let scheduler = Scheduler::new(SchedulerConfig::new().with_quantum_ticks(1)).unwrap();
    for _ in 0..64 {
        scheduler.spawn("bench", None).unwrap();
    }

    c.bench_function("schedule_rotation", |b| {
        b.iter(|| {
            scheduler.tick(0).unwrap();
            black_box(scheduler.schedule(0).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_queue_insert_pop,
    bench_priority_change,
    bench_schedule_rotation
);
criterion_main!(benches);
