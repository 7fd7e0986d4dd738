//! # DeadlineTimer Benchmarks
//!
//! Run: `cargo bench --bench timer_bench`

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use switch_core::prelude::*;

fn bench_elapsed(c: &mut Criterion) {
    let mut group = c.benchmark_group("deadline_elapsed");

    let manual = ManualClock::new();
    let mut timer = DeadlineTimer::new(manual.clone());
    timer.start(Duration::from_millis(250));
    group.bench_function("manual_clock", |b| b.iter(|| black_box(timer.elapsed())));

    let mut timer = DeadlineTimer::new(MonotonicClock::new());
    timer.start(Duration::from_secs(3600));
    group.bench_function("monotonic_clock", |b| b.iter(|| black_box(timer.elapsed())));

    group.finish();
}

fn bench_rearm(c: &mut Criterion) {
    let mut timer = DeadlineTimer::new(MonotonicClock::new());

    c.bench_function("deadline_restart", |b| {
        b.iter(|| {
            timer.restart(black_box(Duration::from_millis(250)));
            black_box(timer.is_armed())
        })
    });
}

criterion_group!(benches, bench_elapsed, bench_rearm);

criterion_main!(benches);
