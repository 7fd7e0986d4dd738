//! # ServoStateMachine Benchmarks
//!
//! Measures the tick hot path: idle ticks, a full switching cycle and
//! manual-mode angle updates. Every tick is O(1).
//!
//! Run: `cargo bench --bench machine_bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use switch_actuator::{ServoActuator, ServoStateMachine};
use switch_core::prelude::*;

fn idle_machine() -> (ServoStateMachine<ServoActuator, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let mut machine =
        ServoStateMachine::new(SwitchConfig::default(), ServoActuator::new(), clock.clone())
            .expect("default config is valid");
    machine.setup();
    clock.advance_ms(2000);
    machine.tick();
    (machine, clock)
}

/// Benchmark ticks while nothing is pending
fn bench_idle_tick(c: &mut Criterion) {
    let (mut machine, _clock) = idle_machine();

    c.bench_function("tick_idle", |b| {
        b.iter(|| {
            machine.tick();
            black_box(machine.phase())
        })
    });
}

/// Benchmark a complete top/bottom cycle (6 ticks)
fn bench_full_cycle(c: &mut Criterion) {
    let (mut machine, clock) = idle_machine();
    let mut toggle = false;

    c.bench_function("full_cycle", |b| {
        b.iter(|| {
            toggle = !toggle;
            let position = if toggle { Position::Top } else { Position::Bottom };
            machine.set_pos(position);
            machine.tick();
            for _ in 0..4 {
                clock.advance_ms(250);
                machine.tick();
            }
            black_box(machine.has_position_changed())
        })
    });
}

/// Benchmark manual-mode angle updates
fn bench_manual_sweep(c: &mut Criterion) {
    let (mut machine, _clock) = idle_machine();
    machine.set_manual_pos(90);
    machine.tick();

    c.bench_function("manual_sweep_180", |b| {
        b.iter(|| {
            for degrees in 0..=180 {
                machine.set_manual_pos(black_box(degrees));
                machine.tick();
            }
        })
    });
}

criterion_group!(benches, bench_idle_tick, bench_full_cycle, bench_manual_sweep);

criterion_main!(benches);
