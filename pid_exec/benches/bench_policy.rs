//! # Control Policy Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::sim::{self, TelemetrySample};
use pid_lib::{
    pid_ctrl::{ControlPolicy, Params, PidCtrl},
    sim_server::process_frame
};

/// A lap's worth of weaving telemetry.
fn weaving_samples() -> Vec<TelemetrySample> {
    (0..1000)
        .map(|i| {
            let t = i as f64 * 0.05;
            TelemetrySample {
                cte: 1.5 * t.sin(),
                speed: 20.0 + 10.0 * (0.3 * t).cos(),
                steering_angle: 0.0
            }
        })
        .collect()
}

fn policy_benchmark(c: &mut Criterion) {
    let samples = weaving_samples();

    c.bench_function("policy_on_telemetry_1000", |b| {
        b.iter(|| {
            let mut policy = ControlPolicy::new(Params::default());
            for s in samples.iter() {
                black_box(policy.on_telemetry(s));
            }
        })
    });

    let frames: Vec<String> = samples
        .iter()
        .map(|s| sim::telemetry_frame(s).unwrap())
        .collect();

    c.bench_function("process_frame_1000", |b| {
        b.iter(|| {
            let mut ctrl = PidCtrl::new(Params::default()).unwrap();
            for f in frames.iter() {
                black_box(process_frame(&mut ctrl, f).unwrap());
            }
        })
    });
}

criterion_group!(benches, policy_benchmark);
criterion_main!(benches);
