// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(missing_docs)]
use apl_runtime::{DevicePreference, Session, SessionConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn session() -> Session {
    Session::with_config(SessionConfig::default().with_device(DevicePreference::Cpu))
}

fn bench_eval_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    for n in [16usize, 1024, 65_536] {
        let line = format!("⍳{n}");
        group.bench_with_input(BenchmarkId::new("iota", n), &line, |b, line| {
            let mut s = session();
            b.iter(|| black_box(s.eval(black_box(line))));
        });
    }

    let mut s = session();
    let _ = s.eval("A <- ⍳4096");
    group.bench_function("reshape_var", |b| {
        b.iter(|| black_box(s.eval(black_box("64 64 ⍴ A"))));
    });

    group.finish();
}

fn bench_model_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("model");

    group.bench_function("load_tinyllama", |b| {
        let mut s = session();
        b.iter(|| black_box(s.eval("LoadModel tinyllama")));
    });

    group.bench_function("define_layer", |b| {
        b.iter_batched(
            session,
            |mut s| black_box(s.eval("Layer 'L1' 'Linear' 64 32")).is_ok(),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("run_simulated", |b| {
        let mut s = session();
        let _ = s.eval("LoadModel mistral");
        b.iter(|| black_box(s.eval("Run 'Hello world'")));
    });

    group.finish();
}

criterion_group!(benches, bench_eval_expressions, bench_model_commands);
criterion_main!(benches);
