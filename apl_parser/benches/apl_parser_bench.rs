// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(missing_docs)]
use apl_parser::{lexer, parse_command};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const LINES: [(&str, &str); 8] = [
    ("iota", "⍳1000"),
    ("vector", "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16"),
    ("reshape", "2 3 ⍴ ⍳6"),
    ("nested_reshape", "2 2 2 ⍴ 8 ⍴ 2 4 ⍴ ⍳8"),
    ("assign", "weights <- 64 32 ⍴ ⍳2048"),
    ("layer", "Layer 'L1' 'Linear' 64 32"),
    ("load_model", "LoadModel 'tinyllama'"),
    ("run", "Run 'Hello world'"),
];

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for (name, line) in &LINES {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("line", name), line, |b, line| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(line));
                black_box(tokens);
            });
        });
    }

    group.finish();
}

fn bench_parse_command(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_command");

    for (name, line) in &LINES {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("line", name), line, |b, line| {
            b.iter(|| {
                let cmd = parse_command(black_box(line));
                black_box(cmd);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse_command);
criterion_main!(benches);
