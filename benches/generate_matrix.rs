//! Generation throughput over the benchmark/backend matrix.
//!
//! Measures three granularities:
//! 1. Composing one benchmark's IR for one backend
//! 2. Lowering one benchmark across all backends (in-memory)
//! 3. The full matrix written to a temporary directory

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use portbench::bench::BenchRegistry;
use portbench::codegen::{Backend, BackendRegistry};
use portbench::config::ToolchainSet;
use portbench::generate;

/// Benchmark: IR composition only, no lowering.
fn bench_compose(c: &mut Criterion) {
    let benches = BenchRegistry::default_set();
    let stream = benches.lookup("stream").unwrap();
    let stencil = benches.lookup("stencil-3d").unwrap();

    let mut group = c.benchmark_group("compose");
    group.bench_function("stream_cuda", |b| {
        b.iter(|| (stream.compose)(black_box(Backend::CudaExpl)))
    });
    group.bench_function("stencil_3d_kokkos", |b| {
        b.iter(|| (stencil.compose)(black_box(Backend::KokkosCuda)))
    });
    group.finish();
}

/// Benchmark: one benchmark lowered for every backend, files kept in memory.
fn bench_single(c: &mut Criterion) {
    let benches = BenchRegistry::default_set();
    let backends = BackendRegistry::default_set();
    let toolchains = ToolchainSet::default();

    let mut group = c.benchmark_group("generate_bench");
    for name in ["stream", "stencil-3d", "fma-strided"] {
        let bench = benches.lookup(name).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| generate::generate_bench(black_box(bench), &backends, &toolchains).unwrap())
        });
    }
    group.finish();
}

/// Benchmark: the complete tree, assets and all benchmarks, written to disk.
fn bench_full_matrix(c: &mut Criterion) {
    let benches = BenchRegistry::default_set();
    let backends = BackendRegistry::default_set();
    let toolchains = ToolchainSet::default();

    c.bench_function("write_all", |b| {
        b.iter(|| {
            let out = tempfile::tempdir().unwrap();
            generate::write_all(out.path(), &benches, &backends, &toolchains).unwrap();
        })
    });
}

criterion_group!(benches, bench_compose, bench_single, bench_full_matrix);
criterion_main!(benches);
