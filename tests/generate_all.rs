//! End-to-end generation over the full benchmark/backend matrix.

use portbench::bench::BenchRegistry;
use portbench::codegen::{backend, Backend, BackendRegistry, GeneratedFile, ALL_DEVICE_BACKENDS};
use portbench::config::ToolchainSet;
use portbench::generate;
use portbench::ir::Step;

fn all_files(bench_name: &str) -> Vec<GeneratedFile> {
    let benches = BenchRegistry::default_set();
    let bench = benches.lookup(bench_name).expect("known benchmark");
    generate::generate_bench(
        bench,
        &BackendRegistry::default_set(),
        &ToolchainSet::default(),
    )
    .expect("generation succeeds")
}

#[test]
fn every_benchmark_generates_for_every_backend() {
    let benches = BenchRegistry::default_set();
    for bench in benches.all() {
        let files = all_files(bench.name);
        // 17 backends collapse to 15 sources, plus util header and Makefile
        assert_eq!(files.len(), 17, "{}", bench.name);
        for file in &files {
            assert!(!file.content.is_empty(), "{}/{}", bench.name, file.name);
        }
    }
}

#[test]
fn generation_is_deterministic_across_runs() {
    for name in ["stream", "stencil-3d", "fma-strided"] {
        assert_eq!(all_files(name), all_files(name));
    }
}

#[test]
fn kernel_parameters_order_reads_before_writes_before_scalars() {
    let benches = BenchRegistry::default_set();
    for bench in benches.all() {
        for &b in &ALL_DEVICE_BACKENDS {
            let app = (bench.compose)(b);
            for kernel in app.steps.iter().filter_map(Step::kernel) {
                let params = kernel.param_fields();
                let boundary = params
                    .iter()
                    .position(|f| kernel.writes.contains(*f))
                    .unwrap_or(params.len());
                for (i, f) in params.iter().enumerate() {
                    if i < boundary {
                        assert!(!kernel.writes.contains(*f), "{}: {}", bench.name, f.name);
                    } else {
                        assert!(kernel.writes.contains(*f), "{}: {}", bench.name, f.name);
                    }
                }
                assert_eq!(
                    params.len(),
                    {
                        let mut seen: Vec<&str> = Vec::new();
                        for f in kernel.reads.iter().chain(kernel.writes.iter()) {
                            if !seen.contains(&f.name.as_str()) {
                                seen.push(&f.name);
                            }
                        }
                        seen.len()
                    },
                    "{}",
                    bench.name
                );
            }
        }
    }
}

#[test]
fn application_field_sets_are_sorted_and_deduplicated() {
    let benches = BenchRegistry::default_set();
    for bench in benches.all() {
        for &b in &ALL_DEVICE_BACKENDS {
            let app = (bench.compose)(b);
            let names: Vec<&str> = app.fields.iter().map(|f| f.name.as_str()).collect();
            let mut sorted = names.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(names, sorted, "{} on {:?}", bench.name, b);
        }
    }
}

#[test]
fn explicit_and_managed_variants_share_kernel_definitions() {
    let benches = BenchRegistry::default_set();
    for bench in benches.all() {
        for (expl, mm) in [
            (Backend::CudaExpl, Backend::CudaMm),
            (Backend::HipExpl, Backend::HipMm),
            (Backend::OmpTargetExpl, Backend::OmpTargetMm),
            (Backend::OpenAccExpl, Backend::OpenAccMm),
        ] {
            let app_expl = (bench.compose)(expl);
            let app_mm = (bench.compose)(mm);
            for (ke, km) in app_expl
                .steps
                .iter()
                .filter_map(Step::kernel)
                .zip(app_mm.steps.iter().filter_map(Step::kernel))
            {
                assert_eq!(
                    backend::kernel_definition(expl, ke).unwrap(),
                    backend::kernel_definition(mm, km).unwrap(),
                    "{} on {:?}/{:?}",
                    bench.name,
                    expl,
                    mm
                );
            }
        }
    }
}

#[test]
fn stream_verification_closes_over_the_iteration_count() {
    let files = all_files("stream");
    let util = files
        .iter()
        .find(|f| f.name == "stream-util.h")
        .expect("utility header");
    assert!(util
        .content
        .contains("if ((tpe)(i0 + nIt) != src[i0]) {"));
    assert!(util.content.starts_with("#pragma once"));

    // every device source swaps after the kernel, so the check target
    // stays the src pointer on all backends
    for f in files.iter().filter(|f| {
        f.name.ends_with(".cpp") || f.name.ends_with(".cu") || f.name.ends_with(".hip")
    }) {
        assert!(
            f.content.contains("checkSolutionStream("),
            "{} lacks the verification call",
            f.name
        );
    }
}

#[test]
fn thread_grid_guards_cover_partial_tiles() {
    let files = all_files("stream");
    let cuda = files.iter().find(|f| f.name == "stream-cuda-expl.cu").unwrap();
    // a bound of 300 with a tile of 256 launches 512 threads; the guard
    // must discard the 212 above the bound
    assert!(cuda.content.contains("if (i0 < nx) {"));
    assert!(cuda
        .content
        .contains("stream<<<ceilingDivide(nx, 256), 256>>>(d_src, d_dest, nx);"));
}

#[test]
fn makefile_targets_reference_generated_files_only() {
    let benches = BenchRegistry::default_set();
    for bench in benches.all() {
        let files = all_files(bench.name);
        let makefile = &files.last().unwrap().content;
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        for b in ALL_DEVICE_BACKENDS {
            let code = b.code_file_name(bench.name);
            assert!(makefile.contains(&code), "{}: {}", bench.name, code);
            assert!(names.contains(&code.as_str()), "{}: {}", bench.name, code);
        }
    }
}

#[test]
fn writes_a_complete_tree_to_disk() {
    let out = tempfile::tempdir().unwrap();
    let benches = BenchRegistry::default_set();
    generate::write_all(
        out.path(),
        &benches,
        &BackendRegistry::default_set(),
        &ToolchainSet::default(),
    )
    .unwrap();

    for asset in ["util.h", "cuda-util.h", "hip-util.h", "sycl-util.h"] {
        assert!(out.path().join(asset).is_file(), "{asset}");
    }
    for bench in benches.all() {
        let dir = out.path().join(bench.group).join(bench.name);
        assert!(dir.join("Makefile").is_file(), "{}", bench.name);
        assert!(
            dir.join(format!("{}-util.h", bench.name)).is_file(),
            "{}",
            bench.name
        );
        assert!(
            dir.join(format!("{}-kokkos.cpp", bench.name)).is_file(),
            "{}",
            bench.name
        );
    }
}
