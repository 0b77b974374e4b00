//! Generation driver: compose every benchmark for every backend and
//! write the resulting source tree.
//!
//! Layout: shared headers at the tree root, one directory per benchmark
//! at `<out>/<group>/<name>/` holding the per-backend sources, the
//! utility header and a Makefile. Generated includes reference the root
//! headers as `"../../util.h"`, so the nesting depth is part of the
//! contract.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use snafu::ResultExt;

use crate::bench::{BenchRegistry, BenchSpec};
use crate::codegen::{assets, backend, makefile, Backend, BackendRegistry, GeneratedFile};
use crate::config::ToolchainSet;
use crate::error::{self, Result};

/// One backend's source file for one benchmark.
pub fn generate_source(bench: &BenchSpec, b: Backend) -> Result<GeneratedFile> {
    let app = (bench.compose)(b);
    Ok(GeneratedFile {
        name: b.code_file_name(bench.name),
        content: backend::generate_application(b, &app)?,
    })
}

/// The shared init/verify/parse header for one benchmark.
pub fn generate_util_header(bench: &BenchSpec) -> Result<GeneratedFile> {
    generate_source(bench, Backend::UtilHeader)
}

/// All files for one benchmark, in deterministic order: one source per
/// backend (the Kokkos execution spaces collapse into one shared file),
/// then the utility header, then the Makefile.
pub fn generate_bench(
    bench: &BenchSpec,
    backends: &BackendRegistry,
    toolchains: &ToolchainSet,
) -> Result<Vec<GeneratedFile>> {
    let mut files: Vec<GeneratedFile> = Vec::new();

    for &b in backends.all() {
        if files.iter().any(|f| f.name == b.code_file_name(bench.name)) {
            continue;
        }
        files.push(generate_source(bench, b)?);
    }

    files.push(generate_util_header(bench)?);

    files.push(GeneratedFile {
        name: "Makefile".to_string(),
        content: makefile::generate_makefile(bench, backends, toolchains),
    });

    Ok(files)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).context(error::WriteFileSnafu {
        path: path.to_path_buf(),
    })
}

/// Write one benchmark's directory under `<out>/<group>/<name>/`.
pub fn write_bench(
    out: &Path,
    bench: &BenchSpec,
    backends: &BackendRegistry,
    toolchains: &ToolchainSet,
) -> Result<()> {
    let dir = out.join(bench.group).join(bench.name);
    fs::create_dir_all(&dir).context(error::WriteFileSnafu { path: dir.clone() })?;

    for file in generate_bench(bench, backends, toolchains)? {
        write_file(&dir.join(&file.name), &file.content)?;
    }
    Ok(())
}

/// Write the shared headers at the root of the generated tree.
pub fn write_assets(out: &Path) -> Result<()> {
    fs::create_dir_all(out).context(error::WriteFileSnafu {
        path: out.to_path_buf(),
    })?;
    for asset in assets::root_assets() {
        write_file(&out.join(&asset.name), &asset.content)?;
    }
    Ok(())
}

/// Generate the complete tree: root assets, then every benchmark fanned
/// out across threads. Benchmarks are independent, so generation order
/// does not affect the output.
pub fn write_all(
    out: &Path,
    benches: &BenchRegistry,
    backends: &BackendRegistry,
    toolchains: &ToolchainSet,
) -> Result<()> {
    write_assets(out)?;
    benches
        .all()
        .par_iter()
        .try_for_each(|bench| write_bench(out, bench, backends, toolchains))
}
