//! The benchmark catalogue: each module builds the IR instance for one
//! micro-benchmark, parameterized by the target backend.
//!
//! A benchmark composes two flavors of application: the device program
//! (compute kernels plus bookkeeping pseudo-steps) for every device
//! backend, and the host-side utility application (init, verification,
//! CLI parsing) when composed for the util-header backend.

pub mod fma;
pub mod fma_strided;
pub mod init;
pub mod matrix_add;
pub mod square_root;
pub mod stencil;
pub mod stream;
pub mod stream_strided;

use crate::codegen::Backend;
use crate::error::{Error, Result};
use crate::ir::{Application, Expr, IterDim, Variable};

/// One catalogue entry. `compose` builds the complete IR application for
/// a backend; composing for [`Backend::UtilHeader`] yields the companion
/// init/check/parse application instead of the device program.
#[derive(Clone)]
pub struct BenchSpec {
    pub name: &'static str,
    pub group: &'static str,
    /// Figure of merit the harness plots for this benchmark.
    pub metric: &'static str,
    /// CLI defaults: element type, sizes, extra parameters, nItWarmUp, nIt.
    pub default_parameters: &'static [&'static str],
    pub dimensionality: usize,
    pub compose: fn(Backend) -> Application,
}

impl std::fmt::Debug for BenchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("dimensionality", &self.dimensionality)
            .finish()
    }
}

/// Explicit, ordered benchmark catalogue passed to the generation entry
/// points.
#[derive(Clone, Debug)]
pub struct BenchRegistry {
    benches: Vec<BenchSpec>,
}

impl BenchRegistry {
    pub fn new(benches: Vec<BenchSpec>) -> Self {
        Self { benches }
    }

    pub fn default_set() -> Self {
        Self::new(vec![
            init::spec(),
            stream::spec(),
            stencil::spec_1d(),
            stencil::spec_2d(),
            stencil::spec_3d(),
            matrix_add::spec(),
            fma::spec(),
            square_root::spec(),
            stream_strided::spec(),
            fma_strided::spec(),
        ])
    }

    pub fn all(&self) -> &[BenchSpec] {
        &self.benches
    }

    pub fn lookup(&self, name: &str) -> Result<&BenchSpec> {
        self.benches
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::UnknownBench {
                name: name.to_string(),
            })
    }
}

// ─── Shared IR builders ───────────────────────────────────────────

pub(crate) fn iterators(dims: usize) -> Vec<Variable> {
    (0..dims).map(|d| Variable::size_t(format!("i{d}"))).collect()
}

pub(crate) fn size_vars(dims: usize) -> Vec<Variable> {
    ["nx", "ny", "nz"][..dims]
        .iter()
        .map(|n| Variable::size_t(*n))
        .collect()
}

pub(crate) fn index_exprs(its: &[Variable]) -> Vec<Expr> {
    its.iter().map(Expr::var).collect()
}

/// `[0, n)` per dimension.
pub(crate) fn full_space(its: &[Variable], sizes: &[Variable]) -> Vec<IterDim> {
    its.iter()
        .zip(sizes)
        .map(|(it, s)| IterDim::new(it.clone(), 0i64, Expr::var(s)))
        .collect()
}

/// `[1, n - 1)` per dimension, the interior of a stencil grid.
pub(crate) fn interior_space(its: &[Variable], sizes: &[Variable]) -> Vec<IterDim> {
    its.iter()
        .zip(sizes)
        .map(|(it, s)| IterDim::new(it.clone(), 1i64, Expr::var(s) - 1i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_is_ordered_and_unique() {
        let reg = BenchRegistry::default_set();
        let names: Vec<&str> = reg.all().iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            [
                "init",
                "stream",
                "stencil-1d",
                "stencil-2d",
                "stencil-3d",
                "matrix-add",
                "fma",
                "square-root",
                "stream-strided",
                "fma-strided",
            ]
        );
    }

    #[test]
    fn lookup_rejects_unknown_benchmarks() {
        let reg = BenchRegistry::default_set();
        assert!(reg.lookup("stream").is_ok());
        assert!(reg.lookup("gemm").is_err());
    }

    #[test]
    fn every_bench_composes_for_every_backend() {
        let reg = BenchRegistry::default_set();
        for bench in reg.all() {
            for backend in crate::codegen::ALL_DEVICE_BACKENDS
                .iter()
                .chain([Backend::UtilHeader].iter())
            {
                let app = (bench.compose)(*backend);
                assert_eq!(app.name, bench.name);
                assert_eq!(app.sizes.len(), bench.dimensionality);
            }
        }
    }

    #[test]
    fn default_parameter_counts_match_the_cli_contract() {
        let reg = BenchRegistry::default_set();
        for bench in reg.all() {
            let app = (bench.compose)(Backend::Serial);
            // type + sizes + parameters + nItWarmUp + nIt
            assert_eq!(
                bench.default_parameters.len(),
                1 + app.sizes.len() + app.parameters.len() + 2,
                "{}",
                bench.name
            );
        }
    }
}
