//! Source generator for performance-portability micro-benchmarks.
//!
//! A small benchmark (stream, stencils, arithmetic chains) is described
//! once as an IR instance and lowered to C++ for seventeen parallel
//! programming models, from sequential loops through OpenMP, OpenACC,
//! CUDA, HIP, SYCL, `std::par` and Kokkos. Every variant of a benchmark
//! shares the same initialization, verification and CLI parsing through
//! a generated utility header, and a generated Makefile builds and runs
//! the whole matrix.

pub mod bench;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod ir;

pub use bench::{BenchRegistry, BenchSpec};
pub use codegen::{Backend, BackendRegistry, GeneratedFile};
pub use config::ToolchainSet;
pub use error::{Error, Result};
