//! Error types for benchmark generation.

use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while composing or generating benchmarks.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Launch configuration exists only for one-, two- and
    /// three-dimensional iteration spaces.
    #[snafu(display("{backend} has no launch configuration for {dims}-dimensional kernels"))]
    UnsupportedDims { backend: String, dims: usize },

    /// Backend short name not present in the registry.
    #[snafu(display("Unknown backend '{name}'"))]
    UnknownBackend { name: String },

    /// Benchmark name not present in the catalogue.
    #[snafu(display("Unknown benchmark '{name}'"))]
    UnknownBench { name: String },

    /// A kernel without field parameters cannot be lowered to a
    /// range-over-elements launch.
    #[snafu(display("Kernel '{kernel}' references no fields"))]
    NoFields { kernel: String },

    /// Writing a generated file failed.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading the toolchain configuration failed.
    #[snafu(display("Failed to read config {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
}
