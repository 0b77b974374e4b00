//! Backend family: lowering of IR into backend-specific C++ source text.
//!
//! `Backend` is the dispatch axis: a closed enum, one variant per target
//! execution model. Each variant supplies a field memory-model strategy
//! ([`memory`]), a kernel lowering and an application assembly
//! ([`backend`]), dispatched exhaustively; there is no inheritance and no
//! ambient registry.

pub mod assemble;
pub mod assets;
pub mod backend;
pub mod makefile;
pub mod memory;

use crate::error::{Error, Result};
use crate::ir::{Expr, Field, Subscript};

/// One target parallel-execution model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Sequential host code.
    Serial,
    OmpHost,
    OmpTargetExpl,
    OmpTargetMm,
    OpenAccExpl,
    OpenAccMm,
    CudaExpl,
    CudaMm,
    HipExpl,
    HipMm,
    SyclBuffer,
    SyclExpl,
    SyclMm,
    StdPar,
    KokkosSerial,
    KokkosOmpHost,
    KokkosCuda,
    /// Restricted host-only variant emitting the shared utility header
    /// (init, verification and CLI parsing) for a benchmark.
    UtilHeader,
}

/// Device backends in canonical generation order.
pub const ALL_DEVICE_BACKENDS: [Backend; 17] = [
    Backend::Serial,
    Backend::OmpHost,
    Backend::OmpTargetExpl,
    Backend::OmpTargetMm,
    Backend::OpenAccExpl,
    Backend::OpenAccMm,
    Backend::CudaExpl,
    Backend::CudaMm,
    Backend::HipExpl,
    Backend::HipMm,
    Backend::SyclBuffer,
    Backend::SyclExpl,
    Backend::SyclMm,
    Backend::StdPar,
    Backend::KokkosSerial,
    Backend::KokkosOmpHost,
    Backend::KokkosCuda,
];

impl Backend {
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Serial => "Base",
            Backend::OmpHost => "OpenMP Host",
            Backend::OmpTargetExpl => "OpenMP Target Explicit Memory",
            Backend::OmpTargetMm => "OpenMP Target Managed Memory",
            Backend::OpenAccExpl => "OpenACC Explicit Memory",
            Backend::OpenAccMm => "OpenACC Managed Memory",
            Backend::CudaExpl => "CUDA Explicit Memory",
            Backend::CudaMm => "CUDA Managed Memory",
            Backend::HipExpl => "HIP Explicit Memory",
            Backend::HipMm => "HIP Managed Memory",
            Backend::SyclBuffer => "SYCL Buffer",
            Backend::SyclExpl => "SYCL Explicit Memory",
            Backend::SyclMm => "SYCL Managed Memory",
            Backend::StdPar => "std::par",
            Backend::KokkosSerial => "Kokkos Host Serial",
            Backend::KokkosOmpHost => "Kokkos Host OpenMP",
            Backend::KokkosCuda => "Kokkos CUDA",
            Backend::UtilHeader => "Util",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Backend::Serial => "base",
            Backend::OmpHost => "omp-host",
            Backend::OmpTargetExpl => "omp-target-expl",
            Backend::OmpTargetMm => "omp-target-mm",
            Backend::OpenAccExpl => "openacc-expl",
            Backend::OpenAccMm => "openacc-mm",
            Backend::CudaExpl => "cuda-expl",
            Backend::CudaMm => "cuda-mm",
            Backend::HipExpl => "hip-expl",
            Backend::HipMm => "hip-mm",
            Backend::SyclBuffer => "sycl-buffer",
            Backend::SyclExpl => "sycl-expl",
            Backend::SyclMm => "sycl-mm",
            Backend::StdPar => "std-par",
            Backend::KokkosSerial => "kokkos-serial",
            Backend::KokkosOmpHost => "kokkos-omp-host",
            Backend::KokkosCuda => "kokkos-cuda",
            Backend::UtilHeader => "util",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Backend::CudaExpl | Backend::CudaMm => "cu",
            Backend::HipExpl | Backend::HipMm => "hip",
            Backend::UtilHeader => "h",
            _ => "cpp",
        }
    }

    /// Name of the generated source file for one benchmark.
    ///
    /// The three Kokkos execution spaces compile the same source with
    /// different library builds, so they share one file.
    pub fn code_file_name(&self, bench: &str) -> String {
        if self.is_kokkos() {
            format!("{bench}-kokkos.{}", self.file_extension())
        } else {
            format!("{bench}-{}.{}", self.short_name(), self.file_extension())
        }
    }

    /// Name of the compiled binary for one benchmark.
    pub fn bin_file_name(&self, bench: &str) -> String {
        format!("{bench}-{}", self.short_name())
    }

    /// Default thread-grouping per dimensionality for thread-grid and
    /// nd-range backends. Dimensionalities without a configuration are a
    /// hard error, never a silent fallback.
    pub fn tile_sizes(&self, dims: usize) -> Result<&'static [u64]> {
        match dims {
            1 => Ok(&[256]),
            2 => Ok(&[16, 16]),
            3 => Ok(&[16, 4, 4]),
            _ => Err(Error::UnsupportedDims {
                backend: self.display_name().to_string(),
                dims,
            }),
        }
    }

    /// Device-barrier statement inserted after warm-up and measurement
    /// loops; `None` for backends that are synchronous at launch.
    pub fn synchronize(&self) -> Option<&'static str> {
        match self {
            Backend::CudaExpl | Backend::CudaMm => {
                Some("checkCudaError(cudaDeviceSynchronize(), true);")
            }
            Backend::HipExpl | Backend::HipMm => {
                Some("checkHipError(hipDeviceSynchronize(), true);")
            }
            Backend::SyclBuffer | Backend::SyclExpl | Backend::SyclMm => Some("q.wait();"),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => {
                Some("Kokkos::fence();")
            }
            _ => None,
        }
    }

    pub fn subscript(&self) -> Subscript {
        if self.is_kokkos() {
            Subscript::Paren
        } else {
            Subscript::Bracket
        }
    }

    pub fn is_kokkos(&self) -> bool {
        matches!(
            self,
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda
        )
    }

    /// Whether fields carry a separate device pointer that the application
    /// must declare, allocate and free next to the host storage.
    pub fn has_device_ptr(&self) -> bool {
        matches!(
            self,
            Backend::CudaExpl | Backend::HipExpl | Backend::SyclExpl
        ) || self.is_kokkos()
    }

    /// Prefix distinguishing the device-side name from the host name.
    fn device_prefix(&self) -> &'static str {
        match self {
            Backend::CudaExpl | Backend::HipExpl | Backend::SyclExpl => "d_",
            Backend::SyclBuffer => "b_",
            _ => "",
        }
    }

    /// Construct a field with this backend's memory-space naming.
    pub fn field(&self, name: &str, tpe: &str, extents: Vec<Expr>) -> Field {
        let device_name = format!("{}{}", self.device_prefix(), name);
        Field::new(name, device_name, tpe, extents)
    }
}

/// An ordered, explicit set of device backends. Passed into the generation
/// entry points instead of any global lookup table.
#[derive(Clone, Debug)]
pub struct BackendRegistry {
    backends: Vec<Backend>,
}

impl BackendRegistry {
    pub fn new(backends: Vec<Backend>) -> Self {
        Self { backends }
    }

    /// Every device backend in canonical order.
    pub fn default_set() -> Self {
        Self::new(ALL_DEVICE_BACKENDS.to_vec())
    }

    pub fn all(&self) -> &[Backend] {
        &self.backends
    }

    pub fn lookup(&self, short_name: &str) -> Result<Backend> {
        self.backends
            .iter()
            .copied()
            .find(|b| b.short_name() == short_name)
            .ok_or_else(|| Error::UnknownBackend {
                name: short_name.to_string(),
            })
    }
}

/// One generated file: a name relative to the benchmark's output directory
/// and its full content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}
