//! Per-backend kernel lowering and program assembly.
//!
//! Three operations exist per backend: lowering one kernel to a function
//! definition, emitting the matching launch statement, and assembling the
//! complete benchmark program. All three dispatch exhaustively on
//! [`Backend`]; adding a variant forces every lowering to be written.

mod host;
mod kokkos;
mod std_par;
mod sycl;
mod thread_grid;
pub mod util_header;

use super::Backend;
use crate::error::Result;
use crate::ir::{Application, Kernel};

/// Pointer qualifier applied to read-only field parameters.
///
/// Host compilers accept the stronger `* const __restrict__` form; the
/// weaker form matches what device compilers tolerate on kernel entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReadQualifier {
    ConstPtrConst,
    ConstPtr,
}

impl ReadQualifier {
    fn apply(self, tpe: &str, name: &str) -> String {
        match self {
            ReadQualifier::ConstPtrConst => format!("const {tpe} * const __restrict__ {name}"),
            ReadQualifier::ConstPtr => format!("const {tpe} *__restrict__ {name}"),
        }
    }
}

/// Signature parameter list for pointer-style backends: read-only fields,
/// written fields, then scalar variables.
pub(crate) fn pointer_params(
    kernel: &Kernel,
    reads: ReadQualifier,
    const_scalars: bool,
) -> String {
    let mut params: Vec<String> = kernel
        .read_only_fields()
        .iter()
        .map(|f| reads.apply(&f.tpe, &f.name))
        .collect();
    params.extend(
        kernel
            .writes
            .iter()
            .map(|f| format!("{} *__restrict__ {}", f.tpe, f.name)),
    );
    params.extend(super::assemble::scalar_params(kernel, const_scalars));
    params.join(", ")
}

/// Lower one kernel to its function definition.
pub fn kernel_definition(backend: Backend, kernel: &Kernel) -> Result<String> {
    match backend {
        Backend::Serial | Backend::UtilHeader => Ok(host::definition(
            kernel,
            ReadQualifier::ConstPtrConst,
            true,
            None,
        )),
        Backend::OmpHost => Ok(host::definition(
            kernel,
            ReadQualifier::ConstPtr,
            false,
            Some("#pragma omp parallel for schedule (static)".to_string()),
        )),
        Backend::OmpTargetExpl | Backend::OmpTargetMm => Ok(host::definition(
            kernel,
            ReadQualifier::ConstPtrConst,
            true,
            Some(host::omp_target_pragma(kernel)),
        )),
        Backend::OpenAccExpl | Backend::OpenAccMm => Ok(host::definition(
            kernel,
            ReadQualifier::ConstPtrConst,
            true,
            Some(host::openacc_pragma(kernel)),
        )),
        Backend::CudaExpl | Backend::CudaMm => {
            Ok(thread_grid::definition(kernel, ReadQualifier::ConstPtr))
        }
        Backend::HipExpl | Backend::HipMm => {
            Ok(thread_grid::definition(kernel, ReadQualifier::ConstPtrConst))
        }
        Backend::SyclBuffer => sycl::buffer_definition(backend, kernel),
        Backend::SyclExpl | Backend::SyclMm => sycl::pointer_definition(backend, kernel),
        Backend::StdPar => std_par::definition(kernel),
        Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => {
            Ok(kokkos::definition(kernel))
        }
    }
}

/// Launch statement matching [`kernel_definition`] for the same backend.
pub fn kernel_launch(backend: Backend, kernel: &Kernel) -> Result<String> {
    match backend {
        Backend::Serial
        | Backend::OmpHost
        | Backend::OmpTargetExpl
        | Backend::OmpTargetMm
        | Backend::OpenAccExpl
        | Backend::OpenAccMm
        | Backend::StdPar
        | Backend::UtilHeader => Ok(host::launch(kernel)),
        Backend::CudaExpl | Backend::CudaMm => thread_grid::cuda_launch(backend, kernel),
        Backend::HipExpl | Backend::HipMm => thread_grid::hip_launch(backend, kernel),
        Backend::SyclBuffer | Backend::SyclExpl | Backend::SyclMm => Ok(sycl::launch(kernel)),
        Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => {
            Ok(kokkos::launch(kernel))
        }
    }
}

/// Assemble the complete benchmark program for one backend.
pub fn generate_application(backend: Backend, app: &Application) -> Result<String> {
    match backend {
        Backend::Serial
        | Backend::OmpHost
        | Backend::OmpTargetExpl
        | Backend::OmpTargetMm
        | Backend::OpenAccExpl
        | Backend::OpenAccMm => host::application(backend, app),
        Backend::CudaExpl | Backend::CudaMm => {
            thread_grid::application(backend, app, "cuda-util.h")
        }
        Backend::HipExpl | Backend::HipMm => thread_grid::application(backend, app, "hip-util.h"),
        Backend::SyclBuffer | Backend::SyclExpl | Backend::SyclMm => {
            sycl::application(backend, app)
        }
        Backend::StdPar => std_par::application(backend, app),
        Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => {
            kokkos::application(backend, app)
        }
        Backend::UtilHeader => util_header::header(app),
    }
}
