//! Field memory-model strategies.
//!
//! For every backend this module answers: how is host storage declared,
//! allocated and freed; whether a separate device allocation exists; and
//! what a host/device transfer looks like. `None` from a copy method is a
//! semantically significant no-op (managed and buffer-based models defer
//! or elide the transfer), not a missing implementation.
//!
//! Explicit/managed variants of one model differ only here; their kernel
//! and application lowering is shared.

use super::Backend;
use crate::ir::{Field, Subscript};

fn total(f: &Field) -> String {
    f.total_size().render(Subscript::Bracket)
}

fn byte_count(f: &Field) -> String {
    format!("sizeof({}) * {}", f.tpe, total(f))
}

impl Backend {
    /// Host mirror name used by the Kokkos view model.
    pub fn host_mirror_name(&self, f: &Field) -> String {
        format!("h_{}", f.name)
    }

    pub fn host_declare(&self, f: &Field) -> Option<String> {
        if self.is_kokkos() {
            // Mirror declaration is folded into host_allocate via `auto`.
            return None;
        }
        Some(format!("{} *{};", f.tpe, f.name))
    }

    pub fn host_allocate(&self, f: &Field) -> Option<String> {
        let stmt = match self {
            Backend::Serial
            | Backend::OmpHost
            | Backend::OmpTargetExpl
            | Backend::OmpTargetMm
            | Backend::OpenAccExpl
            | Backend::OpenAccMm
            | Backend::StdPar
            | Backend::SyclBuffer
            | Backend::UtilHeader => {
                format!("{} = new {}[{}];", f.name, f.tpe, total(f))
            }
            Backend::CudaExpl => format!(
                "checkCudaError(cudaMallocHost((void **) &{}, {}));",
                f.name,
                byte_count(f)
            ),
            Backend::CudaMm => format!(
                "checkCudaError(cudaMallocManaged((void **) &{}, {}));",
                f.name,
                byte_count(f)
            ),
            Backend::HipExpl => format!(
                "checkHipError(hipHostMalloc((void **) &{}, {}));",
                f.name,
                byte_count(f)
            ),
            Backend::HipMm => format!(
                "checkHipError(hipMallocManaged((void **) &{}, {}));",
                f.name,
                byte_count(f)
            ),
            Backend::SyclExpl => format!(
                "{} = sycl::malloc_host<{}>({}, q);",
                f.name,
                f.tpe,
                total(f)
            ),
            Backend::SyclMm => format!(
                "{} = sycl::malloc_shared<{}>({}, q);",
                f.name,
                f.tpe,
                total(f)
            ),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => format!(
                "auto {} = Kokkos::create_mirror_view({});",
                self.host_mirror_name(f),
                f.device_name
            ),
        };
        Some(stmt)
    }

    pub fn host_free(&self, f: &Field) -> Option<String> {
        let stmt = match self {
            Backend::Serial
            | Backend::OmpHost
            | Backend::OmpTargetExpl
            | Backend::OmpTargetMm
            | Backend::OpenAccExpl
            | Backend::OpenAccMm
            | Backend::StdPar
            | Backend::SyclBuffer
            | Backend::UtilHeader => format!("delete[] {};", f.name),
            Backend::CudaExpl => format!("checkCudaError(cudaFreeHost({}));", f.name),
            Backend::CudaMm => format!("checkCudaError(cudaFree({}));", f.name),
            Backend::HipExpl => format!("checkHipError(hipHostFree({}));", f.name),
            Backend::HipMm => format!("checkHipError(hipFree({}));", f.name),
            Backend::SyclExpl | Backend::SyclMm => format!("sycl::free({}, q);", f.name),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => return None,
        };
        Some(stmt)
    }

    pub fn device_declare(&self, f: &Field) -> Option<String> {
        match self {
            Backend::CudaExpl | Backend::HipExpl | Backend::SyclExpl => {
                Some(format!("{} *{};", f.tpe, f.device_name))
            }
            _ => None,
        }
    }

    pub fn device_allocate(&self, f: &Field) -> Option<String> {
        match self {
            Backend::CudaExpl => Some(format!(
                "checkCudaError(cudaMalloc((void **) &{}, {}));",
                f.device_name,
                byte_count(f)
            )),
            Backend::HipExpl => Some(format!(
                "checkHipError(hipMalloc((void **) &{}, {}));",
                f.device_name,
                byte_count(f)
            )),
            Backend::SyclExpl => Some(format!(
                "{} = sycl::malloc_device<{}>({}, q);",
                f.device_name,
                f.tpe,
                total(f)
            )),
            Backend::SyclBuffer => Some(format!(
                "sycl::buffer {}({}, sycl::range({}));",
                f.device_name,
                f.name,
                total(f)
            )),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => {
                let stars = "*".repeat(f.dims());
                let extents: Vec<String> = f
                    .extents
                    .iter()
                    .map(|e| e.render(Subscript::Bracket))
                    .collect();
                Some(format!(
                    "Kokkos::View<{} {}> {}(\"{}\", {});",
                    f.tpe,
                    stars,
                    f.device_name,
                    f.device_name,
                    extents.join(", ")
                ))
            }
            _ => None,
        }
    }

    pub fn device_free(&self, f: &Field) -> Option<String> {
        match self {
            Backend::CudaExpl => Some(format!("checkCudaError(cudaFree({}));", f.device_name)),
            Backend::HipExpl => Some(format!("checkHipError(hipFree({}));", f.device_name)),
            Backend::SyclExpl => Some(format!("sycl::free({}, q);", f.device_name)),
            _ => None,
        }
    }

    pub fn copy_to_device(&self, f: &Field) -> Option<String> {
        match self {
            Backend::CudaExpl => Some(format!(
                "checkCudaError(cudaMemcpy({}, {}, {}, cudaMemcpyHostToDevice));",
                f.device_name,
                f.name,
                byte_count(f)
            )),
            Backend::CudaMm => Some(format!(
                "checkCudaError(cudaMemPrefetchAsync({}, {}, 0));",
                f.name,
                byte_count(f)
            )),
            Backend::HipExpl => Some(format!(
                "checkHipError(hipMemcpy({}, {}, {}, hipMemcpyHostToDevice));",
                f.device_name,
                f.name,
                byte_count(f)
            )),
            Backend::HipMm => Some(format!(
                "checkHipError(hipMemPrefetchAsync({}, {}, 0));",
                f.name,
                byte_count(f)
            )),
            Backend::SyclExpl => Some(format!(
                "q.memcpy({}, {}, {}); q.wait();",
                f.device_name,
                f.name,
                byte_count(f)
            )),
            Backend::OmpTargetExpl => Some(format!(
                "#pragma omp target enter data map(to : {}[0 : {}])",
                f.name,
                total(f)
            )),
            Backend::OpenAccExpl => Some(format!(
                "#pragma acc enter data copyin({}[0 : {}])",
                f.name,
                total(f)
            )),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => Some(format!(
                "Kokkos::deep_copy({}, {});",
                f.device_name,
                self.host_mirror_name(f)
            )),
            _ => None,
        }
    }

    pub fn copy_to_host(&self, f: &Field) -> Option<String> {
        match self {
            Backend::CudaExpl => Some(format!(
                "checkCudaError(cudaMemcpy({}, {}, {}, cudaMemcpyDeviceToHost));",
                f.name,
                f.device_name,
                byte_count(f)
            )),
            Backend::CudaMm => Some(format!(
                "checkCudaError(cudaMemPrefetchAsync({}, {}, cudaCpuDeviceId));",
                f.name,
                byte_count(f)
            )),
            Backend::HipExpl => Some(format!(
                "checkHipError(hipMemcpy({}, {}, {}, hipMemcpyDeviceToHost));",
                f.name,
                f.device_name,
                byte_count(f)
            )),
            Backend::HipMm => Some(format!(
                "checkHipError(hipMemPrefetchAsync({}, {}, hipCpuDeviceId));",
                f.name,
                byte_count(f)
            )),
            Backend::SyclExpl => Some(format!(
                "q.memcpy({}, {}, {}); q.wait();",
                f.name,
                f.device_name,
                byte_count(f)
            )),
            Backend::OmpTargetExpl => Some(format!(
                "#pragma omp target exit data map(from : {}[0 : {}])",
                f.name,
                total(f)
            )),
            Backend::OpenAccExpl => Some(format!(
                "#pragma acc exit data copyout({}[0 : {}])",
                f.name,
                total(f)
            )),
            Backend::KokkosSerial | Backend::KokkosOmpHost | Backend::KokkosCuda => Some(format!(
                "Kokkos::deep_copy({}, {});",
                self.host_mirror_name(f),
                f.device_name
            )),
            _ => None,
        }
    }
}
