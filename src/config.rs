//! Compiler toolchain configuration for the generated Makefiles.
//!
//! Every backend maps to a compiler invocation (compiler, flags, extra
//! link libraries). Defaults target an NVIDIA sm_90 node with Kokkos
//! builds under `/root/kokkos`; a TOML file overrides any backend:
//!
//! ```toml
//! [toolchain.cuda-expl]
//! compiler = "nvcc"
//! flags = ["-O3", "-std=c++17", "-arch=sm_80"]
//!
//! [toolchain.kokkos-cuda]
//! libs = ["-lkokkoscore", "-ldl", "-lcuda"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use snafu::ResultExt;

use crate::codegen::Backend;
use crate::error::{self, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub flags: Vec<String>,
    pub libs: Vec<String>,
}

impl Toolchain {
    fn new(compiler: &str, flags: &[&str], libs: &[&str]) -> Self {
        Self {
            compiler: compiler.to_string(),
            flags: flags.iter().map(|s| s.to_string()).collect(),
            libs: libs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Toolchain per backend, keyed by the backend's short name.
#[derive(Clone, Debug)]
pub struct ToolchainSet {
    toolchains: HashMap<String, Toolchain>,
}

const KOKKOS_PATH: &str = "/root/kokkos";
const SM: &str = "90";

impl Default for ToolchainSet {
    fn default() -> Self {
        let cuda_arch = format!("-arch=sm_{SM}");
        let sycl_arch = format!("--cuda-gpu-arch=sm_{SM}");
        let stdpar_arch = format!("-gpu=cc{SM}");

        let cuda_flags = [
            "-O3",
            "-std=c++17",
            cuda_arch.as_str(),
            "--expt-extended-lambda",
            "--expt-relaxed-constexpr",
        ];
        let hip_flags = ["-x", "hip", "-O3", "-std=c++17", "-munsafe-fp-atomics"];
        let sycl_flags = [
            "-O3",
            "-march=native",
            "-std=c++17",
            "-fsycl",
            "-fsycl-targets=nvptx64-nvidia-cuda",
            "-Xsycl-target-backend",
            sycl_arch.as_str(),
        ];
        let kokkos_inc_serial = format!("-I{KOKKOS_PATH}/install-serial/include");
        let kokkos_lib_serial = format!("-L{KOKKOS_PATH}/install-serial/lib");
        let kokkos_inc_omp = format!("-I{KOKKOS_PATH}/install-omp/include");
        let kokkos_lib_omp = format!("-L{KOKKOS_PATH}/install-omp/lib");
        let kokkos_inc_cuda = format!("-I{KOKKOS_PATH}/install-cuda/include");
        let kokkos_lib_cuda = format!("-L{KOKKOS_PATH}/install-cuda/lib");
        let nvcc_wrapper = format!("{KOKKOS_PATH}/install-cuda/bin/nvcc_wrapper");
        let kokkos_libs = ["-lkokkoscore", "-ldl"];

        let entries: [(&str, Toolchain); 17] = [
            (
                "base",
                Toolchain::new("g++", &["-O3", "-march=native", "-std=c++17"], &[]),
            ),
            (
                "omp-host",
                Toolchain::new("g++", &["-O3", "-march=native", "-std=c++17", "-fopenmp"], &[]),
            ),
            (
                "omp-target-expl",
                Toolchain::new("nvc++", &["-O3", "-std=c++17", "-mp=gpu", "-target=gpu"], &[]),
            ),
            (
                "omp-target-mm",
                Toolchain::new(
                    "nvc++",
                    &["-O3", "-std=c++17", "-mp=gpu", "-target=gpu", "-gpu=mem:unified"],
                    &[],
                ),
            ),
            (
                "openacc-expl",
                Toolchain::new("nvc++", &["-O3", "-std=c++17", "-acc=gpu", "-target=gpu"], &[]),
            ),
            (
                "openacc-mm",
                Toolchain::new(
                    "nvc++",
                    &["-O3", "-std=c++17", "-acc=gpu", "-target=gpu", "-gpu=mem:unified"],
                    &[],
                ),
            ),
            ("cuda-expl", Toolchain::new("nvcc", &cuda_flags, &[])),
            ("cuda-mm", Toolchain::new("nvcc", &cuda_flags, &[])),
            ("hip-expl", Toolchain::new("hipcc", &hip_flags, &[])),
            ("hip-mm", Toolchain::new("hipcc", &hip_flags, &[])),
            ("sycl-buffer", Toolchain::new("icpx", &sycl_flags, &[])),
            ("sycl-expl", Toolchain::new("icpx", &sycl_flags, &[])),
            ("sycl-mm", Toolchain::new("icpx", &sycl_flags, &[])),
            (
                "std-par",
                Toolchain::new(
                    "nvc++",
                    &[
                        "-O3",
                        "-std=c++17",
                        "-stdpar=gpu",
                        "-target=gpu",
                        stdpar_arch.as_str(),
                    ],
                    &[],
                ),
            ),
            (
                "kokkos-serial",
                Toolchain::new(
                    "g++",
                    &[
                        "-O3",
                        "-march=native",
                        "-std=c++17",
                        kokkos_inc_serial.as_str(),
                        kokkos_lib_serial.as_str(),
                    ],
                    &kokkos_libs,
                ),
            ),
            (
                "kokkos-omp-host",
                Toolchain::new(
                    "g++",
                    &[
                        "-O3",
                        "-march=native",
                        "-std=c++17",
                        "-fopenmp",
                        kokkos_inc_omp.as_str(),
                        kokkos_lib_omp.as_str(),
                    ],
                    &kokkos_libs,
                ),
            ),
            (
                "kokkos-cuda",
                Toolchain::new(
                    nvcc_wrapper.as_str(),
                    &[
                        "-O3",
                        "-march=native",
                        "-std=c++17",
                        cuda_arch.as_str(),
                        "--expt-extended-lambda",
                        "--expt-relaxed-constexpr",
                        kokkos_inc_cuda.as_str(),
                        kokkos_lib_cuda.as_str(),
                    ],
                    &["-lkokkoscore", "-ldl", "-lcuda"],
                ),
            ),
        ];

        let toolchains = entries
            .into_iter()
            .map(|(name, tc)| (name.to_string(), tc))
            .collect();
        Self { toolchains }
    }
}

/// Parse a minimal TOML string array: `["a", "b"]` → `vec!["a", "b"]`.
fn parse_string_array(s: &str) -> Vec<String> {
    let s = s.trim();
    if !s.starts_with('[') || !s.ends_with(']') {
        return Vec::new();
    }
    s[1..s.len() - 1]
        .split(',')
        .map(|part| part.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ToolchainSet {
    pub fn get(&self, backend: Backend) -> &Toolchain {
        &self.toolchains[backend.short_name()]
    }

    /// Load overrides from a TOML file on top of the defaults.
    ///
    /// Section-aware minimal parsing: only `[toolchain.<short-name>]`
    /// sections are interpreted; unknown sections and keys are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(error::ReadConfigSnafu {
            path: path.to_path_buf(),
        })?;
        let mut set = Self::default();
        set.apply(&content);
        Ok(set)
    }

    fn apply(&mut self, content: &str) {
        let mut current_section = String::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some(backend) = current_section.strip_prefix("toolchain.") else {
                continue;
            };
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            let entry = self
                .toolchains
                .entry(backend.to_string())
                .or_insert_with(|| Toolchain::new("g++", &[], &[]));
            match key {
                "compiler" => entry.compiler = value.trim_matches('"').to_string(),
                "flags" => entry.flags = parse_string_array(value),
                "libs" => entry.libs = parse_string_array(value),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_device_backend() {
        let set = ToolchainSet::default();
        for b in crate::codegen::ALL_DEVICE_BACKENDS {
            let tc = set.get(b);
            assert!(!tc.compiler.is_empty(), "{b:?}");
        }
    }

    #[test]
    fn kokkos_backends_link_the_core_library() {
        let set = ToolchainSet::default();
        assert!(set
            .get(Backend::KokkosCuda)
            .libs
            .contains(&"-lkokkoscore".to_string()));
        assert!(set.get(Backend::KokkosCuda).compiler.ends_with("nvcc_wrapper"));
    }

    #[test]
    fn toml_overrides_replace_only_named_keys() {
        let mut set = ToolchainSet::default();
        set.apply(
            "# comment\n\
             [toolchain.cuda-expl]\n\
             compiler = \"nvcc\"\n\
             flags = [\"-O3\", \"-std=c++17\", \"-arch=sm_80\"]\n\
             \n\
             [other]\n\
             compiler = \"ignored\"\n",
        );
        let tc = set.get(Backend::CudaExpl);
        assert_eq!(tc.compiler, "nvcc");
        assert_eq!(tc.flags, ["-O3", "-std=c++17", "-arch=sm_80"]);
        // untouched backend keeps its default
        assert_eq!(set.get(Backend::Serial).compiler, "g++");
    }

    #[test]
    fn string_array_parsing_tolerates_whitespace() {
        assert_eq!(
            parse_string_array("[ \"-O3\",  \"-fopenmp\" ]"),
            ["-O3", "-fopenmp"]
        );
        assert!(parse_string_array("not-an-array").is_empty());
    }
}
