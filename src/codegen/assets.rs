//! Static headers placed at the root of the generated tree.
//!
//! `util.h` carries the timing/statistics output every generated binary
//! prints; its wording is parsed downstream by the measurement harness
//! and must not change. The runtime-specific headers add the error-check
//! helpers the generated CUDA/HIP/SYCL sources call.

use super::GeneratedFile;

const UTIL_H: &str = r#"#pragma once

#include <algorithm>
#include <chrono>
#include <cmath>
#include <cstdlib>
#include <iostream>
#include <string>
#include <utility>

constexpr size_t ceilingDivide(const size_t a, const size_t b) {
    return (a + b - 1) / b;
}

constexpr size_t ceilToMultipleOf(const size_t a, const size_t b) {
    return ceilingDivide(a, b) * b;
}

template <typename tpe>
inline void printStats(const std::chrono::duration<double> elapsedSeconds, const size_t nIt, const size_t nCells,
                       const char *const tpeName, const size_t numBytesPerCell, const size_t numFlopsPerCell) {
    std::cout << "  #cells / #it:   " << nCells << " / " << nIt << std::endl;
    std::cout << "  type:           " << tpeName << std::endl;
    std::cout << "  elapsed time:   " << 1e3 * elapsedSeconds.count() << " ms" << std::endl;
    std::cout << "  MLUP/s:         " << 1e-6 * nCells * nIt / elapsedSeconds.count() << std::endl;
    std::cout << "  bandwidth:      " << 1e-9 * numBytesPerCell * nCells * nIt / elapsedSeconds.count() << " GB/s" << std::endl;
    std::cout << "  compute:        " << 1e-9 * numFlopsPerCell * nCells * nIt / elapsedSeconds.count() << " GFLOP/s" << std::endl;
}
"#;

const CUDA_UTIL_H: &str = r#"#pragma once

#include <iostream>

#include <cuda_runtime.h>

inline void checkCudaError(const cudaError_t err, const bool alwaysReport = false) {
    if (cudaSuccess != err) {
        std::cerr << "CUDA error: " << cudaGetErrorString(err) << std::endl;
        exit(-1);
    } else if (alwaysReport) {
        cudaError_t lastErr = cudaGetLastError();
        if (cudaSuccess != lastErr) {
            std::cerr << "CUDA error: " << cudaGetErrorString(lastErr) << std::endl;
            exit(-1);
        }
    }
}
"#;

const HIP_UTIL_H: &str = r#"#pragma once

#include <iostream>

#include <hip/hip_runtime.h>

inline void checkHipError(const hipError_t err, const bool alwaysReport = false) {
    if (hipSuccess != err) {
        std::cerr << "HIP error: " << hipGetErrorString(err) << std::endl;
        exit(-1);
    } else if (alwaysReport) {
        hipError_t lastErr = hipGetLastError();
        if (hipSuccess != lastErr) {
            std::cerr << "HIP error: " << hipGetErrorString(lastErr) << std::endl;
            exit(-1);
        }
    }
}
"#;

const SYCL_UTIL_H: &str = r#"#pragma once

#include <sycl/sycl.hpp>
"#;

/// The headers every generated tree needs at its root, in write order.
pub fn root_assets() -> Vec<GeneratedFile> {
    vec![
        GeneratedFile {
            name: "util.h".to_string(),
            content: UTIL_H.to_string(),
        },
        GeneratedFile {
            name: "cuda-util.h".to_string(),
            content: CUDA_UTIL_H.to_string(),
        },
        GeneratedFile {
            name: "hip-util.h".to_string(),
            content: HIP_UTIL_H.to_string(),
        },
        GeneratedFile {
            name: "sycl-util.h".to_string(),
            content: SYCL_UTIL_H.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_output_matches_the_harness_contract() {
        assert!(UTIL_H.contains("\" ms\""));
        assert!(UTIL_H.contains("MLUP/s:"));
        assert!(UTIL_H.contains("\" GB/s\""));
        assert!(UTIL_H.contains("\" GFLOP/s\""));
        assert!(UTIL_H.contains("constexpr size_t ceilingDivide"));
        assert!(UTIL_H.contains("constexpr size_t ceilToMultipleOf"));
    }

    #[test]
    fn asset_names_match_the_generated_includes() {
        let names: Vec<String> = root_assets().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["util.h", "cuda-util.h", "hip-util.h", "sycl-util.h"]);
    }
}
