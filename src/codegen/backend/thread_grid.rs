//! CUDA and HIP: `__global__` kernels indexed by a thread grid.
//!
//! Both runtimes share the kernel shape (per-dimension thread id, bounds
//! guard, triple-chevron launch); they differ in the read-pointer
//! qualifier and in whether a 1-D launch configuration may omit `dim3`.

use super::{pointer_params, ReadQualifier};
use crate::codegen::{assemble, Backend};
use crate::error::Result;
use crate::ir::{Application, Kernel, Subscript};

const DIM_CHARS: [char; 3] = ['x', 'y', 'z'];

pub(super) fn definition(kernel: &Kernel, reads: ReadQualifier) -> String {
    let conv = Subscript::Bracket;

    let tids: Vec<String> = kernel
        .it_space
        .iter()
        .zip(DIM_CHARS)
        .map(|(dim, c)| {
            format!(
                "const {} {} = blockIdx.{c} * blockDim.{c} + threadIdx.{c};",
                dim.it.tpe, dim.it.name
            )
        })
        .collect();

    format!(
        "{template}__global__ void {fct}({params}) {{\n{tids}\n\n{guarded}\n}}\n",
        template = assemble::template_line(kernel),
        fct = kernel.fct_name(),
        params = pointer_params(kernel, reads, false),
        tids = tids.join("\n"),
        guarded = assemble::guarded_body(kernel, conv),
    )
}

/// `ceilingDivide(upper, tile)` per dimension, against the backend's tile
/// configuration.
fn launch_config(backend: Backend, kernel: &Kernel) -> Result<(String, String)> {
    let conv = Subscript::Bracket;
    let tiles = backend.tile_sizes(kernel.dims())?;

    let block_size: Vec<String> = tiles.iter().map(|t| t.to_string()).collect();
    let num_blocks: Vec<String> = kernel
        .it_space
        .iter()
        .zip(tiles)
        .map(|(dim, t)| format!("ceilingDivide({}, {t})", dim.upper.render(conv)))
        .collect();

    Ok((num_blocks.join(", "), block_size.join(", ")))
}

pub(super) fn cuda_launch(backend: Backend, kernel: &Kernel) -> Result<String> {
    let (mut num_blocks, mut block_size) = launch_config(backend, kernel)?;
    if kernel.dims() > 1 {
        num_blocks = format!("dim3({num_blocks})");
        block_size = format!("dim3({block_size})");
    }
    Ok(format!(
        "{}<<<{num_blocks}, {block_size}>>>({});",
        kernel.fct_name(),
        assemble::launch_args(kernel, true)
    ))
}

pub(super) fn hip_launch(backend: Backend, kernel: &Kernel) -> Result<String> {
    let (num_blocks, block_size) = launch_config(backend, kernel)?;
    Ok(format!(
        "{}<<<dim3({num_blocks}), dim3({block_size})>>>({});",
        kernel.fct_name(),
        assemble::launch_args(kernel, true)
    ))
}

pub(super) fn application(
    backend: Backend,
    app: &Application,
    runtime_util: &str,
) -> Result<String> {
    let body = assemble::standard_body(backend, app)?;
    Ok(format!(
        "#include \"{bench}-util.h\"\n\n#include \"../../{runtime_util}\"\n\n\n{body}",
        bench = app.name,
    ))
}
