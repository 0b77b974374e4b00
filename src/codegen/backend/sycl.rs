//! SYCL: queue-submitted lambdas, in three memory flavors.
//!
//! The pointer flavors (explicit device allocations and shared
//! allocations) take raw pointers plus the queue; the buffer flavor takes
//! `sycl::buffer` references and opens accessors inside the command group.
//! Multi-dimensional kernels use an `nd_range` whose dimensions are listed
//! slowest-first, the reverse of the iteration-space order.

use super::{pointer_params, ReadQualifier};
use crate::codegen::{assemble, Backend};
use crate::error::Result;
use crate::ir::{Application, Field, Kernel, Subscript};

fn parallel_for(backend: Backend, kernel: &Kernel) -> Result<String> {
    let conv = Subscript::Bracket;
    let dims = kernel.dims();
    let guarded = assemble::guarded_body(kernel, conv);

    if dims == 1 {
        let dim = &kernel.it_space[0];
        return Ok(format!(
            "h.parallel_for({upper}, [=](auto {it}) {{\n{guarded}\n}});",
            upper = dim.upper.render(conv),
            it = dim.it.name,
        ));
    }

    let tiles = backend.tile_sizes(dims)?;
    let mut global: Vec<String> = kernel
        .it_space
        .iter()
        .zip(tiles)
        .map(|(dim, t)| format!("ceilToMultipleOf({}, {t})", dim.upper.render(conv)))
        .collect();
    global.reverse();
    let mut local: Vec<String> = tiles.iter().map(|t| t.to_string()).collect();
    local.reverse();

    let its: Vec<String> = kernel
        .it_space
        .iter()
        .enumerate()
        .map(|(d, dim)| {
            format!(
                "const auto {} = item.get_global_id({});",
                dim.it.name,
                dims - d - 1
            )
        })
        .collect();

    Ok(format!(
        "h.parallel_for(sycl::nd_range<{dims}>(sycl::range<{dims}>({global}), sycl::range<{dims}>({local})), [=](sycl::nd_item<{dims}> item) {{\n{its}\n\n{guarded}\n}});",
        global = global.join(", "),
        local = local.join(", "),
        its = its.join("\n"),
    ))
}

fn function(kernel: &Kernel, params: String, queue_op: String) -> String {
    format!(
        "{template}inline void {fct}({params}) {{\n{queue_op}\n}}\n",
        template = assemble::template_line(kernel),
        fct = kernel.fct_name(),
    )
}

pub(super) fn pointer_definition(backend: Backend, kernel: &Kernel) -> Result<String> {
    let params = format!(
        "sycl::queue &q, {}",
        pointer_params(kernel, ReadQualifier::ConstPtrConst, false)
    );
    let queue_op = format!(
        "q.submit([&](sycl::handler &h) {{\n{}\n}});",
        parallel_for(backend, kernel)?
    );
    Ok(function(kernel, params, queue_op))
}

fn access_mode(kernel: &Kernel, field: &Field) -> &'static str {
    let read = kernel.reads.contains(field);
    let written = kernel.writes.contains(field);
    if read && written {
        "sycl::read_write"
    } else if read {
        "sycl::read_only"
    } else {
        "sycl::write_only"
    }
}

pub(super) fn buffer_definition(backend: Backend, kernel: &Kernel) -> Result<String> {
    let mut params = vec!["sycl::queue &q".to_string()];
    params.extend(
        kernel
            .param_fields()
            .iter()
            .map(|f| format!("sycl::buffer<{}> &{}", f.tpe, f.device_name)),
    );
    params.extend(assemble::scalar_params(kernel, false));

    let accessors: Vec<String> = kernel
        .param_fields()
        .iter()
        .map(|f| {
            format!(
                "auto {} = {}.get_access(h, {});",
                f.name,
                f.device_name,
                access_mode(kernel, f)
            )
        })
        .collect();

    let queue_op = format!(
        "q.submit([&](sycl::handler &h) {{\n{accessors}\n\n{pf}\n}});",
        accessors = accessors.join("\n"),
        pf = parallel_for(backend, kernel)?,
    );
    Ok(function(kernel, params.join(", "), queue_op))
}

pub(super) fn launch(kernel: &Kernel) -> String {
    format!(
        "{}(q, {});",
        kernel.fct_name(),
        assemble::launch_args(kernel, true)
    )
}

const QUEUE_DECL: &str = "sycl::queue q(sycl::property::queue::in_order{}); // in-order queue to remove need for waits after each kernel";

pub(super) fn application(backend: Backend, app: &Application) -> Result<String> {
    let includes = format!(
        "#include \"{}-util.h\"\n\n#include \"../../sycl-util.h\"\n\n\n",
        app.name
    );

    let middle = if backend == Backend::SyclBuffer {
        // Buffers live in an inner scope; their destruction at the closing
        // brace writes results back to the host arrays.
        let buffers: Vec<String> = app
            .fields
            .iter()
            .filter_map(|f| backend.device_allocate(f))
            .collect();
        format!(
            "{{\n{buffers}\n\n{middle}\n}} // implicit D-H copy of destroyed buffers\n",
            buffers = buffers.join("\n"),
            middle = assemble::main_middle(backend, app)?,
        )
    } else {
        assemble::main_middle(backend, app)?
    };

    Ok(format!(
        "{includes}{decls}\n\n{start}\n{queue}\n\n{alloc_init}\n{middle}\n{end}\n\n{wrapper}",
        decls = assemble::kernel_decls(backend, app)?,
        start = assemble::main_start(app),
        queue = QUEUE_DECL,
        alloc_init = assemble::main_allocate_and_init(backend, app),
        middle = middle,
        end = assemble::main_end(backend, app),
        wrapper = assemble::main_wrapper(),
    ))
}
