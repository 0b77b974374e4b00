//! Kokkos: view-based kernels over `RangePolicy`/`MDRangePolicy`, with a
//! custom program frame around `Kokkos::initialize`/`finalize`.
//!
//! One source file serves all three execution spaces; the space is chosen
//! by the library the file is linked against.

use crate::codegen::{assemble, Backend};
use crate::error::Result;
use crate::ir::expr::render_body;
use crate::ir::{Application, Kernel, Subscript};

pub(super) fn definition(kernel: &Kernel) -> String {
    let conv = Subscript::Paren;

    let view = |f: &crate::ir::Field| format!("Kokkos::View<{} {}>", f.tpe, "*".repeat(f.dims()));
    let mut params: Vec<String> = kernel
        .read_only_fields()
        .iter()
        .map(|f| format!("const {} &{}", view(f), f.name))
        .collect();
    params.extend(
        kernel
            .writes
            .iter()
            .map(|f| format!("{} &{}", view(f), f.name)),
    );
    params.extend(assemble::scalar_params(kernel, false));

    let bounds = if kernel.dims() == 1 {
        let dim = &kernel.it_space[0];
        format!(
            "Kokkos::RangePolicy<>({}, {})",
            dim.lower.render(conv),
            dim.upper.render(conv)
        )
    } else {
        let lowers: Vec<String> = kernel
            .it_space
            .iter()
            .map(|d| d.lower.render(conv))
            .collect();
        let uppers: Vec<String> = kernel
            .it_space
            .iter()
            .map(|d| d.upper.render(conv))
            .collect();
        format!(
            "Kokkos::MDRangePolicy<Kokkos::Rank<{}>, Kokkos::Schedule<Kokkos::Static> >({{{}}}, {{{}}})",
            kernel.dims(),
            lowers.join(", "),
            uppers.join(", ")
        )
    };

    let its: Vec<String> = kernel
        .it_space
        .iter()
        .map(|d| format!("const {}", d.it.decl()))
        .collect();

    format!(
        "{template}inline void {fct}({params}) {{\n\
         Kokkos::parallel_for({bounds}, //\n\
         KOKKOS_LAMBDA({its}) {{ //\n\
         {body} \\\n\
         }});\n\
         }}\n",
        template = assemble::template_line(kernel),
        fct = kernel.fct_name(),
        params = params.join(", "),
        bounds = bounds,
        its = its.join(", "),
        body = render_body(&kernel.body, conv),
    )
}

pub(super) fn launch(kernel: &Kernel) -> String {
    format!(
        "{}({});",
        kernel.fct_name(),
        assemble::launch_args(kernel, true)
    )
}

pub(super) fn application(backend: Backend, app: &Application) -> Result<String> {
    let size_list: Vec<&str> = app.sizes.iter().map(|s| s.name.as_str()).collect();
    let size_list = size_list.join(", ");
    let field_list: Vec<String> = app
        .fields
        .iter()
        .map(|f| format!("{}.data()", backend.host_mirror_name(f)))
        .collect();
    let field_list = field_list.join(", ");
    let param_list = if app.parameters.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = app.parameters.iter().map(|p| p.name.as_str()).collect();
        format!(", {}", names.join(", "))
    };

    let views: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.device_allocate(f))
        .collect();
    let mirrors: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.host_allocate(f))
        .collect();

    Ok(format!(
        "#include <Kokkos_Core.hpp>\n\
         \n\
         #include \"{bench}-util.h\"\n\
         \n\
         \n\
         {decls}\n\
         \n\
         {start}\n\
         int c = 1;\n\
         Kokkos::initialize(c, argv);\n\
         {{\n\
         {views}\n\
         \n\
         {mirrors}\n\
         \n\
         // init\n\
         init{postfix}({field_list}, {size_list}{param_list});\n\
         {to_device}\
         \n\
         {middle}\n\
         {to_host}\
         // check solution\n\
         checkSolution{postfix}({field_list}, {size_list}, nIt + nItWarmUp{param_list});\n\
         }}\n\
         Kokkos::finalize();\n\
         \n\
         return 0;\n\
         }}\n\
         \n\
         \n\
         {wrapper}",
        bench = app.name,
        decls = assemble::kernel_decls(backend, app)?,
        start = assemble::main_start(app),
        views = views.join("\n"),
        mirrors = mirrors.join("\n"),
        postfix = app.postfix(),
        field_list = field_list,
        size_list = size_list,
        param_list = param_list,
        to_device = assemble::to_device_copies(backend, app),
        middle = assemble::main_middle(backend, app)?,
        to_host = assemble::to_host_copies(backend, app),
        wrapper = assemble::main_wrapper(),
    ))
}
