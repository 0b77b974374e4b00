//! Loop-based host-launched backends: sequential, OpenMP host, OpenMP
//! target offload and OpenACC. All four lower a kernel to an `inline`
//! function with an explicit loop nest; they differ only in the pragma
//! placed in front of it and in the read-pointer qualifier.

use super::{pointer_params, ReadQualifier};
use crate::codegen::{assemble, Backend};
use crate::error::Result;
use crate::ir::expr::render_body;
use crate::ir::{Application, Kernel, Subscript};

pub(super) fn definition(
    kernel: &Kernel,
    reads: ReadQualifier,
    const_scalars: bool,
    pragma: Option<String>,
) -> String {
    let conv = Subscript::Bracket;
    let body = assemble::loop_nest(&kernel.it_space, render_body(&kernel.body, conv), conv);
    let pragma = match pragma {
        Some(p) => format!("{p}\n"),
        None => String::new(),
    };

    format!(
        "{template}inline void {fct}({params}) {{\n{pragma}{body}\n}}\n",
        template = assemble::template_line(kernel),
        fct = kernel.fct_name(),
        params = pointer_params(kernel, reads, const_scalars),
        pragma = pragma,
        body = body,
    )
}

pub(super) fn launch(kernel: &Kernel) -> String {
    format!(
        "{}({});",
        kernel.fct_name(),
        assemble::launch_args(kernel, false)
    )
}

pub(super) fn omp_target_pragma(kernel: &Kernel) -> String {
    let collapse = if kernel.dims() > 1 {
        format!(" collapse({})", kernel.dims())
    } else {
        String::new()
    };
    format!("#pragma omp target teams distribute parallel for{collapse}")
}

pub(super) fn openacc_pragma(kernel: &Kernel) -> String {
    let conv = Subscript::Bracket;
    let present: Vec<String> = kernel
        .reads
        .iter()
        .chain(kernel.writes.iter())
        .map(|f| format!("{}[0 : {}]", f.name, f.total_size().render(conv)))
        .collect();
    let collapse = if kernel.dims() > 1 {
        format!(" collapse({})", kernel.dims())
    } else {
        String::new()
    };
    format!(
        "#pragma acc parallel loop present ({}){}",
        present.join(", "),
        collapse
    )
}

pub(super) fn application(backend: Backend, app: &Application) -> Result<String> {
    let body = assemble::standard_body(backend, app)?;

    // Managed-memory OpenMP offload relies on unified shared memory; the
    // requires directive sits between the include and the kernels.
    let frame = if backend == Backend::OmpTargetMm {
        format!(
            "#include \"{}-util.h\"\n\n\n#pragma omp requires unified_shared_memory\n\n\n",
            app.name
        )
    } else {
        format!("#include \"{}-util.h\"\n\n\n", app.name)
    };

    Ok(format!("{frame}{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Expr, IterDim, Stmt, Variable};

    fn stream_kernel(backend: Backend) -> Kernel {
        let nx = Variable::size_t("nx");
        let i0 = Variable::size_t("i0");
        let src = backend.field("src", "tpe", vec![Expr::var(&nx)]);
        let dest = backend.field("dest", "tpe", vec![Expr::var(&nx)]);
        let body = Stmt::assign(
            dest.access(&[Expr::var(&i0)]),
            src.access(&[Expr::var(&i0)]) + 1i64,
        );
        Kernel::new(
            "stream",
            vec![],
            vec![src],
            vec![dest],
            vec![IterDim::new(i0, 0i64, Expr::var(&nx))],
            vec![body],
            1,
        )
    }

    #[test]
    fn serial_definition_uses_strong_read_qualifier() {
        let k = stream_kernel(Backend::Serial);
        let code = kernel_def(Backend::Serial, &k);
        assert!(code.contains(
            "inline void stream(const tpe * const __restrict__ src, tpe *__restrict__ dest)"
        ));
        assert!(code.contains("for (size_t i0 = 0; i0 < nx; ++i0) {\ndest[i0] = src[i0] + 1;\n}"));
        assert!(code.starts_with("template<typename tpe>\n"));
    }

    #[test]
    fn omp_host_definition_carries_the_parallel_for_pragma() {
        let k = stream_kernel(Backend::OmpHost);
        let code = kernel_def(Backend::OmpHost, &k);
        assert!(code.contains("const tpe *__restrict__ src"));
        assert!(code.contains("#pragma omp parallel for schedule (static)\nfor (size_t i0 = 0;"));
    }

    #[test]
    fn omp_target_collapses_multidimensional_nests() {
        let nx = Variable::size_t("nx");
        let ny = Variable::size_t("ny");
        let mut k = stream_kernel(Backend::OmpTargetExpl);
        k.it_space = vec![
            IterDim::new(Variable::size_t("i0"), 0i64, Expr::var(&nx)),
            IterDim::new(Variable::size_t("i1"), 0i64, Expr::var(&ny)),
        ];
        assert_eq!(
            omp_target_pragma(&k),
            "#pragma omp target teams distribute parallel for collapse(2)"
        );
        let k1 = stream_kernel(Backend::OmpTargetExpl);
        assert_eq!(
            omp_target_pragma(&k1),
            "#pragma omp target teams distribute parallel for"
        );
    }

    #[test]
    fn openacc_pragma_lists_reads_then_writes_in_present_clause() {
        let k = stream_kernel(Backend::OpenAccExpl);
        assert_eq!(
            openacc_pragma(&k),
            "#pragma acc parallel loop present (src[0 : nx], dest[0 : nx])"
        );
    }

    #[test]
    fn launch_passes_host_names_in_parameter_order() {
        let k = stream_kernel(Backend::Serial);
        assert_eq!(launch(&k), "stream(src, dest);");
    }

    fn kernel_def(backend: Backend, k: &Kernel) -> String {
        super::super::kernel_definition(backend, k).unwrap()
    }
}
