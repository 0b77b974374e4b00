//! Stream: element-wise copy with increment, the canonical bandwidth
//! benchmark. `dest[i] = src[i] + 1`, ping-ponged via pointer swap so the
//! result is `i0 + nIt` after `nIt` iterations.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Kernel, Step, Stmt, Variable};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "67108864", "2", "10"];

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "stream",
        group: "benchmark",
        metric: "bandwidth",
        default_parameters: DEFAULTS,
        dimensionality: 1,
        compose,
    }
}

fn compose(backend: Backend) -> Application {
    let its = iterators(1);
    let sizes = size_vars(1);
    let idx = index_exprs(&its);
    let space = full_space(&its, &sizes);

    let src = backend.field("src", "tpe", vec![Expr::var(&sizes[0])]);
    let dest = backend.field("dest", "tpe", vec![Expr::var(&sizes[0])]);
    let fields = vec![dest.clone(), src.clone()];

    let steps = if Backend::UtilHeader == backend {
        vec![
            Step::Compute(Kernel::new(
                "initStream",
                sizes.clone(),
                vec![],
                fields.clone(),
                space.clone(),
                vec![
                    Stmt::assign(src.access(&idx), Expr::cast(Expr::var(&its[0]))),
                    Stmt::assign(dest.access(&idx), Expr::cast(Expr::Int(0))),
                ],
                0,
            )),
            Step::Compute(check_kernel(
                "Stream",
                fields,
                &sizes,
                &[],
                space,
                Expr::var(&its[0]) + Expr::var(&Variable::size_t("nIt")),
                src.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &[], DEFAULTS)),
        ]
    } else {
        vec![
            Step::Compute(Kernel::new(
                "stream",
                sizes.clone(),
                vec![src.clone()],
                vec![dest.clone()],
                space,
                vec![Stmt::assign(dest.access(&idx), src.access(&idx) + 1i64)],
                1,
            )),
            Step::Pseudo(format!(
                "std::swap({}, {});",
                src.device_name, dest.device_name
            )),
        ]
    };

    Application::new("stream", sizes, vec![], steps)
}
