//! Square root: a dependent chain of `sqrt` calls per element. Seeded with
//! one, the chain is a fixed point, so verification compares against the
//! seed while the hardware still executes every iteration.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Kernel, Step, Stmt};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "64", "1", "2"];
const NUM_REP: u64 = 64 * 1024;

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "square-root",
        group: "benchmark",
        metric: "compute",
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
                "initSquareRoot",
                sizes.clone(),
                vec![],
                fields.clone(),
                space.clone(),
                vec![
                    Stmt::assign(src.access(&idx), Expr::cast(Expr::Int(1))),
                    Stmt::assign(dest.access(&idx), Expr::cast(Expr::Int(0))),
                ],
                0,
            )),
            Step::Compute(check_kernel(
                "SquareRoot",
                fields,
                &sizes,
                &[],
                space,
                Expr::cast(Expr::Int(1)),
                src.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &[], DEFAULTS)),
        ]
    } else {
        let body = vec![
            Stmt::assign(Expr::raw("tpe acc"), src.access(&idx)),
            Stmt::raw(""),
            Stmt::raw(format!("for (auto r = 0; r < {NUM_REP}; ++r)")),
            Stmt::raw("acc = sqrt(acc);"),
            Stmt::raw(""),
            Stmt::assign(dest.access(&idx), Expr::raw("acc")),
        ];
        vec![
            Step::Compute(Kernel::new(
                "square-root",
                sizes.clone(),
                vec![src.clone()],
                vec![dest.clone()],
                space,
                body,
                NUM_REP,
            )),
            Step::Pseudo(format!(
                "std::swap({}, {});",
                src.device_name, dest.device_name
            )),
        ]
    };

    Application::new("square-root", sizes, vec![], steps)
}
