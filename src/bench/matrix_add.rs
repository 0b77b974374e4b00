//! Matrix add: `c = a + b` over a 2-D grid, with a ping-pong swap of `c`
//! and `a`. Starting from `a = 1`, `b = 2`, every iteration adds 2, so
//! element values close at `1 + 2 * nIt`.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Kernel, Step, Stmt, Variable};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "4096", "4096", "2", "10"];

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "matrix-add",
        group: "benchmark",
        metric: "bandwidth",
        default_parameters: DEFAULTS,
        dimensionality: 2,
        compose,
    }
}

fn compose(backend: Backend) -> Application {
    let its = iterators(2);
    let sizes = size_vars(2);
    let idx = index_exprs(&its);
    let space = full_space(&its, &sizes);
    let extents: Vec<Expr> = sizes.iter().map(Expr::var).collect();

    let a = backend.field("a", "tpe", extents.clone());
    let b = backend.field("b", "tpe", extents.clone());
    let c = backend.field("c", "tpe", extents);
    let fields = vec![a.clone(), b.clone(), c.clone()];

    let steps = if Backend::UtilHeader == backend {
        vec![
            Step::Compute(Kernel::new(
                "initMatrixAdd",
                sizes.clone(),
                vec![],
                fields.clone(),
                space.clone(),
                vec![
                    Stmt::assign(a.access(&idx), Expr::cast(Expr::Int(1))),
                    Stmt::assign(b.access(&idx), Expr::cast(Expr::Int(2))),
                    Stmt::assign(c.access(&idx), Expr::cast(Expr::Int(0))),
                ],
                0,
            )),
            Step::Compute(check_kernel(
                "MatrixAdd",
                fields,
                &sizes,
                &[],
                space,
                Expr::Int(1) + Expr::Int(2) * Expr::var(&Variable::size_t("nIt")),
                a.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &[], DEFAULTS)),
        ]
    } else {
        vec![
            Step::Compute(Kernel::new(
                "matrix-add",
                sizes.clone(),
                vec![a.clone(), b.clone()],
                vec![c.clone()],
                space,
                vec![Stmt::assign(c.access(&idx), a.access(&idx) + b.access(&idx))],
                1,
            )),
            Step::Pseudo(format!(
                "std::swap({}, {});",
                c.device_name, a.device_name
            )),
        ]
    };

    Application::new("matrix-add", sizes, vec![], steps)
}
