//! Strided FMA: the fused multiply-add chain of the plain variant, but
//! launched over `nx * stride` work items of which only every stride-th
//! one computes. Exposes the cost of divergent or idle lanes on wide
//! architectures.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, IterDim, Kernel, Step, Stmt, Variable};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "64", "1", "0", "4"];
const NUM_REP: u64 = 64 * 1024;

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "fma-strided",
        group: "benchmark",
        metric: "flops",
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

    let stride = Variable::size_t("stride");
    let parameters = vec![stride.clone()];

    // every element spawns `stride` work items; only one of them computes
    let kernel_space = vec![IterDim::new(
        its[0].clone(),
        0i64,
        Expr::var(&sizes[0]) * Expr::var(&stride),
    )];

    let data = backend.field("data", "tpe", vec![Expr::var(&sizes[0])]);

    let steps = if Backend::UtilHeader == backend {
        let mut init_vars = sizes.clone();
        init_vars.extend(parameters.iter().cloned());
        vec![
            Step::Compute(Kernel::new(
                "initFmaStrided",
                init_vars,
                vec![],
                vec![data.clone()],
                space.clone(),
                vec![Stmt::assign(data.access(&idx), Expr::cast(Expr::Int(1)))],
                0,
            )),
            Step::Compute(check_kernel(
                "FmaStrided",
                vec![data.clone()],
                &sizes,
                &parameters,
                space,
                Expr::cast(Expr::Int(1)),
                data.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &parameters, DEFAULTS)),
        ]
    } else {
        let mut variables = sizes.clone();
        variables.extend(parameters.iter().cloned());
        let body = vec![
            Stmt::raw("tpe a = (tpe)0.5, b = (tpe)1;"),
            Stmt::raw("// dummy op to prevent compiler from solving loop analytically"),
            Stmt::raw("if (1 == nx) {"),
            Stmt::raw("auto tmp = b; b = a; a = tmp;"),
            Stmt::raw("}"),
            Stmt::raw(""),
            Stmt::raw("tpe acc = i0;"),
            Stmt::raw(""),
            Stmt::raw("if (0 == i0 % stride)"),
            Stmt::raw(format!("for (auto r = 0; r < {NUM_REP}; ++r)")),
            Stmt::raw("acc = a * acc + b;"),
            Stmt::raw(""),
            Stmt::raw("// dummy check to prevent compiler from eliminating loop"),
            Stmt::raw("if ((tpe)0 == acc)"),
            Stmt::assign(
                data.access(&[Expr::var(&its[0]) / Expr::var(&stride)]),
                Expr::raw("acc"),
            ),
        ];
        vec![Step::Compute(Kernel::new(
            "fma-strided",
            variables,
            vec![],
            vec![data.clone()],
            kernel_space,
            body,
            2 * NUM_REP,
        ))]
    };

    Application::new("fma-strided", sizes, parameters, steps)
}
