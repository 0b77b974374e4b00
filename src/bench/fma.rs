//! FMA: a long dependent chain of fused multiply-adds per element,
//! measuring peak arithmetic throughput rather than bandwidth. The store
//! is guarded by a condition the chain can never satisfy, so the compiler
//! keeps the loop without the result polluting memory traffic.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Kernel, Step, Stmt};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "64", "1", "2"];
const NUM_REP: u64 = 1024 * 1024;

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "fma",
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

    let data = backend.field("data", "tpe", vec![Expr::var(&sizes[0])]);

    let steps = if Backend::UtilHeader == backend {
        vec![
            Step::Compute(Kernel::new(
                "initFma",
                sizes.clone(),
                vec![],
                vec![data.clone()],
                space.clone(),
                vec![Stmt::assign(data.access(&idx), Expr::cast(Expr::Int(1)))],
                0,
            )),
            Step::Compute(check_kernel(
                "Fma",
                vec![data.clone()],
                &sizes,
                &[],
                space,
                Expr::cast(Expr::Int(1)),
                data.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &[], DEFAULTS)),
        ]
    } else {
        let body = vec![
            Stmt::raw("tpe a = (tpe)0.5, b = (tpe)1;"),
            Stmt::raw("// dummy op to prevent compiler from solving loop analytically"),
            Stmt::raw("if (1 == nx) {"),
            Stmt::raw("auto tmp = b; b = a; a = tmp;"),
            Stmt::raw("}"),
            Stmt::raw(""),
            Stmt::raw("tpe acc = i0;"),
            Stmt::raw(""),
            Stmt::raw(format!("for (auto r = 0; r < {NUM_REP}; ++r)")),
            Stmt::raw("acc = a * acc + b;"),
            Stmt::raw(""),
            Stmt::raw("// dummy check to prevent compiler from eliminating loop"),
            Stmt::raw("if ((tpe)0 == acc)"),
            Stmt::assign(data.access(&idx), Expr::raw("acc")),
        ];
        vec![Step::Compute(Kernel::new(
            "fma",
            sizes.clone(),
            vec![],
            vec![data.clone()],
            space,
            body,
            2 * NUM_REP,
        ))]
    };

    Application::new("fma", sizes, vec![], steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{render_body, Subscript};

    #[test]
    fn chain_length_and_flops_agree() {
        let app = compose(Backend::Serial);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.num_flop, 2 * NUM_REP);
        let body = render_body(&k.body, Subscript::Bracket);
        assert!(body.contains("for (auto r = 0; r < 1048576; ++r)\nacc = a * acc + b;"));
        assert!(body.ends_with("if ((tpe)0 == acc)\ndata[i0] = acc;"));
    }

    #[test]
    fn check_expects_the_untouched_seed_value() {
        let app = compose(Backend::UtilHeader);
        let check = app.steps[1].kernel().unwrap();
        let body = check.body[0].render(Subscript::Bracket);
        assert!(body.contains("if ((tpe)((tpe)1) != data[i0]) {"));
    }
}
