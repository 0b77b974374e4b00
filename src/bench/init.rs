//! Init: write-only first-touch benchmark. `data[i] = i`, so the check
//! compares every element against its own index.

use crate::codegen::backend::util_header::{check_kernel, parse_kernel};
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Kernel, Step, Stmt};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "67108864", "2", "10"];

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "init",
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

    let data = backend.field("data", "tpe", vec![Expr::var(&sizes[0])]);

    let steps = if Backend::UtilHeader == backend {
        vec![
            Step::Compute(Kernel::new(
                "initInit",
                sizes.clone(),
                vec![],
                vec![data.clone()],
                space.clone(),
                vec![Stmt::assign(data.access(&idx), Expr::cast(Expr::Int(0)))],
                0,
            )),
            Step::Compute(check_kernel(
                "Init",
                vec![data.clone()],
                &sizes,
                &[],
                space,
                Expr::var(&its[0]),
                data.access(&idx),
            )),
            Step::Compute(parse_kernel(&sizes, &[], DEFAULTS)),
        ]
    } else {
        vec![Step::Compute(Kernel::new(
            "init",
            sizes.clone(),
            vec![],
            vec![data.clone()],
            space,
            vec![Stmt::assign(data.access(&idx), Expr::var(&its[0]))],
            0,
        ))]
    };

    Application::new("init", sizes, vec![], steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Subscript;

    #[test]
    fn device_kernel_writes_the_index() {
        let app = compose(Backend::Serial);
        assert_eq!(app.steps.len(), 1);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.body[0].render(Subscript::Bracket), "data[i0] = i0;");
        assert_eq!(k.num_flop, 0);
        assert!(k.reads.is_empty());
    }

    #[test]
    fn check_compares_each_element_against_its_index() {
        let app = compose(Backend::UtilHeader);
        let check = app.steps[1].kernel().unwrap();
        let body = check.body[0].render(Subscript::Bracket);
        assert!(body.contains("if ((tpe)(i0) != data[i0]) {"));
    }
}
