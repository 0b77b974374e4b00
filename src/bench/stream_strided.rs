//! Strided stream: the copy-with-increment kernel reading and writing at
//! configurable strides. Storage is over-allocated to the larger stride so
//! both access patterns stay in bounds.
//!
//! Elements touched per iteration depend on the stride pair, so there is
//! no per-element closed form; the check bounds the sum over the whole
//! buffer instead.

use crate::codegen::assemble;
use crate::codegen::backend::util_header::parse_kernel;
use crate::codegen::Backend;
use crate::ir::{Application, Expr, IterDim, Kernel, Step, Stmt, Subscript, Variable};

use super::{full_space, index_exprs, iterators, size_vars, BenchSpec};

const DEFAULTS: &[&str] = &["double", "67108864", "1", "1", "2", "10"];

pub fn spec() -> BenchSpec {
    BenchSpec {
        name: "stream-strided",
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

    let stride_read = Variable::size_t("strideRead");
    let stride_write = Variable::size_t("strideWrite");
    let parameters = vec![stride_read.clone(), stride_write.clone()];

    let extent = Expr::var(&sizes[0])
        * Expr::call(
            "std::max",
            vec![Expr::var(&stride_read), Expr::var(&stride_write)],
        );
    let ext_space = vec![IterDim::new(its[0].clone(), 0i64, extent.clone())];

    let src = backend.field("src", "tpe", vec![extent.clone()]);
    let dest = backend.field("dest", "tpe", vec![extent]);
    let fields = vec![dest.clone(), src.clone()];

    let mut variables = sizes.clone();
    variables.extend(parameters.iter().cloned());

    let steps = if Backend::UtilHeader == backend {
        let conv = Subscript::Bracket;
        let sum_loop = assemble::loop_nest(
            &ext_space,
            format!("total += {};", src.access(&idx).render(conv)),
            conv,
        );
        let check_body = format!(
            "tpe total = 0;\n{sum_loop}\n\n\
             if (total <= 0 || total > nx * nIt)\n\
             std::cerr << \"StreamStrided check failed \" << \" (expected value between 0+ and \" \
             << nx * nIt << \" but got \" << total << \")\" << std::endl;"
        );

        let mut check_vars = sizes.clone();
        check_vars.push(Variable::size_t("nIt"));
        check_vars.extend(parameters.iter().cloned());

        vec![
            Step::Compute(Kernel::new(
                "initStreamStrided",
                variables.clone(),
                vec![],
                fields.clone(),
                ext_space,
                vec![
                    Stmt::assign(src.access(&idx), Expr::cast(Expr::Int(0))),
                    Stmt::assign(dest.access(&idx), Expr::cast(Expr::Int(0))),
                ],
                0,
            )),
            Step::Compute(Kernel::new(
                "checkSolutionStreamStrided",
                check_vars,
                fields,
                vec![],
                vec![],
                vec![Stmt::raw(check_body)],
                0,
            )),
            Step::Compute(parse_kernel(&sizes, &parameters, DEFAULTS)),
        ]
    } else {
        vec![
            Step::Compute(Kernel::new(
                "stream-strided",
                variables,
                vec![src.clone()],
                vec![dest.clone()],
                space,
                vec![Stmt::assign(
                    dest.access(&[Expr::var(&its[0]) * Expr::var(&stride_write)]),
                    src.access(&[Expr::var(&its[0]) * Expr::var(&stride_read)]) + 1i64,
                )],
                1,
            )),
            Step::Pseudo(format!(
                "std::swap({}, {});",
                src.device_name, dest.device_name
            )),
        ]
    };

    Application::new("stream-strided", sizes, parameters, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_scale_the_read_and_write_indices() {
        let app = compose(Backend::Serial);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.fct_name(), "streamstrided");
        assert_eq!(
            k.body[0].render(Subscript::Bracket),
            "dest[i0 * strideWrite] = src[i0 * strideRead] + 1;"
        );
        // the launch space stays at nx items; only addressing is strided
        assert_eq!(k.it_space[0].upper.to_string(), "nx");
    }

    #[test]
    fn storage_is_sized_to_the_larger_stride() {
        let app = compose(Backend::Serial);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(
            k.writes[0].extents[0].to_string(),
            "nx * std::max(strideRead, strideWrite)"
        );
    }

    #[test]
    fn check_bounds_the_total_instead_of_element_values() {
        let app = compose(Backend::UtilHeader);
        let check = app.steps[1].kernel().unwrap();
        let names: Vec<&str> = check.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["nx", "nIt", "strideRead", "strideWrite"]);
        let body = check.body[0].render(Subscript::Bracket);
        assert!(body.starts_with(
            "tpe total = 0;\nfor (size_t i0 = 0; i0 < nx * std::max(strideRead, strideWrite); ++i0) {"
        ));
        assert!(body.contains("total += src[i0];"));
        assert!(body.contains("if (total <= 0 || total > nx * nIt)"));
        assert!(body.contains("StreamStrided check failed "));
    }

    #[test]
    fn init_covers_the_over_allocated_buffer() {
        let app = compose(Backend::UtilHeader);
        let init = app.steps[0].kernel().unwrap();
        assert_eq!(
            init.it_space[0].upper.to_string(),
            "nx * std::max(strideRead, strideWrite)"
        );
    }
}
