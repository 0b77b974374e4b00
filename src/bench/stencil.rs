//! Jacobi-style star stencils in one, two and three dimensions: each
//! interior point becomes the average of its direct neighbors, ping-ponged
//! between `u` and `uNew`.
//!
//! There is no closed-form element value after `nIt` sweeps, so the check
//! reports the residual of the smoothed field instead of comparing
//! element-wise.

use crate::codegen::assemble;
use crate::codegen::backend::util_header::parse_kernel;
use crate::codegen::Backend;
use crate::ir::{Application, Expr, Field, Kernel, Step, Stmt, Subscript, Variable};

use super::{full_space, index_exprs, interior_space, iterators, size_vars, BenchSpec};

const DEFAULTS_1D: &[&str] = &["double", "67108864", "2", "10"];
const DEFAULTS_2D: &[&str] = &["double", "4096", "4096", "2", "10"];
const DEFAULTS_3D: &[&str] = &["double", "256", "256", "256", "2", "10"];

pub fn spec_1d() -> BenchSpec {
    BenchSpec {
        name: "stencil-1d",
        group: "benchmark",
        metric: "bandwidth",
        default_parameters: DEFAULTS_1D,
        dimensionality: 1,
        compose: |backend| compose(backend, 1, "stencil-1d", DEFAULTS_1D),
    }
}

pub fn spec_2d() -> BenchSpec {
    BenchSpec {
        name: "stencil-2d",
        group: "benchmark",
        metric: "bandwidth",
        default_parameters: DEFAULTS_2D,
        dimensionality: 2,
        compose: |backend| compose(backend, 2, "stencil-2d", DEFAULTS_2D),
    }
}

pub fn spec_3d() -> BenchSpec {
    BenchSpec {
        name: "stencil-3d",
        group: "benchmark",
        metric: "bandwidth",
        default_parameters: DEFAULTS_3D,
        dimensionality: 3,
        compose: |backend| compose(backend, 3, "stencil-3d", DEFAULTS_3D),
    }
}

/// Sum of the 2·dims direct neighbors of the current point.
fn neighbor_sum(u: &Field, its: &[Variable]) -> Expr {
    let idx = index_exprs(its);
    let mut accesses = Vec::new();
    for d in 0..its.len() {
        for offset in [-1i64, 1i64] {
            let mut shifted = idx.clone();
            shifted[d] = Expr::var(&its[d]) + offset;
            accesses.push(u.access(&shifted));
        }
    }
    accesses
        .into_iter()
        .reduce(|sum, access| sum + access)
        .unwrap_or(Expr::Int(0))
}

fn averaging_factor(dims: usize) -> Expr {
    match dims {
        1 => Expr::Float(0.5),
        2 => Expr::Float(0.25),
        _ => Expr::Float(1.0) / Expr::Float(6.0),
    }
}

fn compose(backend: Backend, dims: usize, name: &'static str, defaults: &[&str]) -> Application {
    let its = iterators(dims);
    let sizes = size_vars(dims);
    let idx = index_exprs(&its);
    let interior = interior_space(&its, &sizes);
    let extents: Vec<Expr> = sizes.iter().map(Expr::var).collect();

    let u = backend.field("u", "tpe", extents.clone());
    let u_new = backend.field("uNew", "tpe", extents);
    let fields = vec![u.clone(), u_new.clone()];

    let steps = if Backend::UtilHeader == backend {
        let postfix = crate::ir::camel_postfix(name);
        let conv = Subscript::Bracket;

        let on_boundary: Vec<String> = (0..dims)
            .map(|d| {
                format!(
                    "0 == {it} || {size} - 1 == {it}",
                    it = its[d].name,
                    size = sizes[d].name
                )
            })
            .collect();
        let init_body = format!(
            "if ({}) {{\n{} = (tpe)0;\n{} = (tpe)0;\n}} else {{\n{} = (tpe)1;\n{} = (tpe)1;\n}}",
            on_boundary.join(" || "),
            u.access(&idx).render(conv),
            u_new.access(&idx).render(conv),
            u.access(&idx).render(conv),
            u_new.access(&idx).render(conv),
        );

        let local_res =
            Expr::Int(2 * dims as i64) * u.access(&idx) - neighbor_sum(&u, &its);
        let residual_loops = assemble::loop_nest(
            &interior,
            format!(
                "const tpe localRes = {};\nres += localRes * localRes;",
                local_res.render(conv)
            ),
            conv,
        );
        let check_body = format!(
            "tpe res = 0;\n{residual_loops}\n\nres = sqrt(res);\n\n\
             std::cout << \"  Final residual is \" << res << std::endl;"
        );

        vec![
            Step::Compute(Kernel::new(
                format!("init{postfix}"),
                sizes.clone(),
                vec![],
                fields.clone(),
                full_space(&its, &sizes),
                vec![Stmt::raw(init_body)],
                0,
            )),
            Step::Compute(Kernel::new(
                format!("checkSolution{postfix}"),
                sizes
                    .iter()
                    .cloned()
                    .chain([Variable::size_t("nIt")])
                    .collect(),
                fields,
                vec![],
                vec![],
                vec![Stmt::raw(check_body)],
                0,
            )),
            Step::Compute(parse_kernel(&sizes, &[], defaults)),
        ]
    } else {
        // one multiply plus (2*dims - 1) fused multiply-adds
        let num_flop = 1 + 2 * (2 * dims as u64 - 1);
        vec![
            Step::Compute(Kernel::new(
                name,
                sizes.clone(),
                vec![u.clone()],
                vec![u_new.clone()],
                interior,
                vec![Stmt::assign(
                    u_new.access(&idx),
                    averaging_factor(dims) * neighbor_sum(&u, &its),
                )],
                num_flop,
            )),
            Step::Pseudo(format!(
                "std::swap({}, {});",
                u.device_name, u_new.device_name
            )),
        ]
    };

    Application::new(name, sizes, vec![], steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_body_averages_both_neighbors() {
        let app = compose(Backend::Serial, 1, "stencil-1d", DEFAULTS_1D);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.fct_name(), "stencil1d");
        assert_eq!(k.num_flop, 3);
        assert_eq!(
            k.body[0].render(Subscript::Bracket),
            "uNew[i0] = 0.5 * (u[i0 - 1] + u[i0 + 1]);"
        );
        assert_eq!(k.it_space[0].lower.to_string(), "1");
        assert_eq!(k.it_space[0].upper.to_string(), "nx - 1");
    }

    #[test]
    fn two_dimensional_body_touches_four_neighbors() {
        let app = compose(Backend::Serial, 2, "stencil-2d", DEFAULTS_2D);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.num_flop, 7);
        assert_eq!(
            k.body[0].render(Subscript::Bracket),
            "uNew[i0 + nx * i1] = 0.25 * (u[i0 - 1 + nx * i1] + u[i0 + 1 + nx * i1] \
             + u[i0 + nx * (i1 - 1)] + u[i0 + nx * (i1 + 1)]);"
        );
    }

    #[test]
    fn three_dimensional_factor_is_one_sixth() {
        let app = compose(Backend::Serial, 3, "stencil-3d", DEFAULTS_3D);
        let k = app.steps[0].kernel().unwrap();
        assert_eq!(k.num_flop, 11);
        let body = k.body[0].render(Subscript::Bracket);
        assert!(body.starts_with("uNew[i0 + nx * i1 + nx * ny * i2] = 1.0 / 6.0 * ("));
    }

    #[test]
    fn init_zeroes_the_boundary_and_seeds_the_interior() {
        let app = compose(Backend::UtilHeader, 2, "stencil-2d", DEFAULTS_2D);
        let init = app.steps[0].kernel().unwrap();
        let body = init.body[0].render(Subscript::Bracket);
        assert!(body.starts_with(
            "if (0 == i0 || nx - 1 == i0 || 0 == i1 || ny - 1 == i1) {"
        ));
        assert!(body.contains("u[i0 + nx * i1] = (tpe)1;"));
        // init covers the full grid, boundary included
        assert_eq!(init.it_space[0].lower.to_string(), "0");
    }

    #[test]
    fn check_reports_the_residual_instead_of_element_values() {
        let app = compose(Backend::UtilHeader, 1, "stencil-1d", DEFAULTS_1D);
        let check = app.steps[1].kernel().unwrap();
        assert_eq!(check.fct_name(), "checkSolutionStencil1D");
        let body = check.body[0].render(Subscript::Bracket);
        assert!(body.starts_with("tpe res = 0;\nfor (size_t i0 = 1; i0 < nx - 1; ++i0) {"));
        assert!(body.contains("const tpe localRes = 2 * u[i0] - (u[i0 - 1] + u[i0 + 1]);"));
        assert!(body.contains("res += localRes * localRes;"));
        assert!(body.contains("res = sqrt(res);"));
        assert!(body.contains("std::cout << \"  Final residual is \" << res << std::endl;"));
    }

    #[test]
    fn util_app_includes_a_parser_for_every_dimensionality() {
        for (dims, name, defaults) in [
            (1, "stencil-1d", DEFAULTS_1D),
            (2, "stencil-2d", DEFAULTS_2D),
            (3, "stencil-3d", DEFAULTS_3D),
        ] {
            let app = compose(Backend::UtilHeader, dims, name, defaults);
            let parse = app.steps[2].kernel().unwrap();
            assert_eq!(parse.fct_name(), format!("parseCLA_{dims}d"));
        }
    }
}
