//! Shared utility header per benchmark: init, verification and CLI
//! parsing, compiled host-side into every backend's binary.
//!
//! The kernels in here lower through the sequential backend; this module
//! only adds the standard builders for the element-wise verification
//! kernel and the `parseCLA_<n>d` argument parser.

use crate::codegen::assemble;
use crate::error::Result;
use crate::ir::{Application, Expr, Field, IterDim, Kernel, Stmt, Subscript, Variable};

/// Element-wise verification: compare every element of `to_compare`
/// against `expected` and report the first mismatch on stderr.
/// Extra loops and reporting stay out of the timed section, so this is a
/// plain sequential kernel.
pub fn check_kernel(
    postfix: &str,
    fields: Vec<Field>,
    sizes: &[Variable],
    parameters: &[Variable],
    it_space: Vec<IterDim>,
    expected: Expr,
    to_compare: Expr,
) -> Kernel {
    let conv = Subscript::Bracket;
    let expected = expected.render(conv);
    let to_compare = to_compare.render(conv);
    let element: Vec<String> = it_space.iter().map(|d| d.it.name.clone()).collect();
    let element = element.join(" << \", \" << ");

    let body = format!(
        "if ((tpe)({expected}) != {to_compare}) {{\n\
         std::cerr << \"{postfix} check failed for element \" << {element} << \" (expected \" << {expected} << \" but got \" << {to_compare} << \")\" << std::endl;\n\
         return;\n\
         }}"
    );

    let mut variables = sizes.to_vec();
    variables.push(Variable::size_t("nIt"));
    variables.extend(parameters.iter().cloned());

    Kernel::new(
        format!("checkSolution{postfix}"),
        variables,
        fields,
        vec![],
        it_space,
        vec![Stmt::raw(body)],
        0,
    )
}

/// Command-line parsing: seed every value with the benchmark's default,
/// then override positionally from `argv`.
pub fn parse_kernel(sizes: &[Variable], parameters: &[Variable], defaults: &[&str]) -> Kernel {
    // defaults layout: element type, sizes, parameters, nItWarmUp, nIt.
    let size_defaults = &defaults[1..1 + sizes.len()];
    let param_defaults = &defaults[1 + sizes.len()..1 + sizes.len() + parameters.len()];
    let n_it_defaults = &defaults[defaults.len() - 2..];

    let mut init_lines: Vec<String> = sizes
        .iter()
        .zip(size_defaults)
        .map(|(s, v)| format!("{} = {};", s.name, v))
        .collect();
    init_lines.extend(
        parameters
            .iter()
            .zip(param_defaults)
            .map(|(p, v)| format!("{} = {};", p.name, v)),
    );
    init_lines.push(format!("nItWarmUp = {};", n_it_defaults[0]));
    init_lines.push(format!("nIt = {};", n_it_defaults[1]));

    let parse_lines: Vec<String> = sizes
        .iter()
        .chain(parameters.iter())
        .map(|v| v.name.as_str())
        .chain(["nItWarmUp", "nIt"])
        .map(|name| format!("if (argc > i) {name} = atoi(argv[i]);\n++i;"))
        .collect();

    let body = format!(
        "// default values\n\
         {init}\n\
         \n\
         // override with command line arguments\n\
         int i = 1;\n\
         if (argc > i) tpeName = argv[i];\n\
         ++i;\n\
         {parse}",
        init = init_lines.join("\n"),
        parse = parse_lines.join("\n"),
    );

    let mut variables = vec![
        Variable::new("argc", "int"),
        Variable::new("argv", "char**"),
        Variable::new("tpeName", "char*&"),
    ];
    variables.extend(sizes.iter().map(|s| Variable::new(&s.name, format!("{}&", s.tpe))));
    variables.extend(
        parameters
            .iter()
            .map(|p| Variable::new(&p.name, format!("{}&", p.tpe))),
    );
    variables.push(Variable::new("nItWarmUp", "size_t&"));
    variables.push(Variable::new("nIt", "size_t&"));

    Kernel::new(
        format!("parseCLA_{}d", sizes.len()),
        variables,
        vec![],
        vec![],
        vec![],
        vec![Stmt::raw(body)],
        0,
    )
    .without_tpe_template()
}

/// The header file: pragma, shared utilities, kernel definitions.
pub fn header(app: &Application) -> Result<String> {
    Ok(format!(
        "#pragma once\n\n#include \"../../util.h\"\n\n\n{}",
        assemble::kernel_decls(crate::codegen::Backend::UtilHeader, app)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Backend;

    fn one_d() -> (Variable, Variable, Field) {
        let nx = Variable::size_t("nx");
        let i0 = Variable::size_t("i0");
        let src = Backend::UtilHeader.field("src", "tpe", vec![Expr::var(&nx)]);
        (nx, i0, src)
    }

    #[test]
    fn check_kernel_compares_against_the_closed_form() {
        let (nx, i0, src) = one_d();
        let k = check_kernel(
            "Stream",
            vec![src.clone()],
            &[nx.clone()],
            &[],
            vec![IterDim::new(i0.clone(), 0i64, Expr::var(&nx))],
            Expr::var(&i0) + Expr::var(&Variable::size_t("nIt")),
            src.access(&[Expr::var(&i0)]),
        );
        assert_eq!(k.fct_name(), "checkSolutionStream");
        let body = k.body[0].render(Subscript::Bracket);
        assert!(body.contains("if ((tpe)(i0 + nIt) != src[i0]) {"));
        assert!(body.contains(
            "std::cerr << \"Stream check failed for element \" << i0 << \" (expected \" << i0 + nIt << \" but got \" << src[i0] << \")\" << std::endl;"
        ));
        let names: Vec<&str> = k.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["nx", "nIt"]);
    }

    #[test]
    fn parse_kernel_seeds_defaults_then_overrides_positionally() {
        let nx = Variable::size_t("nx");
        let stride = Variable::size_t("stride");
        let k = parse_kernel(&[nx], &[stride], &["double", "64", "1", "0", "4"]);
        assert_eq!(k.fct_name(), "parseCLA_1d");
        assert!(!k.has_tpe_template);
        let body = k.body[0].render(Subscript::Bracket);
        assert!(body.contains("nx = 64;"));
        assert!(body.contains("stride = 1;"));
        assert!(body.contains("nItWarmUp = 0;"));
        assert!(body.contains("nIt = 4;"));
        assert!(body.contains("if (argc > i) tpeName = argv[i];"));
        assert!(body.contains("if (argc > i) stride = atoi(argv[i]);"));
        let decls: Vec<String> = k.variables.iter().map(|v| v.decl()).collect();
        assert_eq!(decls[0], "int argc");
        assert_eq!(decls[2], "char*& tpeName");
        assert!(decls.contains(&"size_t& nx".to_string()));
    }

    #[test]
    fn parse_kernel_signature_has_no_const_on_out_parameters() {
        let nx = Variable::size_t("nx");
        let k = parse_kernel(&[nx], &[], &["double", "64", "2", "10"]);
        let code =
            crate::codegen::backend::kernel_definition(Backend::UtilHeader, &k).unwrap();
        assert!(code.contains(
            "inline void parseCLA_1d(const int argc, char** argv, char*& tpeName, size_t& nx, size_t& nItWarmUp, size_t& nIt)"
        ));
        assert!(!code.starts_with("template"));
    }
}
