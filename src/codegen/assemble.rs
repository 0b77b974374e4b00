//! Shared application-assembly building blocks.
//!
//! Every backend composes its generated program from the same fragments:
//! kernel declarations, field allocation/free/copy blocks, the `realMain`
//! skeleton (parse, init, warm-up, timed loop, verification, cleanup) and
//! the runtime type-dispatch wrapper. Backend-specific framing (includes,
//! queue/runtime setup) lives in the per-backend modules.

use super::backend::kernel_launch;
use super::Backend;
use crate::error::Result;
use crate::ir::expr::render_body;
use crate::ir::{Application, Expr, IterDim, Kernel, Step, Subscript};

// ─── Kernel-level helpers ─────────────────────────────────────────

/// `template<typename tpe>` line, or nothing for untemplated kernels.
pub fn template_line(kernel: &Kernel) -> String {
    if kernel.has_tpe_template {
        "template<typename tpe>\n".to_string()
    } else {
        String::new()
    }
}

/// Wrap a body in nested `for` loops, innermost dimension first.
pub fn loop_nest(it_space: &[IterDim], body: String, conv: Subscript) -> String {
    let mut code = body;
    for dim in it_space {
        code = format!(
            "for ({} {} = {}; {} < {}; ++{}) {{\n{}\n}}",
            dim.it.tpe,
            dim.it.name,
            dim.lower.render(conv),
            dim.it.name,
            dim.upper.render(conv),
            dim.it.name,
            code
        );
    }
    code
}

/// Bounds condition for launch configurations that over-provision threads:
/// one `it < upper` conjunct per dimension, preceded by `it >= lower` when
/// the lower bound is not the literal zero.
pub fn bounds_guard(it_space: &[IterDim], conv: Subscript) -> String {
    let conds: Vec<String> = it_space
        .iter()
        .map(|dim| {
            let upper = format!("{} < {}", dim.it.name, dim.upper.render(conv));
            if dim.lower.is_zero() {
                upper
            } else {
                format!("{} >= {} && {}", dim.it.name, dim.lower.render(conv), upper)
            }
        })
        .collect();
    conds.join(" && ")
}

/// `if (<guard>) { <body> }` around a rendered kernel body.
pub fn guarded_body(kernel: &Kernel, conv: Subscript) -> String {
    format!(
        "if ({}) {{\n{}\n}}",
        bounds_guard(&kernel.it_space, conv),
        render_body(&kernel.body, conv)
    )
}

/// Scalar parameter declarations in signature position.
///
/// Reference and pointer scalars (out-parameters of the CLI parser) are
/// never const-qualified.
pub fn scalar_params(kernel: &Kernel, with_const: bool) -> Vec<String> {
    kernel
        .variables
        .iter()
        .map(|v| {
            if with_const && !v.is_indirect() {
                format!("const {}", v.decl())
            } else {
                v.decl()
            }
        })
        .collect()
}

/// Call-site argument list: fields in the fixed parameter order (host or
/// device names), then scalar variables.
pub fn launch_args(kernel: &Kernel, device_names: bool) -> String {
    let mut args: Vec<String> = kernel
        .param_fields()
        .iter()
        .map(|f| {
            if device_names {
                f.device_name.clone()
            } else {
                f.name.clone()
            }
        })
        .collect();
    args.extend(kernel.variables.iter().map(|v| v.name.clone()));
    args.join(", ")
}

// ─── Application fragments ────────────────────────────────────────

fn size_list(app: &Application) -> String {
    let names: Vec<&str> = app.sizes.iter().map(|s| s.name.as_str()).collect();
    names.join(", ")
}

fn field_list(app: &Application) -> String {
    let names: Vec<&str> = app.fields.iter().map(|f| f.name.as_str()).collect();
    names.join(", ")
}

/// `, p0, p1` with a leading comma so it can be appended to a fixed argument
/// list; empty when the application has no extra parameters.
fn param_list(app: &Application) -> String {
    if app.parameters.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = app.parameters.iter().map(|p| p.name.as_str()).collect();
        format!(", {}", names.join(", "))
    }
}

/// All kernel definitions, pseudo-kernels excluded.
pub fn kernel_decls(backend: Backend, app: &Application) -> Result<String> {
    let decls: Vec<String> = app
        .steps
        .iter()
        .filter_map(Step::kernel)
        .map(|k| super::backend::kernel_definition(backend, k))
        .collect::<Result<_>>()?;
    Ok(decls.join("\n"))
}

/// Host declarations and allocations, then (for explicit-memory backends)
/// device declarations and allocations.
pub fn field_allocates(backend: Backend, app: &Application) -> String {
    let host: Vec<String> = app
        .fields
        .iter()
        .map(|f| {
            let mut lines = Vec::new();
            lines.extend(backend.host_declare(f));
            lines.extend(backend.host_allocate(f));
            lines.join("\n")
        })
        .collect();
    let mut code = host.join("\n");

    if backend.has_device_ptr() {
        let device: Vec<String> = app
            .fields
            .iter()
            .map(|f| {
                let mut lines = Vec::new();
                lines.extend(backend.device_declare(f));
                lines.extend(backend.device_allocate(f));
                lines.join("\n")
            })
            .collect();
        code = format!("{}\n\n{}", code, device.join("\n"));
    }

    code
}

/// Device frees first, then host frees.
pub fn field_frees(backend: Backend, app: &Application) -> String {
    let device: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.device_free(f))
        .collect();
    let host: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.host_free(f))
        .collect();

    if device.is_empty() {
        host.join("\n")
    } else {
        format!("{}\n\n{}", device.join("\n"), host.join("\n"))
    }
}

/// Host-to-device transfers, framed by blank lines; empty when every copy
/// is a no-op.
pub fn to_device_copies(backend: Backend, app: &Application) -> String {
    let copies: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.copy_to_device(f))
        .collect();
    if copies.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", copies.join("\n"))
    }
}

/// Device-to-host transfers followed by a blank line; empty when no-op.
pub fn to_host_copies(backend: Backend, app: &Application) -> String {
    let copies: Vec<String> = app
        .fields
        .iter()
        .filter_map(|f| backend.copy_to_host(f))
        .collect();
    if copies.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", copies.join("\n"))
    }
}

fn sync_fragment(backend: Backend) -> String {
    match backend.synchronize() {
        Some(stmt) => format!("{stmt}\n"),
        None => String::new(),
    }
}

/// Launch statements for the warm-up and measurement loops, one per step.
pub fn launch_sequence(backend: Backend, app: &Application) -> Result<String> {
    let launches: Vec<String> = app
        .steps
        .iter()
        .map(|step| match step {
            Step::Compute(k) => kernel_launch(backend, k),
            Step::Pseudo(code) => Ok(code.clone()),
        })
        .collect::<Result<_>>()?;
    Ok(launches.join("\n"))
}

/// `realMain` opening: declarations and the CLI-parse call.
pub fn main_start(app: &Application) -> String {
    let param_decls = if app.parameters.is_empty() {
        String::new()
    } else {
        let decls: Vec<String> = app.parameters.iter().map(|p| format!("{};", p.decl())).collect();
        format!("{}\n", decls.join("\n"))
    };

    format!(
        "template<typename tpe>\n\
         inline int realMain(int argc, char *argv[]) {{\n\
         char* tpeName;\n\
         size_t {sizes}, nItWarmUp, nIt;\n\
         {param_decls}\
         parseCLA_{dims}d(argc, argv, tpeName, {sizes}{params}, nItWarmUp, nIt);\n",
        sizes = size_list(app),
        params = param_list(app),
        dims = app.sizes.len(),
        param_decls = param_decls,
    )
}

/// Allocation, initialization and upload block.
pub fn main_allocate_and_init(backend: Backend, app: &Application) -> String {
    format!(
        "{allocates}\n\
         \n\
         // init\n\
         init{postfix}({fields}, {sizes}{params});\n\
         {to_device}",
        allocates = field_allocates(backend, app),
        postfix = app.postfix(),
        fields = field_list(app),
        sizes = size_list(app),
        params = param_list(app),
        to_device = to_device_copies(backend, app),
    )
}

/// Warm-up loop, timed measurement loop and statistics output.
pub fn main_middle(backend: Backend, app: &Application) -> Result<String> {
    let launches = launch_sequence(backend, app)?;
    let sync = sync_fragment(backend);
    let total_size = Expr::product(app.sizes.iter().map(Expr::var)).render(Subscript::Bracket);

    let num_byte: Vec<String> = app
        .steps
        .iter()
        .filter_map(Step::kernel)
        .flat_map(|k| k.reads.iter().chain(k.writes.iter()))
        .map(|f| format!("sizeof({})", f.tpe))
        .collect();

    Ok(format!(
        "// warm-up\n\
         for (size_t i = 0; i < nItWarmUp; ++i) {{\n\
         {launches}\n\
         }}\n\
         {sync}\
         \n\
         // measurement\n\
         auto start = std::chrono::steady_clock::now();\n\
         \n\
         for (size_t i = 0; i < nIt; ++i) {{\n\
         {launches}\n\
         }}\n\
         {sync}\
         \n\
         auto end = std::chrono::steady_clock::now();\n\
         \n\
         printStats<tpe>(end - start, nIt, {total_size}, tpeName, {num_byte}, {num_flop});\n",
        launches = launches,
        sync = sync,
        total_size = total_size,
        num_byte = num_byte.join(" + "),
        num_flop = app.num_flop(),
    ))
}

/// Download, verification, cleanup and `realMain` closing.
pub fn main_end(backend: Backend, app: &Application) -> String {
    format!(
        "{to_host}\
         // check solution\n\
         checkSolution{postfix}({fields}, {sizes}, nIt + nItWarmUp{params});\n\
         \n\
         {frees}\n\
         \n\
         return 0;\n\
         }}\n",
        to_host = to_host_copies(backend, app),
        postfix = app.postfix(),
        fields = field_list(app),
        sizes = size_list(app),
        params = param_list(app),
        frees = field_frees(backend, app),
    )
}

/// `main`: dispatch to the `realMain` instantiation matching the runtime
/// type-name argument.
pub fn main_wrapper() -> String {
    const TYPES: [&str; 4] = ["int", "long", "float", "double"];

    let switch: Vec<String> = TYPES
        .iter()
        .map(|tpe| format!("if (\"{tpe}\" == tpeName)\nreturn realMain<{tpe}>(argc, argv);"))
        .collect();

    format!(
        "int main(int argc, char *argv[]) {{\n\
         if (argc < 2) {{\n\
         std::cout << \"Missing type specification\" << std::endl;\n\
         return -1;\n\
         }}\n\
         \n\
         std::string tpeName(argv[1]);\n\
         \n\
         {switch}\n\
         \n\
         std::cout << \"Invalid type specification (\" << argv[1] << \"); supported types are\" << std::endl;\n\
         std::cout << \"  {types}\" << std::endl;\n\
         return -1;\n\
         }}\n",
        switch = switch.join("\n"),
        types = TYPES.join(", "),
    )
}

/// The standard program body shared by every pointer-style backend:
/// kernel definitions, `realMain`, type-dispatch wrapper.
pub fn standard_body(backend: Backend, app: &Application) -> Result<String> {
    Ok(format!(
        "{decls}\n\
         \n\
         {start}\n\
         {alloc_init}\n\
         {middle}\n\
         {end}\n\
         \n\
         {wrapper}",
        decls = kernel_decls(backend, app)?,
        start = main_start(app),
        alloc_init = main_allocate_and_init(backend, app),
        middle = main_middle(backend, app)?,
        end = main_end(backend, app),
        wrapper = main_wrapper(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Variable;

    fn dim(name: &str, lower: i64, upper: &str) -> IterDim {
        IterDim::new(
            Variable::size_t(name),
            Expr::Int(lower),
            Expr::var(&Variable::size_t(upper)),
        )
    }

    #[test]
    fn guard_omits_zero_lower_bounds() {
        let space = vec![dim("i0", 0, "nx")];
        assert_eq!(bounds_guard(&space, Subscript::Bracket), "i0 < nx");
    }

    #[test]
    fn guard_keeps_nonzero_lower_bounds() {
        let space = vec![
            IterDim::new(
                Variable::size_t("i0"),
                Expr::Int(1),
                Expr::var(&Variable::size_t("nx")) - 1i64,
            ),
            dim("i1", 0, "ny"),
        ];
        assert_eq!(
            bounds_guard(&space, Subscript::Bracket),
            "i0 >= 1 && i0 < nx - 1 && i1 < ny"
        );
    }

    #[test]
    fn loop_nest_wraps_innermost_first() {
        let space = vec![dim("i0", 0, "nx"), dim("i1", 0, "ny")];
        let code = loop_nest(&space, "body;".into(), Subscript::Bracket);
        assert!(code.starts_with("for (size_t i1 = 0; i1 < ny; ++i1) {"));
        assert!(code.contains("for (size_t i0 = 0; i0 < nx; ++i0) {\nbody;\n}"));
    }

    #[test]
    fn wrapper_dispatches_all_four_types() {
        let w = main_wrapper();
        for tpe in ["int", "long", "float", "double"] {
            assert!(w.contains(&format!("return realMain<{tpe}>(argc, argv);")));
        }
        assert!(w.contains("Missing type specification"));
        assert!(w.contains("Invalid type specification"));
    }
}
