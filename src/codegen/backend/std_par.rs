//! C++17 parallel algorithms: kernels become `std::for_each` over the
//! elements of one carrier field, with the iterator tuple reconstructed
//! from the element's address offset.

use super::{pointer_params, ReadQualifier};
use crate::codegen::{assemble, Backend};
use crate::error::{Error, Result};
use crate::ir::{Application, Expr, Field, Kernel, Subscript};

/// The field whose elements drive the `for_each`: first read, else first
/// write.
fn carrier_field(kernel: &Kernel) -> Result<&Field> {
    kernel
        .reads
        .first()
        .or_else(|| kernel.writes.first())
        .ok_or_else(|| Error::NoFields {
            kernel: kernel.fct_name(),
        })
}

/// Recover iterator `d` from the flat element index: strip the strides of
/// the slower dimensions with a remainder, then divide away the faster
/// ones.
fn remap_iterator(field: &Field, d: usize, conv: Subscript) -> String {
    let mut it = "idx".to_string();
    if d < field.dims() - 1 {
        let modulus = Expr::product(field.extents[..d + 1].iter().cloned()).render(conv);
        it = format!("{it} % ({modulus})");
    }
    if d > 0 {
        let divisor = Expr::product(field.extents[..d].iter().cloned()).render(conv);
        it = format!("({it}) / ({divisor})");
    }
    it
}

pub(super) fn definition(kernel: &Kernel) -> Result<String> {
    let conv = Subscript::Bracket;
    let field = carrier_field(kernel)?;

    let tids = if kernel.dims() == 1 {
        let it = &kernel.it_space[0].it;
        format!(
            "const {} {} = &{}_item - {};",
            it.tpe, it.name, field.name, field.name
        )
    } else {
        let remapped: Vec<String> = kernel
            .it_space
            .iter()
            .enumerate()
            .map(|(d, dim)| {
                format!(
                    "const {} {} = {};",
                    dim.it.tpe,
                    dim.it.name,
                    remap_iterator(field, d, conv)
                )
            })
            .collect();
        format!(
            "const size_t idx = &{}_item - {};\n{}",
            field.name,
            field.name,
            remapped.join("\n")
        )
    };

    Ok(format!(
        "{template}inline void {fct}({params}) {{\n\
         std::for_each(std::execution::par_unseq, {f}, {f} + {total}, //\n\
         [=](const {tpe} &{f}_item) {{ //\n\
         {tids}\n\
         {guarded}\n\
         }});\n\
         }}",
        template = assemble::template_line(kernel),
        fct = kernel.fct_name(),
        params = pointer_params(kernel, ReadQualifier::ConstPtrConst, false),
        f = field.name,
        total = field.total_size().render(conv),
        tpe = field.tpe,
        tids = tids,
        guarded = assemble::guarded_body(kernel, conv),
    ))
}

pub(super) fn application(backend: Backend, app: &Application) -> Result<String> {
    let body = assemble::standard_body(backend, app)?;
    Ok(format!(
        "#include <algorithm>\n#include <execution>\n\n#include \"{}-util.h\"\n\n\n{body}",
        app.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IterDim, Stmt, Variable};

    #[test]
    fn one_dimensional_kernel_derives_the_iterator_from_the_offset() {
        let nx = Variable::size_t("nx");
        let i0 = Variable::size_t("i0");
        let src = Backend::StdPar.field("src", "tpe", vec![Expr::var(&nx)]);
        let dest = Backend::StdPar.field("dest", "tpe", vec![Expr::var(&nx)]);
        let body = Stmt::assign(
            dest.access(&[Expr::var(&i0)]),
            src.access(&[Expr::var(&i0)]) + 1i64,
        );
        let k = Kernel::new(
            "stream",
            vec![],
            vec![src],
            vec![dest],
            vec![IterDim::new(i0, 0i64, Expr::var(&nx))],
            vec![body],
            1,
        );
        let code = definition(&k).unwrap();
        assert!(code.contains("std::for_each(std::execution::par_unseq, src, src + nx, //"));
        assert!(code.contains("[=](const tpe &src_item) { //"));
        assert!(code.contains("const size_t i0 = &src_item - src;"));
        assert!(code.contains("if (i0 < nx) {"));
    }

    #[test]
    fn multidimensional_kernel_remaps_the_flat_index() {
        let nx = Variable::size_t("nx");
        let ny = Variable::size_t("ny");
        let nz = Variable::size_t("nz");
        let extents = vec![Expr::var(&nx), Expr::var(&ny), Expr::var(&nz)];
        let field = Backend::StdPar.field("u", "tpe", extents);
        assert_eq!(remap_iterator(&field, 0, Subscript::Bracket), "idx % (nx)");
        assert_eq!(
            remap_iterator(&field, 1, Subscript::Bracket),
            "(idx % (nx * ny)) / (nx)"
        );
        assert_eq!(
            remap_iterator(&field, 2, Subscript::Bracket),
            "(idx) / (nx * ny)"
        );
    }
}
