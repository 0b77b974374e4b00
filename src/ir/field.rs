//! Multi-dimensional arrays with a row-major linearization rule.

use super::expr::{Expr, FieldAccess};

/// A logical multi-dimensional array.
///
/// `device_name` differs from `name` only for backends with a separate
/// device memory space (`d_` / `b_` prefixes); everywhere else the two
/// coincide and host pointer *is* the device pointer.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub device_name: String,
    pub tpe: String,
    pub extents: Vec<Expr>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        device_name: impl Into<String>,
        tpe: impl Into<String>,
        extents: Vec<Expr>,
    ) -> Self {
        Self {
            name: name.into(),
            device_name: device_name.into(),
            tpe: tpe.into(),
            extents,
        }
    }

    pub fn dims(&self) -> usize {
        self.extents.len()
    }

    /// Product of all extents.
    pub fn total_size(&self) -> Expr {
        Expr::product(self.extents.iter().cloned())
    }

    /// Row-major folding of an iterator tuple into one flat offset:
    /// `i0 + e0*i1 + e0*e1*i2 + …`.
    ///
    /// Every backend must address elements through this exact rule; the
    /// cross-backend verification step depends on it.
    pub fn linearize(&self, iterators: &[Expr]) -> Expr {
        let mut linearized = iterators[0].clone();
        for (d, it) in iterators.iter().enumerate().skip(1) {
            let stride = Expr::product(self.extents[..d].iter().cloned());
            linearized = linearized + stride * it.clone();
        }
        linearized
    }

    /// Access through the host-side name.
    pub fn access(&self, iterators: &[Expr]) -> Expr {
        Expr::Access(Box::new(FieldAccess {
            field: self.clone(),
            indices: iterators.to_vec(),
            on_host: true,
        }))
    }

    /// Access through the device-side name.
    pub fn device_access(&self, iterators: &[Expr]) -> Expr {
        Expr::Access(Box::new(FieldAccess {
            field: self.clone(),
            indices: iterators.to_vec(),
            on_host: false,
        }))
    }
}

impl PartialEq for Field {
    /// Fields are identified by host name, like variables.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Field {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Subscript, Variable};

    fn field(extents: &[&Variable]) -> Field {
        Field::new(
            "u",
            "u",
            "tpe",
            extents.iter().map(|v| Expr::var(v)).collect(),
        )
    }

    #[test]
    fn linearize_1d_is_the_iterator_itself() {
        let nx = Variable::size_t("nx");
        let i0 = Variable::size_t("i0");
        let f = field(&[&nx]);
        assert_eq!(f.linearize(&[Expr::var(&i0)]).to_string(), "i0");
    }

    #[test]
    fn linearize_2d_uses_leading_extent_as_stride() {
        let (nx, ny) = (Variable::size_t("nx"), Variable::size_t("ny"));
        let (i0, i1) = (Variable::size_t("i0"), Variable::size_t("i1"));
        let f = field(&[&nx, &ny]);
        let lin = f.linearize(&[Expr::var(&i0), Expr::var(&i1)]);
        assert_eq!(lin.to_string(), "i0 + nx * i1");
    }

    #[test]
    fn linearize_3d_accumulates_stride_products() {
        let (nx, ny, nz) = (
            Variable::size_t("nx"),
            Variable::size_t("ny"),
            Variable::size_t("nz"),
        );
        let (i0, i1, i2) = (
            Variable::size_t("i0"),
            Variable::size_t("i1"),
            Variable::size_t("i2"),
        );
        let f = field(&[&nx, &ny, &nz]);
        let lin = f.linearize(&[Expr::var(&i0), Expr::var(&i1), Expr::var(&i2)]);
        assert_eq!(lin.to_string(), "i0 + nx * i1 + nx * ny * i2");
    }

    #[test]
    fn linearize_with_offset_iterators() {
        let (nx, ny) = (Variable::size_t("nx"), Variable::size_t("ny"));
        let (i0, i1) = (Variable::size_t("i0"), Variable::size_t("i1"));
        let f = field(&[&nx, &ny]);
        let lin = f.linearize(&[Expr::var(&i0) - 1i64, Expr::var(&i1)]);
        assert_eq!(lin.to_string(), "i0 - 1 + nx * i1");
    }

    #[test]
    fn boundary_offsets_against_concrete_extents() {
        // 2-D field with extents (4, 3): element (i0, i1) sits at i0 + 4*i1.
        let f = Field::new("u", "u", "tpe", vec![Expr::Int(4), Expr::Int(3)]);
        let lin = |a: i64, b: i64| f.linearize(&[Expr::Int(a), Expr::Int(b)]).to_string();
        assert_eq!(lin(0, 0), "0");
        assert_eq!(lin(3, 0), "3 + 4 * 0");
        assert_eq!(lin(3, 2), "3 + 4 * 2");
    }

    #[test]
    fn access_renders_per_convention() {
        let (nx, ny) = (Variable::size_t("nx"), Variable::size_t("ny"));
        let (i0, i1) = (Variable::size_t("i0"), Variable::size_t("i1"));
        let f = field(&[&nx, &ny]);
        let access = f.access(&[Expr::var(&i0), Expr::var(&i1)]);
        assert_eq!(access.render(Subscript::Bracket), "u[i0 + nx * i1]");
        assert_eq!(access.render(Subscript::Paren), "u(i0, i1)");
    }

    #[test]
    fn device_access_uses_the_device_name() {
        let nx = Variable::size_t("nx");
        let i0 = Variable::size_t("i0");
        let f = Field::new("src", "d_src", "tpe", vec![Expr::var(&nx)]);
        assert_eq!(
            f.device_access(&[Expr::var(&i0)]).to_string(),
            "d_src[i0]"
        );
    }

    #[test]
    fn total_size_is_extent_product() {
        let (nx, ny) = (Variable::size_t("nx"), Variable::size_t("ny"));
        let f = field(&[&nx, &ny]);
        assert_eq!(f.total_size().to_string(), "nx * ny");
    }
}
