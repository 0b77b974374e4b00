//! Arithmetic expression tree and statement layer for kernel bodies.
//!
//! Deliberately small: literals, variable references, field accesses, binary
//! operators, calls, casts to the benchmark element type, and a raw-text
//! escape hatch for opaque C++ fragments. There is no simplification; the
//! tree exists only to be built and printed.

use std::fmt;
use std::ops;

use super::field::Field;
use super::variable::Variable;

/// Field subscript convention of a backend.
///
/// Pointer-style backends render `name[linearized]`; view-style backends
/// (Kokkos) render `name(i0, i1)` with the raw iterator tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subscript {
    Bracket,
    Paren,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 2,
        }
    }
}

/// One element access: `field[index]` or `field(i0, i1)`.
///
/// Carries the iterator tuple unlinearized; the printer folds it through
/// [`Field::linearize`] for bracket-style backends so every backend
/// addresses the same logical element for the same tuple.
#[derive(Clone, Debug)]
pub struct FieldAccess {
    pub field: Field,
    pub indices: Vec<Expr>,
    pub on_host: bool,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Var(Variable),
    Access(Box<FieldAccess>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    /// Cast to the benchmark element type: `(tpe)x`.
    Cast(Box<Expr>),
    /// Opaque C++ fragment, printed verbatim.
    Raw(String),
}

impl Expr {
    pub fn var(v: &Variable) -> Self {
        Expr::Var(v.clone())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Expr::Raw(text.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(name.into(), args)
    }

    pub fn cast(inner: Expr) -> Self {
        Expr::Cast(Box::new(inner))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Int(0))
    }

    /// Left-folded product; the empty product is `1`.
    pub fn product(factors: impl Iterator<Item = Expr>) -> Expr {
        factors.reduce(|acc, f| acc * f).unwrap_or(Expr::Int(1))
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Bin(op, _, _) => op.precedence(),
            Expr::Cast(_) => 3,
            _ => 4,
        }
    }

    /// Render as C++ source text under the given subscript convention.
    pub fn render(&self, conv: Subscript) -> String {
        match self {
            Expr::Int(v) => v.to_string(),
            Expr::Float(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.1}")
                } else {
                    format!("{v}")
                }
            }
            Expr::Var(v) => v.name.clone(),
            Expr::Raw(text) => text.clone(),
            Expr::Call(name, args) => {
                let args: Vec<String> = args.iter().map(|a| a.render(conv)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Expr::Cast(inner) => format!("(tpe){}", inner.render_at(3, conv)),
            Expr::Access(access) => access.render(conv),
            Expr::Bin(op, lhs, rhs) => {
                let prec = op.precedence();
                let l = lhs.render_at(prec, conv);
                // Subtraction, division and remainder do not associate on the
                // right; parenthesize an equal-precedence right operand.
                let rhs_min = match op {
                    BinOp::Sub | BinOp::Div | BinOp::Rem => prec + 1,
                    _ => prec,
                };
                let r = rhs.render_at(rhs_min, conv);
                format!("{} {} {}", l, op.symbol(), r)
            }
        }
    }

    fn render_at(&self, min_precedence: u8, conv: Subscript) -> String {
        let text = self.render(conv);
        if self.precedence() < min_precedence {
            format!("({text})")
        } else {
            text
        }
    }
}

impl FieldAccess {
    fn render(&self, conv: Subscript) -> String {
        let name = if self.on_host {
            &self.field.name
        } else {
            &self.field.device_name
        };
        match conv {
            Subscript::Bracket => {
                let lin = self.field.linearize(&self.indices);
                format!("{}[{}]", name, lin.render(conv))
            }
            Subscript::Paren => {
                let its: Vec<String> = self.indices.iter().map(|i| i.render(conv)).collect();
                format!("{}({})", name, its.join(", "))
            }
        }
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Int(v)
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Float(v)
    }
}

impl From<&Variable> for Expr {
    fn from(v: &Variable) -> Self {
        Expr::Var(v.clone())
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::Bin($op, Box::new(self), Box::new(rhs.into()))
            }
        }
    };
}

impl_binop!(Add, add, BinOp::Add);
impl_binop!(Sub, sub, BinOp::Sub);
impl_binop!(Mul, mul, BinOp::Mul);
impl_binop!(Div, div, BinOp::Div);
impl_binop!(Rem, rem, BinOp::Rem);

impl fmt::Display for Expr {
    /// Bracket-convention rendering; the common case outside Kokkos.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Subscript::Bracket))
    }
}

// ─── Statements ───────────────────────────────────────────────────

/// One line of a kernel body.
#[derive(Clone, Debug)]
pub enum Stmt {
    /// `lhs <op> rhs;` over expressions.
    Assign {
        lhs: Expr,
        rhs: Expr,
        op: &'static str,
    },
    /// Verbatim line.
    Raw(String),
}

impl Stmt {
    pub fn assign(lhs: Expr, rhs: Expr) -> Self {
        Stmt::Assign { lhs, rhs, op: "=" }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Stmt::Raw(text.into())
    }

    pub fn render(&self, conv: Subscript) -> String {
        match self {
            Stmt::Assign { lhs, rhs, op } => {
                format!("{} {} {};", lhs.render(conv), op, rhs.render(conv))
            }
            Stmt::Raw(text) => text.clone(),
        }
    }
}

/// Render a body, one statement per line.
pub fn render_body(stmts: &[Stmt], conv: Subscript) -> String {
    let lines: Vec<String> = stmts.iter().map(|s| s.render(conv)).collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nx() -> Variable {
        Variable::size_t("nx")
    }

    #[test]
    fn precedence_parenthesizes_sums_under_products() {
        let e = Expr::Float(0.25) * (Expr::var(&nx()) + 1i64);
        assert_eq!(e.to_string(), "0.25 * (nx + 1)");
    }

    #[test]
    fn subtraction_keeps_left_associativity_flat() {
        let e = Expr::var(&nx()) - 1i64 + Expr::Int(2);
        assert_eq!(e.to_string(), "nx - 1 + 2");
    }

    #[test]
    fn subtraction_parenthesizes_right_operand() {
        let a = Variable::size_t("a");
        let b = Variable::size_t("b");
        let e = Expr::var(&nx()) - (Expr::var(&a) + Expr::var(&b));
        assert_eq!(e.to_string(), "nx - (a + b)");
    }

    #[test]
    fn division_parenthesizes_compound_divisor() {
        let idx = Variable::size_t("idx");
        let ny = Variable::size_t("ny");
        let e = Expr::var(&idx) / (Expr::var(&nx()) * Expr::var(&ny));
        assert_eq!(e.to_string(), "idx / (nx * ny)");
    }

    #[test]
    fn whole_floats_keep_a_decimal_point() {
        let e = Expr::Float(1.0) / Expr::Float(6.0);
        assert_eq!(e.to_string(), "1.0 / 6.0");
    }

    #[test]
    fn cast_binds_tighter_than_arithmetic() {
        let i0 = Variable::size_t("i0");
        assert_eq!(Expr::cast(Expr::var(&i0)).to_string(), "(tpe)i0");
        assert_eq!(
            Expr::cast(Expr::var(&i0) + 1i64).to_string(),
            "(tpe)(i0 + 1)"
        );
    }

    #[test]
    fn call_renders_comma_separated_arguments() {
        let a = Variable::size_t("strideRead");
        let b = Variable::size_t("strideWrite");
        let e = Expr::call("std::max", vec![Expr::var(&a), Expr::var(&b)]);
        assert_eq!(e.to_string(), "std::max(strideRead, strideWrite)");
    }
}
