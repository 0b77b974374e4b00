//! Intermediate representation of a benchmark: scalar variables, fields,
//! expressions, kernels and applications.
//!
//! The IR is pure data. Each backend consumes it and produces C++ source
//! text; nothing here performs I/O or depends on a concrete backend beyond
//! the subscript convention passed to the expression printer.

pub mod application;
pub mod expr;
pub mod field;
pub mod kernel;
pub mod variable;

pub use application::{camel_postfix, Application};
pub use expr::{render_body, BinOp, Expr, Stmt, Subscript};
pub use field::Field;
pub use kernel::{IterDim, Kernel, Step};
pub use variable::Variable;
