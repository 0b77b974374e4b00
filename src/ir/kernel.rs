//! Kernels: one computational step over an iteration space.

use super::expr::{Expr, Stmt};
use super::field::Field;
use super::variable::Variable;

/// One dimension of an iteration space: `for it in [lower, upper)`.
#[derive(Clone, Debug)]
pub struct IterDim {
    pub it: Variable,
    pub lower: Expr,
    pub upper: Expr,
}

impl IterDim {
    pub fn new(it: Variable, lower: impl Into<Expr>, upper: impl Into<Expr>) -> Self {
        Self {
            it,
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

/// A named computation with declared reads, writes and flop cost.
///
/// The parameter order presented to generated code is fixed:
/// *(reads − writes), then writes, then scalar variables*, deduplicated in
/// first-occurrence order. Definition and launch must agree byte-for-byte,
/// so both are derived from [`Kernel::param_fields`].
#[derive(Clone, Debug)]
pub struct Kernel {
    pub name: String,
    pub variables: Vec<Variable>,
    pub reads: Vec<Field>,
    pub writes: Vec<Field>,
    pub it_space: Vec<IterDim>,
    pub body: Vec<Stmt>,
    pub has_tpe_template: bool,
    pub num_flop: u64,
}

impl Kernel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        variables: Vec<Variable>,
        reads: Vec<Field>,
        writes: Vec<Field>,
        it_space: Vec<IterDim>,
        body: Vec<Stmt>,
        num_flop: u64,
    ) -> Self {
        Self {
            name: name.into(),
            variables,
            reads,
            writes,
            it_space,
            body,
            has_tpe_template: true,
            num_flop,
        }
    }

    pub fn without_tpe_template(mut self) -> Self {
        self.has_tpe_template = false;
        self
    }

    /// Generated identifier: the display name with separators stripped.
    pub fn fct_name(&self) -> String {
        self.name.replace('-', "")
    }

    /// Field parameters in the fixed order: read-only fields first, then
    /// written fields, deduplicated by name in first-occurrence order.
    pub fn param_fields(&self) -> Vec<&Field> {
        let mut params: Vec<&Field> = Vec::new();
        for f in &self.reads {
            if !self.writes.contains(f) && !params.contains(&f) {
                params.push(f);
            }
        }
        for f in &self.writes {
            if !params.contains(&f) {
                params.push(f);
            }
        }
        params
    }

    /// Fields read but not written, in declaration order.
    pub fn read_only_fields(&self) -> Vec<&Field> {
        self.reads
            .iter()
            .filter(|f| !self.writes.contains(f))
            .collect()
    }

    pub fn dims(&self) -> usize {
        self.it_space.len()
    }
}

/// One element of an application's launch sequence.
#[derive(Clone, Debug)]
pub enum Step {
    Compute(Kernel),
    /// Launch-only bookkeeping statement (e.g. a ping-pong buffer swap);
    /// contributes no kernel definition, no reads/writes and no flops.
    Pseudo(String),
}

impl Step {
    pub fn kernel(&self) -> Option<&Kernel> {
        match self {
            Step::Compute(k) => Some(k),
            Step::Pseudo(_) => None,
        }
    }
}
