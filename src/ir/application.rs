//! Applications: one benchmark program assembled from kernels.

use super::field::Field;
use super::kernel::Step;
use super::variable::Variable;

/// A benchmark instance for one backend: size parameters, extra scalar
/// parameters and an ordered kernel/pseudo-kernel launch sequence.
///
/// `fields` is derived at construction: the union of reads and writes over
/// all non-pseudo steps, deduplicated by name and name-sorted so repeated
/// generation is byte-identical.
#[derive(Clone, Debug)]
pub struct Application {
    pub name: String,
    pub sizes: Vec<Variable>,
    pub parameters: Vec<Variable>,
    pub steps: Vec<Step>,
    pub fields: Vec<Field>,
}

impl Application {
    pub fn new(
        name: impl Into<String>,
        sizes: Vec<Variable>,
        parameters: Vec<Variable>,
        steps: Vec<Step>,
    ) -> Self {
        let mut fields: Vec<Field> = Vec::new();
        for kernel in steps.iter().filter_map(Step::kernel) {
            for f in kernel.reads.iter().chain(kernel.writes.iter()) {
                if !fields.contains(f) {
                    fields.push(f.clone());
                }
            }
        }
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            name: name.into(),
            sizes,
            parameters,
            steps,
            fields,
        }
    }

    /// Flop count per iteration summed across all kernels; backend-independent.
    pub fn num_flop(&self) -> u64 {
        self.steps
            .iter()
            .filter_map(Step::kernel)
            .map(|k| k.num_flop)
            .sum()
    }

    /// Camel-case identifier postfix: `stencil-2d` → `Stencil2D`.
    ///
    /// Used to name the init and verification routines shared through the
    /// benchmark's utility header.
    pub fn postfix(&self) -> String {
        camel_postfix(&self.name)
    }
}

/// Title-case each alphabetic run and strip separators.
pub fn camel_postfix(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c == '-' {
            prev_alpha = false;
            continue;
        }
        if c.is_alphabetic() && !prev_alpha {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}
