//! Typed scalar variables.

use std::fmt;

/// A named scalar with a declaration type.
///
/// Identity is the name alone: two variables with equal names are the same
/// variable in generated code, whatever their declared types. The type only
/// drives declaration syntax (`size_t nx`).
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub tpe: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, tpe: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tpe: tpe.into(),
        }
    }

    /// `size_t` scalar, the iteration and size type of every benchmark.
    pub fn size_t(name: impl Into<String>) -> Self {
        Self::new(name, "size_t")
    }

    /// Declaration fragment: `<tpe> <name>`.
    pub fn decl(&self) -> String {
        format!("{} {}", self.tpe, self.name)
    }

    /// True for reference and pointer types, which must not be const-qualified
    /// in generated signatures (out-parameters, argv).
    pub fn is_indirect(&self) -> bool {
        self.tpe.contains('&') || self.tpe.contains('*')
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
