//! Dependency formulas over version predicates

use std::fmt;

use serde::Serialize;

use crate::predicate::VersionPredicate;
use crate::problem::Installation;

/// Boolean formula over version predicates.
///
/// There is no negation node: conflicts are kept as a flat list of
/// predicates on the package itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PackageFormula {
    Constant(bool),
    Predicate(VersionPredicate),
    Or(Vec<PackageFormula>),
    And(Vec<PackageFormula>),
}

impl PackageFormula {
    /// Formula that always holds
    pub fn tautology() -> Self {
        PackageFormula::Constant(true)
    }

    /// Evaluate the formula against a concrete installation
    pub fn evaluate(&self, installation: &Installation) -> bool {
        match self {
            PackageFormula::Constant(value) => *value,
            PackageFormula::Predicate(predicate) => installation.satisfies(predicate),
            PackageFormula::Or(children) => children.iter().any(|c| c.evaluate(installation)),
            PackageFormula::And(children) => children.iter().all(|c| c.evaluate(installation)),
        }
    }

    /// Iterate over every predicate mentioned in the formula
    pub fn predicates(&self) -> Vec<&VersionPredicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a VersionPredicate>) {
        match self {
            PackageFormula::Constant(_) => {}
            PackageFormula::Predicate(p) => out.push(p),
            PackageFormula::Or(children) | PackageFormula::And(children) => {
                for child in children {
                    child.collect_predicates(out);
                }
            }
        }
    }
}

impl Default for PackageFormula {
    fn default() -> Self {
        Self::tautology()
    }
}

impl From<VersionPredicate> for PackageFormula {
    fn from(predicate: VersionPredicate) -> Self {
        PackageFormula::Predicate(predicate)
    }
}

impl fmt::Display for PackageFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFormula::Constant(true) => f.write_str("true!"),
            PackageFormula::Constant(false) => f.write_str("false!"),
            PackageFormula::Predicate(p) => write!(f, "{}", p),
            PackageFormula::Or(children) => write_joined(f, children, " | "),
            PackageFormula::And(children) => write_joined(f, children, ", "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[PackageFormula], sep: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", child)?;
    }
    Ok(())
}
