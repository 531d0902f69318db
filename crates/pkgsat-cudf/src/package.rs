use serde::Serialize;

use crate::formula::PackageFormula;
use crate::predicate::VersionPredicate;
use crate::Version;

/// One package instance of the universe, identified by `(name, version)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub version: Version,
    /// Formula that must hold whenever this instance is installed
    pub depends: PackageFormula,
    /// Predicates that must not hold whenever this instance is installed
    pub conflicts: Vec<VersionPredicate>,
    /// Whether this instance is part of the current installation
    pub installed: bool,
}

impl Package {
    /// Create a package with no dependencies and no conflicts
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            depends: PackageFormula::tautology(),
            conflicts: Vec::new(),
            installed: false,
        }
    }

    pub fn with_depends(mut self, depends: impl Into<PackageFormula>) -> Self {
        self.depends = depends.into();
        self
    }

    pub fn with_conflicts(mut self, conflicts: Vec<VersionPredicate>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Mark this instance as currently installed
    pub fn installed(mut self) -> Self {
        self.installed = true;
        self
    }

    /// Get the identity key of this instance
    pub fn key(&self) -> (&str, Version) {
        (&self.name, self.version)
    }

    /// Get a human-readable identifier, e.g. `foo 2`
    pub fn pretty_string(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
