//! Version predicates (`name`, `name >= 2`, ...)

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::relation::Relation;
use crate::Version;

lazy_static! {
    static ref VPKG_RE: Regex =
        Regex::new(r"^\s*([^\s<>=!|,]+)\s*(?:(==|=|!=|>=|<=|>|<)\s*(-?\d+))?\s*$").unwrap();
}

/// A constraint on one package name: `name relation version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionPredicate {
    pub name: String,
    pub relation: Relation,
    pub version: Version,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version predicate: {0:?}")]
pub struct InvalidPredicateError(pub String);

impl VersionPredicate {
    /// Create a new predicate
    pub fn new(name: impl Into<String>, relation: Relation, version: Version) -> Self {
        Self {
            name: name.into(),
            relation,
            version,
        }
    }

    /// Predicate satisfied by exactly one instance
    pub fn exact(name: impl Into<String>, version: Version) -> Self {
        Self::new(name, Relation::Eq, version)
    }

    /// Predicate for a bare package name, satisfied by any installed version
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Relation::Ge, 1)
    }

    /// Check whether the instance `(name, version)` satisfies this predicate
    pub fn matches(&self, name: &str, version: Version) -> bool {
        self.name == name && self.relation.holds(version, self.version)
    }
}

impl FromStr for VersionPredicate {
    type Err = InvalidPredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VPKG_RE
            .captures(s)
            .ok_or_else(|| InvalidPredicateError(s.to_string()))?;
        let name = caps[1].to_string();

        match (caps.get(2), caps.get(3)) {
            (Some(rel), Some(ver)) => {
                let relation = rel
                    .as_str()
                    .parse()
                    .map_err(|_| InvalidPredicateError(s.to_string()))?;
                let version = ver
                    .as_str()
                    .parse()
                    .map_err(|_| InvalidPredicateError(s.to_string()))?;
                Ok(Self::new(name, relation, version))
            }
            _ => Ok(Self::any(name)),
        }
    }
}

impl fmt::Display for VersionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.relation, self.version)
    }
}
