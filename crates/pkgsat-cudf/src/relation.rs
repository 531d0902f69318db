//! Comparison relations used in version predicates

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::Version;

/// Relation between a candidate version and the bound of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relation {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than or equal (>=)
    Ge,
    /// Greater than (>)
    Gt,
    /// Less than or equal (<=)
    Le,
    /// Less than (<)
    Lt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid relation: {0}")]
pub struct InvalidRelationError(pub String);

impl Relation {
    /// All relations, in declaration order
    pub const ALL: [Relation; 6] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Ge,
        Relation::Gt,
        Relation::Le,
        Relation::Lt,
    ];

    /// Get the canonical symbol of the relation
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ne => "!=",
            Relation::Ge => ">=",
            Relation::Gt => ">",
            Relation::Le => "<=",
            Relation::Lt => "<",
        }
    }

    /// Check whether `candidate <relation> bound` holds
    pub fn holds(&self, candidate: Version, bound: Version) -> bool {
        match self {
            Relation::Eq => candidate == bound,
            Relation::Ne => candidate != bound,
            Relation::Ge => candidate >= bound,
            Relation::Gt => candidate > bound,
            Relation::Le => candidate <= bound,
            Relation::Lt => candidate < bound,
        }
    }
}

impl FromStr for Relation {
    type Err = InvalidRelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Relation::Eq),
            "!=" => Ok(Relation::Ne),
            ">=" => Ok(Relation::Ge),
            ">" => Ok(Relation::Gt),
            "<=" => Ok(Relation::Le),
            "<" => Ok(Relation::Lt),
            _ => Err(InvalidRelationError(s.to_string())),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
