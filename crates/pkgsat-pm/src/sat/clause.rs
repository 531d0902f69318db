use std::fmt;

use serde::Serialize;

use super::atom::Lit;

/// A disjunction of literals; the empty clause is unsatisfiable
pub type Clause = Vec<Lit>;

/// Origin of a clause group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GroupKind {
    /// Ladder links of one package instance
    Interval,
    /// Conflicts of one package instance
    Conflicts,
    /// Dependency formula of one package instance
    Depends,
    /// The user request
    Request,
    /// At most one installed version per package name
    AtMostOne,
    /// Helper clauses of an optimization criterion
    Criterion,
}

impl GroupKind {
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Interval,
        GroupKind::Conflicts,
        GroupKind::Depends,
        GroupKind::Request,
        GroupKind::AtMostOne,
        GroupKind::Criterion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Interval => "interval",
            GroupKind::Conflicts => "conflicts",
            GroupKind::Depends => "depends",
            GroupKind::Request => "request",
            GroupKind::AtMostOne => "at-most-one",
            GroupKind::Criterion => "criterion",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled set of clauses added to the oracle as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseGroup {
    pub kind: GroupKind,
    pub label: String,
    pub clauses: Vec<Clause>,
}

impl ClauseGroup {
    pub fn new(kind: GroupKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            clauses: Vec::new(),
        }
    }

    /// Add a clause, normalizing duplicate literals away and dropping
    /// tautologies
    pub fn add_clause(&mut self, mut clause: Clause) -> &mut Self {
        clause.sort();
        clause.dedup();
        let tautology = clause
            .windows(2)
            .any(|w| w[0].atom() == w[1].atom());
        if !tautology {
            self.clauses.push(clause);
        }
        self
    }

    pub fn extend(&mut self, clauses: impl IntoIterator<Item = Clause>) -> &mut Self {
        for clause in clauses {
            self.add_clause(clause);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether the group contains the empty clause
    pub fn is_contradiction(&self) -> bool {
        self.clauses.iter().any(|c| c.is_empty())
    }
}
