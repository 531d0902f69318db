use std::collections::BTreeMap;

use super::atom::{Atom, AtomId, AtomRegistry, Lit};
use super::clause::ClauseGroup;
use crate::error::OracleError;

/// Outcome of a satisfiability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfiability {
    Satisfiable,
    Unsatisfiable,
}

impl Satisfiability {
    pub fn is_sat(self) -> bool {
        self == Satisfiability::Satisfiable
    }
}

/// Saved oracle state: number of clause groups and atoms at the time it was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    groups: usize,
    atoms: usize,
}

impl Checkpoint {
    pub fn new(groups: usize, atoms: usize) -> Self {
        Self { groups, atoms }
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn atoms(&self) -> usize {
        self.atoms
    }
}

/// Truth values of a set of relevant atoms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: BTreeMap<AtomId, bool>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, atom: AtomId, value: bool) {
        self.values.insert(atom, value);
    }

    /// Get the value of an atom, `None` if it is not part of the assignment
    pub fn value(&self, atom: AtomId) -> Option<bool> {
        self.values.get(&atom).copied()
    }

    /// Check whether a literal is true; atoms outside the assignment count as false
    pub fn satisfies(&self, lit: Lit) -> bool {
        self.value(lit.atom()).unwrap_or(false) == lit.is_positive()
    }

    pub fn true_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.values.iter().filter(|(_, v)| **v).map(|(id, _)| *id)
    }

    pub fn count_true(&self, lits: &[Lit]) -> usize {
        lits.iter().filter(|l| self.satisfies(**l)).count()
    }

    /// Keep only the given atoms
    pub fn project(&self, atoms: &[AtomId]) -> Assignment {
        Assignment {
            values: atoms
                .iter()
                .map(|id| (*id, self.value(*id).unwrap_or(false)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(AtomId, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (AtomId, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The SAT/MaxSAT engine the planner drives.
///
/// An oracle owns the atom registry and a stack of clause groups. Everything
/// added after a checkpoint can be discarded again with [`Oracle::restore`].
pub trait Oracle {
    fn registry(&self) -> &AtomRegistry;

    fn registry_mut(&mut self) -> &mut AtomRegistry;

    /// Get the id of an atom, registering it if needed
    fn declare_atom(&mut self, atom: Atom) -> AtomId {
        self.registry_mut().intern(atom)
    }

    /// Add a group of clauses on top of the current stack
    fn add_clause_group(&mut self, group: ClauseGroup);

    /// Check whether the loaded clauses are satisfiable
    fn check_satisfiable(&mut self) -> Result<Satisfiability, OracleError>;

    /// Remember the current clause stack and atom registry
    fn checkpoint(&self) -> Checkpoint;

    /// Discard every clause group and atom added after the checkpoint
    fn restore(&mut self, checkpoint: Checkpoint);

    /// Enumerate the distinct assignments of `projection` that extend to a
    /// model of the loaded clauses. The loaded clause set is unchanged
    /// afterwards.
    fn enumerate_models(
        &mut self,
        projection: &[AtomId],
        limit: Option<usize>,
    ) -> Result<Vec<Assignment>, OracleError>;

    /// Find a model maximizing the number of true `objective` literals.
    ///
    /// The returned assignment covers the objective atoms and
    /// `keep_relevant`. `None` means the loaded clauses are unsatisfiable.
    fn maximize_true_count(
        &mut self,
        objective: &[Lit],
        keep_relevant: &[AtomId],
    ) -> Result<Option<Assignment>, OracleError>;
}
