//! [`Oracle`] implementation on top of the varisat CDCL solver.
//!
//! varisat has no way to retract clauses, so the oracle keeps a log of the
//! loaded clause groups and rebuilds a fresh solver whenever clauses had to
//! be dropped (restore, enumeration blocking clauses, counter clauses).

use std::time::Instant;

use varisat::{ExtendFormula, Solver, Var};

use super::atom::{AtomId, AtomRegistry, Lit};
use super::cardinality::Totalizer;
use super::clause::{Clause, ClauseGroup};
use super::oracle::{Assignment, Checkpoint, Oracle, Satisfiability};
use crate::error::OracleError;

pub struct VarisatOracle {
    registry: AtomRegistry,
    groups: Vec<ClauseGroup>,
    /// Live solver and the number of logged groups it has seen
    live: Option<(Solver<'static>, usize)>,
}

impl Default for VarisatOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VarisatOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarisatOracle")
            .field("atoms", &self.registry.len())
            .field("groups", &self.groups.len())
            .field("live", &self.live.is_some())
            .finish()
    }
}

fn to_varisat(lit: Lit) -> varisat::Lit {
    let var = Var::from_index(lit.atom().index());
    if lit.is_positive() {
        var.positive()
    } else {
        var.negative()
    }
}

fn to_varisat_clause(clause: &Clause) -> Vec<varisat::Lit> {
    clause.iter().map(|l| to_varisat(*l)).collect()
}

fn backend(err: impl std::fmt::Display) -> OracleError {
    OracleError::Backend(err.to_string())
}

impl VarisatOracle {
    pub fn new() -> Self {
        Self {
            registry: AtomRegistry::new(),
            groups: Vec::new(),
            live: None,
        }
    }

    /// Get the loaded clause groups, oldest first
    pub fn groups(&self) -> &[ClauseGroup] {
        &self.groups
    }

    /// Total number of loaded clauses
    pub fn clause_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    fn has_empty_clause(&self) -> bool {
        self.groups.iter().any(|g| g.is_contradiction())
    }

    /// Bring the live solver up to date with the group log
    fn solver(&mut self) -> &mut Solver<'static> {
        let (solver, loaded) = self.live.get_or_insert_with(|| {
            log::trace!("Rebuilding varisat solver");
            (Solver::new(), 0)
        });
        for group in &self.groups[*loaded..] {
            for clause in &group.clauses {
                solver.add_clause(&to_varisat_clause(clause));
            }
        }
        *loaded = self.groups.len();
        solver
    }

    /// Drop the live solver; the next query rebuilds it from the log
    fn invalidate(&mut self) {
        self.live = None;
    }

    /// Solve under assumptions and read the model
    fn solve_with(&mut self, assumptions: &[Lit]) -> Result<Option<Assignment>, OracleError> {
        if self.has_empty_clause() {
            return Ok(None);
        }
        let assumptions: Vec<varisat::Lit> = assumptions.iter().map(|l| to_varisat(*l)).collect();
        let solver = self.solver();
        solver.assume(&assumptions);
        if !solver.solve().map_err(backend)? {
            return Ok(None);
        }
        let model = solver
            .model()
            .ok_or_else(|| OracleError::Backend("satisfiable but no model available".to_string()))?;

        // Atoms that never occur in a clause are missing from the model; they are false
        let mut assignment = Assignment::new();
        for lit in model {
            assignment.set(AtomId::new(lit.var().index()), lit.is_positive());
        }
        Ok(Some(assignment))
    }

    fn add_live_clauses(&mut self, clauses: &[Clause]) {
        let solver = self.solver();
        for clause in clauses {
            solver.add_clause(&to_varisat_clause(clause));
        }
    }
}

impl Oracle for VarisatOracle {
    fn registry(&self) -> &AtomRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut AtomRegistry {
        &mut self.registry
    }

    fn add_clause_group(&mut self, group: ClauseGroup) {
        log::trace!("Adding group {:?} ({} clauses)", group.label, group.len());
        self.groups.push(group);
    }

    fn check_satisfiable(&mut self) -> Result<Satisfiability, OracleError> {
        Ok(match self.solve_with(&[])? {
            Some(_) => Satisfiability::Satisfiable,
            None => Satisfiability::Unsatisfiable,
        })
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.groups.len(), self.registry.len())
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        if self.groups.len() > checkpoint.groups() {
            self.groups.truncate(checkpoint.groups());
            self.invalidate();
        }
        if self.registry.len() > checkpoint.atoms() {
            self.registry.truncate(checkpoint.atoms());
            self.invalidate();
        }
    }

    fn enumerate_models(
        &mut self,
        projection: &[AtomId],
        limit: Option<usize>,
    ) -> Result<Vec<Assignment>, OracleError> {
        let start = Instant::now();
        let mut models = Vec::new();

        while limit.map_or(true, |max| models.len() < max) {
            let Some(model) = self.solve_with(&[])? else {
                break;
            };
            let projected = model.project(projection);

            // Block this projection; nothing left to vary without atoms
            let blocking: Clause = projection
                .iter()
                .map(|id| {
                    if projected.value(*id) == Some(true) {
                        id.negative()
                    } else {
                        id.positive()
                    }
                })
                .collect();
            models.push(projected);
            if blocking.is_empty() {
                break;
            }
            self.add_live_clauses(&[blocking]);
        }

        // Blocking clauses only live in the solver, not in the group log
        self.invalidate();

        log::debug!(
            "Enumerated {} models over {} atoms in {:?}",
            models.len(),
            projection.len(),
            start.elapsed()
        );
        Ok(models)
    }

    fn maximize_true_count(
        &mut self,
        objective: &[Lit],
        keep_relevant: &[AtomId],
    ) -> Result<Option<Assignment>, OracleError> {
        let start = Instant::now();
        let Some(mut best_model) = self.solve_with(&[])? else {
            return Ok(None);
        };
        let mut best = best_model.count_true(objective);
        log::debug!("Initial objective value {} of {}", best, objective.len());

        if best < objective.len() {
            let atoms_before = self.registry.len();
            let totalizer = Totalizer::build(objective, &mut self.registry);
            self.add_live_clauses(totalizer.clauses());

            // Linear SAT-UNSAT search: ask for one more true literal each round
            while let Some(at_least) = totalizer.at_least(best + 1) {
                match self.solve_with(&[at_least])? {
                    Some(model) => {
                        let value = model.count_true(objective);
                        debug_assert!(value > best);
                        log::debug!("Improved objective value to {}", value);
                        best = value;
                        best_model = model;
                    }
                    None => break,
                }
            }

            self.registry.truncate(atoms_before);
            self.invalidate();
        }

        let mut relevant: Vec<AtomId> = keep_relevant.to_vec();
        relevant.extend(objective.iter().map(|l| l.atom()));
        relevant.sort();
        relevant.dedup();

        log::info!(
            "Optimum {} of {} objective literals found in {:?}",
            best,
            objective.len(),
            start.elapsed()
        );
        Ok(Some(best_model.project(&relevant)))
    }
}
