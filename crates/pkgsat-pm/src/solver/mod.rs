//! Optimization driver for package upgrade problems.
//!
//! # Architecture
//!
//! - [`translator`](crate::translator): problem description to clause groups
//! - [`Oracle`]: SAT backend holding the clauses, with checkpoint/restore
//! - [`Criterion`]: helper clauses and objective literals of one optimization goal
//! - [`Transaction`]: the install/upgrade/remove plan decoded from a model
//!
//! # Flow
//!
//! 1. Translate the problem and load every group into the oracle once
//! 2. Check the loaded clauses; an unsatisfiable problem yields no solver
//! 3. Take a baseline checkpoint
//! 4. Per optimization: restore the baseline, add the criterion's helper
//!    clauses, maximize its objective and decode the model
//! 5. Enumeration runs directly against the baseline
//!
//! # Example
//!
//! ```ignore
//! use pkgsat_pm::{Criterion, PackageSolver};
//!
//! let problem = pkgsat_cudf::parse_file("problem.cudf")?;
//! let mut solver = PackageSolver::new(&problem)?;
//! let plan = solver.optimal_solution(Criterion::Changed)?;
//! println!("{}", plan);
//! ```

mod criterion;
mod transaction;


use std::time::Instant;

use pkgsat_cudf::{Installation, ProblemDescription};

use crate::error::{Result, SolverError};
use crate::sat::{Assignment, Atom, AtomId, Checkpoint, Oracle, Role, Satisfiability, VarisatOracle};
use crate::translator::{self, TranslationStats};

pub use criterion::{Criterion, InvalidCriterionError};
pub use transaction::Transaction;

/// Solver for one problem description.
///
/// Owns its oracle exclusively; every operation takes `&mut self`.
pub struct PackageSolver<'a, O: Oracle = VarisatOracle> {
    problem: &'a ProblemDescription,
    oracle: O,
    baseline: Checkpoint,
    present: Installation,
    /// INSTALLED atoms of every instance, in universe order
    installed_atoms: Vec<AtomId>,
    stats: TranslationStats,
}

impl<'a> PackageSolver<'a, VarisatOracle> {
    /// Create a solver backed by varisat
    pub fn new(problem: &'a ProblemDescription) -> Result<Self> {
        Self::with_oracle(problem, VarisatOracle::new())
    }
}

impl<'a, O: Oracle> PackageSolver<'a, O> {
    /// Create a solver on a given oracle.
    ///
    /// Fails with [`SolverError::Unsatisfiable`] if no installation satisfies
    /// the problem.
    pub fn with_oracle(problem: &'a ProblemDescription, mut oracle: O) -> Result<Self> {
        let start = Instant::now();

        let translation = translator::translate(problem, oracle.registry_mut());
        let stats = translation.stats(oracle.registry().len());
        for group in translation.groups {
            oracle.add_clause_group(group);
        }

        log::debug!("Checking satisfiability of the base problem");
        if oracle.check_satisfiable()? == Satisfiability::Unsatisfiable {
            log::info!("Base problem is unsatisfiable ({:?})", start.elapsed());
            return Err(SolverError::Unsatisfiable);
        }

        let installed_atoms = problem
            .packages()
            .map(|p| oracle.declare_atom(Atom::installed(&p.name, p.version)))
            .collect();
        let baseline = oracle.checkpoint();

        log::info!(
            "Solver ready: {} groups, {} clauses, {} atoms in {:?}",
            stats.groups,
            stats.clauses,
            stats.atoms,
            start.elapsed()
        );

        Ok(Self {
            problem,
            oracle,
            baseline,
            present: problem.current_installation(),
            installed_atoms,
            stats,
        })
    }

    pub fn problem(&self) -> &ProblemDescription {
        self.problem
    }

    /// Size of the translated base problem
    pub fn translation_stats(&self) -> &TranslationStats {
        &self.stats
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Compute one plan that is optimal for the criterion
    pub fn optimal_solution(&mut self, criterion: Criterion) -> Result<Transaction> {
        let start = Instant::now();
        self.oracle.restore(self.baseline);

        let (group, objective) = criterion.encode(self.problem, &mut self.oracle);
        log::debug!(
            "Criterion {}: {} helper clauses, {} objective literals",
            criterion,
            group.len(),
            objective.len()
        );
        self.oracle.add_clause_group(group);

        // Decode before restoring: the model still mentions the helper atoms
        let outcome = self
            .oracle
            .maximize_true_count(&objective, &self.installed_atoms)
            .map(|model| model.map(|m| self.decode(&m)));
        self.oracle.restore(self.baseline);

        let transaction = outcome?.ok_or_else(|| {
            SolverError::InvariantViolation(format!(
                "criterion {} made the satisfiable base problem unsatisfiable",
                criterion
            ))
        })?;
        log::info!(
            "Optimal solution for {} found in {:?}: {} changes",
            criterion,
            start.elapsed(),
            transaction.len()
        );
        Ok(transaction)
    }

    /// Enumerate every feasible plan
    pub fn all_solutions(&mut self) -> Result<Vec<Transaction>> {
        self.solutions(None)
    }

    /// Enumerate feasible plans, stopping after `limit` of them
    pub fn solutions(&mut self, limit: Option<usize>) -> Result<Vec<Transaction>> {
        self.oracle.restore(self.baseline);
        let models = self.oracle.enumerate_models(&self.installed_atoms, limit)?;
        log::info!("Found {} solutions", models.len());
        Ok(models.iter().map(|m| self.decode(m)).collect())
    }

    /// Read the installed instances of a model
    pub fn installation_of(&self, assignment: &Assignment) -> Installation {
        let registry = self.oracle.registry();
        let mut installation = Installation::new();
        for id in assignment.true_atoms() {
            let Some(atom) = registry.get(id) else {
                panic!("assignment refers to unregistered atom {}", id.index());
            };
            if atom.role != Role::Installed {
                continue;
            }
            assert!(
                self.problem.contains(&atom.name, atom.version),
                "installed atom {} does not belong to any package instance",
                atom
            );
            let previous = installation.insert(atom.name.clone(), atom.version);
            assert!(
                previous.is_none(),
                "model installs two versions of {}",
                atom.name
            );
        }
        installation
    }

    fn decode(&self, assignment: &Assignment) -> Transaction {
        let result = self.installation_of(assignment);
        Transaction::from_installations(&self.present, &result)
    }
}
