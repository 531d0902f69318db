//! SAT-based upgrade planner.
//!
//! Translates a [`pkgsat_cudf::ProblemDescription`] into clauses using an
//! interval encoding of version ranges, then lets a SAT oracle pick the best
//! feasible installation for one of four optimization criteria.

pub mod error;
pub mod sat;
pub mod solver;
pub mod translator;

pub use error::{OracleError, Result, SolverError};
pub use sat::{Oracle, VarisatOracle};
pub use solver::{Criterion, InvalidCriterionError, PackageSolver, Transaction};
pub use translator::{translate, Translation, TranslationStats};
