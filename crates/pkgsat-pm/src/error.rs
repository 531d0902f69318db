use thiserror::Error;

/// Failures reported by a SAT backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("SAT backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum SolverError {
    // Problem errors
    #[error("The problem has no solution: the installation constraints and the request are unsatisfiable")]
    Unsatisfiable,

    // Internal errors
    #[error("Internal solver invariant violated: {0}")]
    InvariantViolation(String),

    // Backend errors
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type Result<T> = std::result::Result<T, SolverError>;
