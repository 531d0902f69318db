use thiserror::Error;

use crate::Version;

/// Invariant violations detected while building a problem description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Duplicate package: {name} version {version}")]
    DuplicatePackage { name: String, version: Version },

    #[error("Package {name} has more than one installed version ({first} and {second})")]
    MultipleInstalled {
        name: String,
        first: Version,
        second: Version,
    },
}

/// Errors raised by the CUDF-subset reader
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: property {property:?} outside of a stanza")]
    OrphanProperty { line: usize, property: String },

    #[error("Line {line}: package {name} has no version")]
    MissingVersion { line: usize, name: String },

    #[error("Line {line}: invalid version {value:?}")]
    InvalidVersion { line: usize, value: String },

    #[error("Line {line}: invalid boolean {value:?}")]
    InvalidBool { line: usize, value: String },

    #[error("Line {line}: invalid package predicate {value:?}")]
    InvalidPredicate { line: usize, value: String },

    #[error("No request stanza found")]
    MissingRequest,

    #[error("Line {line}: more than one request stanza")]
    DuplicateRequest { line: usize },

    #[error("Invalid problem: {0}")]
    Model(#[from] ModelError),
}
