//! Package universe model for the pkgsat upgrade planner
//!
//! This crate provides the immutable problem description (package instances,
//! dependency formulas, conflicts and the user request) together with a
//! reader for the small CUDF subset pkgsat problem files are written in.

mod error;
mod formula;
mod package;
pub mod parser;
mod predicate;
mod problem;
mod relation;
mod request;

/// Package versions are plain integers, totally ordered per package name
pub type Version = i64;

pub use error::{ModelError, ParseError};
pub use formula::PackageFormula;
pub use package::Package;
pub use parser::{parse_file, parse_reader, parse_str};
pub use predicate::{InvalidPredicateError, VersionPredicate};
pub use problem::{Installation, ProblemDescription, Violation};
pub use relation::{InvalidRelationError, Relation};
pub use request::Request;
