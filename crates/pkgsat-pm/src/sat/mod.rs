//! Propositional layer: typed atoms, clause groups and the oracle interface.

mod atom;
pub mod cardinality;
mod clause;
mod oracle;
mod prop;
mod varisat_oracle;

pub use atom::{Atom, AtomId, AtomRegistry, Lit, Role};
pub use clause::{Clause, ClauseGroup, GroupKind};
pub use oracle::{Assignment, Checkpoint, Oracle, Satisfiability};
pub use prop::Prop;
pub use varisat_oracle::VarisatOracle;
