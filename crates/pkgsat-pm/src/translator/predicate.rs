//! Translation of version predicates and dependency formulas.
//!
//! A predicate on `q` means something different depending on where it
//! appears. As a dependency it asks for some installed version of `q`
//! inside the range (ON atoms); as a conflict it asks for no installed
//! version inside the range (OFF atoms). Both are guarded by the package
//! that states them not being installed.

use pkgsat_cudf::{PackageFormula, Relation, VersionPredicate};

use super::ladder::Bound;
use super::Translator;
use crate::sat::{Prop, Role};

/// Where a predicate occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Conflicts and request removals: the predicate must not hold
    Conflict,
    /// Dependencies and request installs: the predicate must hold
    Dependency,
}

impl Translator<'_> {
    /// Translate `guard | <predicate in context>`
    pub(crate) fn predicate(&mut self, guard: Prop, predicate: &VersionPredicate, context: Context) -> Prop {
        let q = predicate.name.as_str();
        let v = predicate.version;

        match context {
            Context::Conflict => match predicate.relation {
                Relation::Eq => Prop::or([guard, self.not_installed(q, v)]),
                Relation::Ne => {
                    let below = self.ladder(Role::LeqOff, q, Bound::Below(v));
                    let above = self.ladder(Role::GeqOff, q, Bound::Above(v));
                    Prop::and([Prop::or([guard.clone(), below]), Prop::or([guard, above])])
                }
                Relation::Ge => Prop::or([guard, self.ladder(Role::GeqOff, q, Bound::AtLeast(v))]),
                Relation::Gt => Prop::or([guard, self.ladder(Role::GeqOff, q, Bound::Above(v))]),
                Relation::Le => Prop::or([guard, self.ladder(Role::LeqOff, q, Bound::AtMost(v))]),
                Relation::Lt => Prop::or([guard, self.ladder(Role::LeqOff, q, Bound::Below(v))]),
            },
            Context::Dependency => {
                let holds = match predicate.relation {
                    Relation::Eq => self.installed(q, v),
                    Relation::Ne => {
                        let below = self.ladder(Role::LeqOn, q, Bound::Below(v));
                        let above = self.ladder(Role::GeqOn, q, Bound::Above(v));
                        Prop::or([below, above])
                    }
                    Relation::Ge => self.ladder(Role::GeqOn, q, Bound::AtLeast(v)),
                    Relation::Gt => self.ladder(Role::GeqOn, q, Bound::Above(v)),
                    Relation::Le => self.ladder(Role::LeqOn, q, Bound::AtMost(v)),
                    Relation::Lt => self.ladder(Role::LeqOn, q, Bound::Below(v)),
                };
                Prop::or([guard, holds])
            }
        }
    }

    /// Translate a dependency formula; every leaf is read in dependency context
    pub(crate) fn formula(&mut self, formula: &PackageFormula) -> Prop {
        match formula {
            PackageFormula::Constant(value) => Prop::constant(*value),
            PackageFormula::Predicate(p) => self.predicate(Prop::False, p, Context::Dependency),
            PackageFormula::Or(children) => {
                let parts: Vec<Prop> = children.iter().map(|c| self.formula(c)).collect();
                Prop::or(parts)
            }
            PackageFormula::And(children) => {
                let parts: Vec<Prop> = children.iter().map(|c| self.formula(c)).collect();
                Prop::and(parts)
            }
        }
    }
}
