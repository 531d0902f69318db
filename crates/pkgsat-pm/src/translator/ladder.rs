//! Interval ("ladder") atoms over the ordered versions of one package name.
//!
//! `GEQ_ON(p, v)` claims that some version `>= v` of `p` is installed,
//! `GEQ_OFF(p, v)` that none is; `LEQ_*` mirror this downwards. Each claim
//! is only ever implied one way, by linking every version to its neighbour:
//!
//! ```text
//! GEQ_ON(p,v)  -> INSTALLED(p,v) | GEQ_ON(p,next)
//! GEQ_OFF(p,v) -> -INSTALLED(p,v)
//! GEQ_OFF(p,v) -> GEQ_OFF(p,next)
//! LEQ_ON(p,v)  -> INSTALLED(p,v) | LEQ_ON(p,prev)
//! LEQ_OFF(p,v) -> -INSTALLED(p,v)
//! LEQ_OFF(p,v) -> LEQ_OFF(p,prev)
//! ```
//!
//! Neighbours are taken from the catalog, so gaps in the version numbers
//! are skipped. Past the ends of the ladder an ON claim is false and an
//! OFF claim holds trivially.

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use pkgsat_cudf::{Package, Version};

use super::Translator;
use crate::sat::{ClauseGroup, GroupKind, Prop, Role};

/// Where on the ladder a predicate points, relative to a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The smallest version `>= v`
    AtLeast(Version),
    /// The smallest version `> v`
    Above(Version),
    /// The largest version `<= v`
    AtMost(Version),
    /// The largest version `< v`
    Below(Version),
}

impl Bound {
    /// Find the catalog version this bound lands on, if any
    pub fn resolve(self, versions: &BTreeSet<Version>) -> Option<Version> {
        match self {
            Bound::AtLeast(v) => versions.range(v..).next(),
            Bound::Above(v) => versions.range((Excluded(v), Unbounded)).next(),
            Bound::AtMost(v) => versions.range(..=v).next_back(),
            Bound::Below(v) => versions.range(..v).next_back(),
        }
        .copied()
    }
}

/// Value of a ladder atom that would sit past the end of the ladder
fn past_the_end(role: Role) -> Prop {
    match role {
        Role::GeqOff | Role::LeqOff => Prop::True,
        _ => Prop::False,
    }
}

impl Translator<'_> {
    /// Get the ladder atom of `role` for `name` at the catalog version the
    /// bound resolves to, or the constant it folds to.
    pub(crate) fn ladder(&mut self, role: Role, name: &str, bound: Bound) -> Prop {
        let resolved = self
            .problem
            .versions(name)
            .and_then(|versions| bound.resolve(versions));
        match resolved {
            Some(version) => Prop::Lit(self.atom(role, name, version)),
            None => past_the_end(role),
        }
    }

    /// Build the six ladder links of one package instance
    pub(crate) fn interval_group(&mut self, package: &Package) -> ClauseGroup {
        let (name, v) = package.key();
        let installed = self.atom(Role::Installed, name, v);
        let geq_on = self.atom(Role::GeqOn, name, v);
        let geq_off = self.atom(Role::GeqOff, name, v);
        let leq_on = self.atom(Role::LeqOn, name, v);
        let leq_off = self.atom(Role::LeqOff, name, v);

        let next_on = self.ladder(Role::GeqOn, name, Bound::Above(v));
        let next_off = self.ladder(Role::GeqOff, name, Bound::Above(v));
        let prev_on = self.ladder(Role::LeqOn, name, Bound::Below(v));
        let prev_off = self.ladder(Role::LeqOff, name, Bound::Below(v));

        let links = Prop::and([
            Prop::implies(geq_on, Prop::or([Prop::Lit(installed), next_on])),
            Prop::implies(geq_off, Prop::Lit(!installed)),
            Prop::implies(geq_off, next_off),
            Prop::implies(leq_on, Prop::or([Prop::Lit(installed), prev_on])),
            Prop::implies(leq_off, Prop::Lit(!installed)),
            Prop::implies(leq_off, prev_off),
        ]);

        self.group(
            GroupKind::Interval,
            format!("Interval variables for {} version {}", name, v),
            links,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(vs: &[Version]) -> BTreeSet<Version> {
        vs.iter().copied().collect()
    }

    #[test]
    fn test_resolve_exact() {
        let vs = versions(&[1, 2, 3]);
        assert_eq!(Bound::AtLeast(2).resolve(&vs), Some(2));
        assert_eq!(Bound::AtMost(2).resolve(&vs), Some(2));
        assert_eq!(Bound::Above(2).resolve(&vs), Some(3));
        assert_eq!(Bound::Below(2).resolve(&vs), Some(1));
    }

    #[test]
    fn test_resolve_ends() {
        let vs = versions(&[1, 2, 3]);
        assert_eq!(Bound::Above(3).resolve(&vs), None);
        assert_eq!(Bound::Below(1).resolve(&vs), None);
        assert_eq!(Bound::AtLeast(4).resolve(&vs), None);
        assert_eq!(Bound::AtMost(0).resolve(&vs), None);
        assert_eq!(Bound::AtLeast(-5).resolve(&vs), Some(1));
    }

    #[test]
    fn test_resolve_skips_gaps() {
        let vs = versions(&[1, 4, 9]);
        assert_eq!(Bound::AtLeast(2).resolve(&vs), Some(4));
        assert_eq!(Bound::Above(4).resolve(&vs), Some(9));
        assert_eq!(Bound::AtMost(8).resolve(&vs), Some(4));
        assert_eq!(Bound::Below(4).resolve(&vs), Some(1));
    }

    #[test]
    fn test_past_the_end_constants() {
        assert_eq!(past_the_end(Role::GeqOn), Prop::False);
        assert_eq!(past_the_end(Role::LeqOn), Prop::False);
        assert_eq!(past_the_end(Role::GeqOff), Prop::True);
        assert_eq!(past_the_end(Role::LeqOff), Prop::True);
    }
}
