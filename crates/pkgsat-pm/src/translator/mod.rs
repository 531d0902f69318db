//! Constraint translator: turns a problem description into clause groups.
//!
//! ## Groups
//!
//! For every package instance, in universe order:
//!
//! 1. **Interval**: the ladder links of the instance (see [`ladder`])
//! 2. **Conflicts**: the instance's conflicts, read in conflict context
//! 3. **Depends**: the instance's dependency formula, read in dependency context
//!
//! followed by a single **Request** group and a single **AtMostOne** group
//! holding one at-most-one constraint per package name with several
//! versions. A problem with `n` instances therefore yields `3n + 2` groups.
//!
//! The request is translated as the conflicts and dependencies of a package
//! that is always installed, so its guard folds away and the group only
//! mentions real atoms.

pub mod ladder;
pub mod predicate;

use std::collections::BTreeMap;
use std::time::Instant;

use pkgsat_cudf::{Package, ProblemDescription, Version};
use serde::Serialize;

use crate::sat::cardinality::at_most_one;
use crate::sat::{Atom, AtomRegistry, ClauseGroup, GroupKind, Lit, Prop, Role};
use predicate::Context;

/// Label of the group holding the at-most-one-version constraints
pub const AT_MOST_ONE_LABEL: &str = "Each package has at most one installed version";

/// Label of the request group
pub const REQUEST_LABEL: &str = "Request";

/// Translate a problem, interning every atom in `registry`
pub fn translate(problem: &ProblemDescription, registry: &mut AtomRegistry) -> Translation {
    Translator::new(problem, registry).translate()
}

/// Result of translating a problem
#[derive(Debug, Clone)]
pub struct Translation {
    pub groups: Vec<ClauseGroup>,
}

impl Translation {
    /// Total number of clauses over all groups
    pub fn clause_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Find a group by label
    pub fn group(&self, label: &str) -> Option<&ClauseGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn stats(&self, atoms: usize) -> TranslationStats {
        TranslationStats::collect(&self.groups, atoms)
    }
}

/// Number of groups and clauses of one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub groups: usize,
    pub clauses: usize,
}

/// Size summary of a set of clause groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    pub atoms: usize,
    pub groups: usize,
    pub clauses: usize,
    pub by_kind: BTreeMap<GroupKind, KindStats>,
}

impl TranslationStats {
    pub fn collect(groups: &[ClauseGroup], atoms: usize) -> Self {
        let mut stats = TranslationStats {
            atoms,
            ..Default::default()
        };
        for group in groups {
            stats.groups += 1;
            stats.clauses += group.len();
            let kind = stats.by_kind.entry(group.kind).or_default();
            kind.groups += 1;
            kind.clauses += group.len();
        }
        stats
    }
}

/// Stateful translator; borrows the problem and the atom registry
pub struct Translator<'a> {
    problem: &'a ProblemDescription,
    registry: &'a mut AtomRegistry,
}

impl<'a> Translator<'a> {
    pub fn new(problem: &'a ProblemDescription, registry: &'a mut AtomRegistry) -> Self {
        Self { problem, registry }
    }

    /// Generate all clause groups for the problem
    pub fn translate(mut self) -> Translation {
        let start = Instant::now();
        let problem = self.problem;
        let mut groups = Vec::with_capacity(problem.len() * 3 + 2);

        for package in problem.packages() {
            groups.push(self.interval_group(package));
            groups.push(self.conflicts_group(package));
            groups.push(self.depends_group(package));
        }
        groups.push(self.request_group());
        groups.push(self.at_most_one_group());

        let translation = Translation { groups };
        log::info!(
            "Translated {} package instances into {} groups, {} clauses, {} atoms in {:?}",
            problem.len(),
            translation.groups.len(),
            translation.clause_count(),
            self.registry.len(),
            start.elapsed()
        );
        translation
    }

    /// Get a positive literal for an instance-level atom
    pub(crate) fn atom(&mut self, role: Role, name: &str, version: Version) -> Lit {
        self.registry.intern(Atom::new(role, name, version)).positive()
    }

    /// `INSTALLED(name, version)`, or false if the instance does not exist
    pub(crate) fn installed(&mut self, name: &str, version: Version) -> Prop {
        if self.problem.contains(name, version) {
            Prop::Lit(self.atom(Role::Installed, name, version))
        } else {
            Prop::False
        }
    }

    pub(crate) fn not_installed(&mut self, name: &str, version: Version) -> Prop {
        if self.problem.contains(name, version) {
            Prop::Lit(!self.atom(Role::Installed, name, version))
        } else {
            Prop::True
        }
    }

    pub(crate) fn group(&mut self, kind: GroupKind, label: String, prop: Prop) -> ClauseGroup {
        let mut group = ClauseGroup::new(kind, label);
        group.extend(prop.to_cnf(self.registry));
        group
    }

    fn conflicts_group(&mut self, package: &Package) -> ClauseGroup {
        let (name, v) = package.key();
        let guard = Prop::Lit(!self.atom(Role::Installed, name, v));
        let parts: Vec<Prop> = package
            .conflicts
            .iter()
            .map(|c| self.predicate(guard.clone(), c, Context::Conflict))
            .collect();
        self.group(
            GroupKind::Conflicts,
            format!("Conflicts for {} version {}", name, v),
            Prop::and(parts),
        )
    }

    fn depends_group(&mut self, package: &Package) -> ClauseGroup {
        let (name, v) = package.key();
        let guard = Prop::Lit(!self.atom(Role::Installed, name, v));
        let depends = self.formula(&package.depends);
        self.group(
            GroupKind::Depends,
            format!("Depends for {} version {}", name, v),
            Prop::or([guard, depends]),
        )
    }

    fn request_group(&mut self) -> ClauseGroup {
        let request = self.problem.request();
        let mut parts = Vec::with_capacity(request.install.len() + request.remove.len());
        for p in &request.install {
            parts.push(self.predicate(Prop::False, p, Context::Dependency));
        }
        for p in &request.remove {
            parts.push(self.predicate(Prop::False, p, Context::Conflict));
        }
        self.group(GroupKind::Request, REQUEST_LABEL.to_string(), Prop::and(parts))
    }

    fn at_most_one_group(&mut self) -> ClauseGroup {
        let problem = self.problem;
        let mut group = ClauseGroup::new(GroupKind::AtMostOne, AT_MOST_ONE_LABEL);
        for name in problem.package_names() {
            let Some(versions) = problem.versions(name) else {
                continue;
            };
            if versions.len() < 2 {
                continue;
            }
            let lits: Vec<Lit> = versions
                .iter()
                .map(|v| self.atom(Role::Installed, name, *v))
                .collect();
            group.extend(at_most_one(&lits, self.registry));
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgsat_cudf::{PackageFormula, Relation, Request, VersionPredicate};

    /// Render clauses with sorted literals, sorted, for order-independent comparison
    fn render(registry: &AtomRegistry, group: &ClauseGroup) -> Vec<String> {
        let mut out: Vec<String> = group
            .clauses
            .iter()
            .map(|clause| {
                let mut lits: Vec<String> = clause.iter().map(|l| registry.describe(*l)).collect();
                lits.sort();
                lits.join(" | ")
            })
            .collect();
        out.sort();
        out
    }

    fn problem_with(p: Package, request: Request) -> ProblemDescription {
        ProblemDescription::new(
            vec![p, Package::new("q", 1), Package::new("q", 2), Package::new("q", 3)],
            request,
        )
        .unwrap()
    }

    /// Translate a problem where `p 1` conflicts with a single predicate on `q`
    fn conflict_clauses(relation: Relation, version: Version) -> Vec<String> {
        let p = Package::new("p", 1).with_conflicts(vec![VersionPredicate::new("q", relation, version)]);
        let problem = problem_with(p, Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        render(&registry, translation.group("Conflicts for p version 1").unwrap())
    }

    /// Translate a problem where `p 1` depends on a single predicate on `q`
    fn depends_clauses(relation: Relation, version: Version) -> Vec<String> {
        let p = Package::new("p", 1).with_depends(VersionPredicate::new("q", relation, version));
        let problem = problem_with(p, Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        render(&registry, translation.group("Depends for p version 1").unwrap())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ============================================================================
    // Interval groups
    // ============================================================================

    #[test]
    fn test_interval_interior_version() {
        let problem = problem_with(Package::new("p", 1), Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        let group = translation.group("Interval variables for q version 2").unwrap();
        assert_eq!(group.kind, GroupKind::Interval);
        assert_eq!(
            render(&registry, group),
            strings(&[
                "-geq_off(q, 2) | -installed(q, 2)",
                "-geq_off(q, 2) | geq_off(q, 3)",
                "-geq_on(q, 2) | geq_on(q, 3) | installed(q, 2)",
                "-leq_off(q, 2) | -installed(q, 2)",
                "-leq_off(q, 2) | leq_off(q, 1)",
                "-leq_on(q, 2) | installed(q, 2) | leq_on(q, 1)",
            ])
        );
    }

    #[test]
    fn test_interval_top_and_bottom() {
        let problem = problem_with(Package::new("p", 1), Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);

        assert_eq!(
            render(&registry, translation.group("Interval variables for q version 3").unwrap()),
            strings(&[
                "-geq_off(q, 3) | -installed(q, 3)",
                "-geq_on(q, 3) | installed(q, 3)",
                "-leq_off(q, 3) | -installed(q, 3)",
                "-leq_off(q, 3) | leq_off(q, 2)",
                "-leq_on(q, 3) | installed(q, 3) | leq_on(q, 2)",
            ])
        );
        assert_eq!(
            render(&registry, translation.group("Interval variables for q version 1").unwrap()),
            strings(&[
                "-geq_off(q, 1) | -installed(q, 1)",
                "-geq_off(q, 1) | geq_off(q, 2)",
                "-geq_on(q, 1) | geq_on(q, 2) | installed(q, 1)",
                "-leq_off(q, 1) | -installed(q, 1)",
                "-leq_on(q, 1) | installed(q, 1)",
            ])
        );
    }

    #[test]
    fn test_interval_skips_version_gaps() {
        let problem = ProblemDescription::new(
            vec![Package::new("r", 1), Package::new("r", 5)],
            Request::new(),
        )
        .unwrap();
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        let rendered = render(&registry, translation.group("Interval variables for r version 1").unwrap());
        assert!(rendered.contains(&"-geq_on(r, 1) | geq_on(r, 5) | installed(r, 1)".to_string()));
        assert!(registry.lookup(&Atom::new(Role::GeqOn, "r", 2)).is_none());
    }

    // ============================================================================
    // Conflict context
    // ============================================================================

    #[test]
    fn test_conflict_interior() {
        assert_eq!(conflict_clauses(Relation::Eq, 2), strings(&["-installed(p, 1) | -installed(q, 2)"]));
        assert_eq!(
            conflict_clauses(Relation::Ne, 2),
            strings(&["-installed(p, 1) | geq_off(q, 3)", "-installed(p, 1) | leq_off(q, 1)"])
        );
        assert_eq!(conflict_clauses(Relation::Ge, 2), strings(&["-installed(p, 1) | geq_off(q, 2)"]));
        assert_eq!(conflict_clauses(Relation::Gt, 2), strings(&["-installed(p, 1) | geq_off(q, 3)"]));
        assert_eq!(conflict_clauses(Relation::Le, 2), strings(&["-installed(p, 1) | leq_off(q, 2)"]));
        assert_eq!(conflict_clauses(Relation::Lt, 2), strings(&["-installed(p, 1) | leq_off(q, 1)"]));
    }

    #[test]
    fn test_conflict_boundaries() {
        // Nothing above the top or below the bottom can be installed
        assert!(conflict_clauses(Relation::Gt, 3).is_empty());
        assert!(conflict_clauses(Relation::Lt, 1).is_empty());
        assert_eq!(conflict_clauses(Relation::Ne, 3), strings(&["-installed(p, 1) | leq_off(q, 2)"]));
        assert_eq!(conflict_clauses(Relation::Ne, 1), strings(&["-installed(p, 1) | geq_off(q, 2)"]));
        assert_eq!(conflict_clauses(Relation::Ge, 3), strings(&["-installed(p, 1) | geq_off(q, 3)"]));
        assert_eq!(conflict_clauses(Relation::Le, 1), strings(&["-installed(p, 1) | leq_off(q, 1)"]));
    }

    #[test]
    fn test_conflict_unknown_versions() {
        assert!(conflict_clauses(Relation::Eq, 7).is_empty());
        assert!(conflict_clauses(Relation::Ge, 4).is_empty());
        assert_eq!(conflict_clauses(Relation::Ge, 0), strings(&["-installed(p, 1) | geq_off(q, 1)"]));
    }

    // ============================================================================
    // Dependency context
    // ============================================================================

    #[test]
    fn test_dependency_interior() {
        assert_eq!(depends_clauses(Relation::Eq, 2), strings(&["-installed(p, 1) | installed(q, 2)"]));
        assert_eq!(
            depends_clauses(Relation::Ne, 2),
            strings(&["-installed(p, 1) | geq_on(q, 3) | leq_on(q, 1)"])
        );
        assert_eq!(depends_clauses(Relation::Ge, 2), strings(&["-installed(p, 1) | geq_on(q, 2)"]));
        assert_eq!(depends_clauses(Relation::Gt, 2), strings(&["-installed(p, 1) | geq_on(q, 3)"]));
        assert_eq!(depends_clauses(Relation::Le, 2), strings(&["-installed(p, 1) | leq_on(q, 2)"]));
        assert_eq!(depends_clauses(Relation::Lt, 2), strings(&["-installed(p, 1) | leq_on(q, 1)"]));
    }

    #[test]
    fn test_dependency_boundaries() {
        // Unsatisfiable dependencies make the package uninstallable
        assert_eq!(depends_clauses(Relation::Gt, 3), strings(&["-installed(p, 1)"]));
        assert_eq!(depends_clauses(Relation::Lt, 1), strings(&["-installed(p, 1)"]));
        assert_eq!(depends_clauses(Relation::Ne, 3), strings(&["-installed(p, 1) | leq_on(q, 2)"]));
        assert_eq!(depends_clauses(Relation::Ne, 1), strings(&["-installed(p, 1) | geq_on(q, 2)"]));
        assert_eq!(depends_clauses(Relation::Ge, 3), strings(&["-installed(p, 1) | geq_on(q, 3)"]));
        assert_eq!(depends_clauses(Relation::Le, 1), strings(&["-installed(p, 1) | leq_on(q, 1)"]));
    }

    #[test]
    fn test_dependency_unknown_versions() {
        assert_eq!(depends_clauses(Relation::Eq, 7), strings(&["-installed(p, 1)"]));
        assert_eq!(depends_clauses(Relation::Le, 9), strings(&["-installed(p, 1) | leq_on(q, 3)"]));
    }

    #[test]
    fn test_dependency_unknown_package() {
        let p = Package::new("p", 1).with_depends(VersionPredicate::any("missing"));
        let problem = problem_with(p, Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        assert_eq!(
            render(&registry, translation.group("Depends for p version 1").unwrap()),
            strings(&["-installed(p, 1)"])
        );
    }

    #[test]
    fn test_dependency_formula_shapes() {
        let p = Package::new("p", 1).with_depends(PackageFormula::And(vec![
            PackageFormula::Or(vec![
                VersionPredicate::exact("q", 1).into(),
                VersionPredicate::exact("q", 3).into(),
            ]),
            VersionPredicate::new("q", Relation::Ne, 2).into(),
        ]));
        let problem = problem_with(p, Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        assert_eq!(
            render(&registry, translation.group("Depends for p version 1").unwrap()),
            strings(&[
                "-installed(p, 1) | geq_on(q, 3) | leq_on(q, 1)",
                "-installed(p, 1) | installed(q, 1) | installed(q, 3)",
            ])
        );
    }

    #[test]
    fn test_constant_dependencies() {
        let problem = ProblemDescription::new(
            vec![
                Package::new("t", 1).with_depends(PackageFormula::Constant(true)),
                Package::new("f", 1).with_depends(PackageFormula::Constant(false)),
            ],
            Request::new(),
        )
        .unwrap();
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        assert!(translation.group("Depends for t version 1").unwrap().is_empty());
        assert_eq!(
            render(&registry, translation.group("Depends for f version 1").unwrap()),
            strings(&["-installed(f, 1)"])
        );
    }

    // ============================================================================
    // Request and at-most-one
    // ============================================================================

    #[test]
    fn test_request_has_no_guard() {
        let mut request = Request::new();
        request
            .install(VersionPredicate::new("q", Relation::Ge, 2))
            .install(VersionPredicate::any("p"))
            .remove(VersionPredicate::exact("q", 3));
        let problem = problem_with(Package::new("p", 1), request);
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        let group = translation.group(REQUEST_LABEL).unwrap();
        assert_eq!(group.kind, GroupKind::Request);
        assert_eq!(
            render(&registry, group),
            strings(&["-installed(q, 3)", "geq_on(p, 1)", "geq_on(q, 2)"])
        );
    }

    #[test]
    fn test_unsatisfiable_request() {
        let mut request = Request::new();
        request.install(VersionPredicate::exact("q", 9));
        let problem = problem_with(Package::new("p", 1), request);
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        assert!(translation.group(REQUEST_LABEL).unwrap().is_contradiction());
    }

    #[test]
    fn test_at_most_one_only_for_multi_version_names() {
        let problem = problem_with(Package::new("p", 1), Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        let group = translation.group(AT_MOST_ONE_LABEL).unwrap();
        assert_eq!(
            render(&registry, group),
            strings(&[
                "-installed(q, 1) | -installed(q, 2)",
                "-installed(q, 1) | -installed(q, 3)",
                "-installed(q, 2) | -installed(q, 3)",
            ])
        );
    }

    #[test]
    fn test_group_count_and_stats() {
        let problem = problem_with(Package::new("p", 1), Request::new());
        let mut registry = AtomRegistry::new();
        let translation = translate(&problem, &mut registry);
        assert_eq!(translation.groups.len(), 3 * 4 + 2);

        let stats = translation.stats(registry.len());
        assert_eq!(stats.groups, 14);
        assert_eq!(stats.by_kind[&GroupKind::Interval].groups, 4);
        assert_eq!(stats.by_kind[&GroupKind::AtMostOne].clauses, 3);
        assert_eq!(stats.clauses, translation.clause_count());
        assert_eq!(stats.atoms, registry.len());
    }
}
