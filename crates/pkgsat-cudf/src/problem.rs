//! The problem description: package universe plus request

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ModelError;
use crate::package::Package;
use crate::predicate::VersionPredicate;
use crate::request::Request;
use crate::Version;

/// A concrete installation state: at most one version per package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Installation {
    versions: BTreeMap<String, Version>,
}

impl Installation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `version` of `name`, replacing any other installed version
    pub fn insert(&mut self, name: impl Into<String>, version: Version) -> Option<Version> {
        self.versions.insert(name.into(), version)
    }

    pub fn remove(&mut self, name: &str) -> Option<Version> {
        self.versions.remove(name)
    }

    /// Get the installed version of a package name
    pub fn version_of(&self, name: &str) -> Option<Version> {
        self.versions.get(name).copied()
    }

    pub fn contains(&self, name: &str, version: Version) -> bool {
        self.version_of(name) == Some(version)
    }

    /// Check whether some installed instance satisfies the predicate
    pub fn satisfies(&self, predicate: &VersionPredicate) -> bool {
        self.version_of(&predicate.name)
            .is_some_and(|v| predicate.relation.holds(v, predicate.version))
    }

    /// Iterate over `(name, version)` pairs sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, Version)> {
        self.versions.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<(String, Version)> for Installation {
    fn from_iter<I: IntoIterator<Item = (String, Version)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

/// Reason why an installation is not consistent with a problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// An installed instance does not exist in the universe
    UnknownPackage { name: String, version: Version },
    /// An installed instance has an unsatisfied dependency formula
    UnmetDependency { name: String, version: Version },
    /// An installed instance conflicts with another installed instance
    Conflict {
        name: String,
        version: Version,
        predicate: VersionPredicate,
    },
    /// A request install predicate does not hold
    InstallNotSatisfied(VersionPredicate),
    /// A request remove predicate still holds
    RemoveNotSatisfied(VersionPredicate),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownPackage { name, version } => {
                write!(f, "{} {} is not part of the universe", name, version)
            }
            Violation::UnmetDependency { name, version } => {
                write!(f, "{} {} has unmet dependencies", name, version)
            }
            Violation::Conflict {
                name,
                version,
                predicate,
            } => write!(f, "{} {} conflicts with {}", name, version, predicate),
            Violation::InstallNotSatisfied(p) => write!(f, "requested {} is not installed", p),
            Violation::RemoveNotSatisfied(p) => write!(f, "{} should have been removed", p),
        }
    }
}

/// The immutable problem: universe of package instances and a request.
///
/// Instances keep insertion order; the per-name version catalog is sorted.
#[derive(Debug, Clone)]
pub struct ProblemDescription {
    packages: IndexMap<(String, Version), Package>,
    catalog: BTreeMap<String, BTreeSet<Version>>,
    request: Request,
}

impl ProblemDescription {
    /// Build a problem, validating identity and single-installation invariants
    pub fn new(packages: Vec<Package>, request: Request) -> Result<Self, ModelError> {
        let mut by_key: IndexMap<(String, Version), Package> = IndexMap::with_capacity(packages.len());
        let mut catalog: BTreeMap<String, BTreeSet<Version>> = BTreeMap::new();
        let mut installed: BTreeMap<String, Version> = BTreeMap::new();

        for package in packages {
            let key = (package.name.clone(), package.version);
            if by_key.contains_key(&key) {
                return Err(ModelError::DuplicatePackage {
                    name: package.name,
                    version: package.version,
                });
            }
            if package.installed {
                if let Some(&first) = installed.get(&package.name) {
                    return Err(ModelError::MultipleInstalled {
                        name: package.name,
                        first,
                        second: package.version,
                    });
                }
                installed.insert(package.name.clone(), package.version);
            }
            catalog
                .entry(package.name.clone())
                .or_default()
                .insert(package.version);
            by_key.insert(key, package);
        }

        log::debug!(
            "Problem with {} instances of {} packages, {} installed",
            by_key.len(),
            catalog.len(),
            installed.len()
        );

        Ok(Self {
            packages: by_key,
            catalog,
            request,
        })
    }

    /// Iterate over every package instance in insertion order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Get the number of package instances
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Look up one instance
    pub fn package(&self, name: &str, version: Version) -> Option<&Package> {
        self.packages.get(&(name.to_string(), version))
    }

    pub fn contains(&self, name: &str, version: Version) -> bool {
        self.catalog.get(name).is_some_and(|vs| vs.contains(&version))
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Get every package name, sorted
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.catalog.keys().map(String::as_str)
    }

    /// Get the known versions of a name in ascending order (empty if unknown)
    pub fn versions(&self, name: &str) -> Option<&BTreeSet<Version>> {
        self.catalog.get(name)
    }

    pub fn min_version(&self, name: &str) -> Option<Version> {
        self.catalog.get(name).and_then(|vs| vs.first().copied())
    }

    pub fn max_version(&self, name: &str) -> Option<Version> {
        self.catalog.get(name).and_then(|vs| vs.last().copied())
    }

    /// Get the installation described by the `installed` flags
    pub fn current_installation(&self) -> Installation {
        self.packages
            .values()
            .filter(|p| p.installed)
            .map(|p| (p.name.clone(), p.version))
            .collect()
    }

    /// Check an installation against every dependency, conflict and request
    /// obligation. The installation is consistent iff the result is empty.
    pub fn check(&self, installation: &Installation) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (name, version) in installation.iter() {
            let Some(package) = self.package(name, version) else {
                violations.push(Violation::UnknownPackage {
                    name: name.to_string(),
                    version,
                });
                continue;
            };

            if !package.depends.evaluate(installation) {
                violations.push(Violation::UnmetDependency {
                    name: name.to_string(),
                    version,
                });
            }

            for conflict in &package.conflicts {
                if installation.satisfies(conflict) {
                    violations.push(Violation::Conflict {
                        name: name.to_string(),
                        version,
                        predicate: conflict.clone(),
                    });
                }
            }
        }

        for predicate in &self.request.install {
            if !installation.satisfies(predicate) {
                violations.push(Violation::InstallNotSatisfied(predicate.clone()));
            }
        }
        for predicate in &self.request.remove {
            if installation.satisfies(predicate) {
                violations.push(Violation::RemoveNotSatisfied(predicate.clone()));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::PackageFormula;
    use crate::relation::Relation;

    fn sample() -> ProblemDescription {
        let packages = vec![
            Package::new("a", 1).installed(),
            Package::new("a", 3),
            Package::new("b", 1).with_depends(VersionPredicate::new("a", Relation::Ge, 2)),
            Package::new("c", 1).with_conflicts(vec![VersionPredicate::any("b")]),
        ];
        let mut request = Request::new();
        request.install(VersionPredicate::any("b"));
        ProblemDescription::new(packages, request).unwrap()
    }

    #[test]
    fn test_catalog_queries() {
        let problem = sample();
        assert_eq!(problem.len(), 4);
        assert_eq!(problem.package_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(problem.versions("a").unwrap().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(problem.min_version("a"), Some(1));
        assert_eq!(problem.max_version("a"), Some(3));
        assert_eq!(problem.max_version("zzz"), None);
        assert!(problem.contains("a", 3));
        assert!(!problem.contains("a", 2));
    }

    #[test]
    fn test_current_installation() {
        let problem = sample();
        let current = problem.current_installation();
        assert_eq!(current.len(), 1);
        assert_eq!(current.version_of("a"), Some(1));
    }

    #[test]
    fn test_duplicate_package_rejected() {
        let err = ProblemDescription::new(
            vec![Package::new("a", 1), Package::new("a", 1)],
            Request::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicatePackage {
                name: "a".to_string(),
                version: 1
            }
        );
    }

    #[test]
    fn test_multiple_installed_rejected() {
        let err = ProblemDescription::new(
            vec![Package::new("a", 1).installed(), Package::new("a", 2).installed()],
            Request::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::MultipleInstalled { first: 1, second: 2, .. }));
    }

    #[test]
    fn test_check_consistent_installation() {
        let problem = sample();
        let inst: Installation = [("a".to_string(), 3), ("b".to_string(), 1)].into_iter().collect();
        assert!(problem.check(&inst).is_empty());
    }

    #[test]
    fn test_check_reports_violations() {
        let problem = sample();

        // b needs a >= 2, c conflicts with b, d does not exist
        let inst: Installation = [
            ("a".to_string(), 1),
            ("b".to_string(), 1),
            ("c".to_string(), 1),
            ("d".to_string(), 1),
        ]
        .into_iter()
        .collect();
        let violations = problem.check(&inst);

        assert!(violations.contains(&Violation::UnmetDependency {
            name: "b".to_string(),
            version: 1
        }));
        assert!(violations.iter().any(|v| matches!(v, Violation::Conflict { name, .. } if name == "c")));
        assert!(violations.contains(&Violation::UnknownPackage {
            name: "d".to_string(),
            version: 1
        }));
    }

    #[test]
    fn test_check_request() {
        let mut request = Request::new();
        request
            .install(VersionPredicate::exact("a", 2))
            .remove(VersionPredicate::any("b"));
        let problem = ProblemDescription::new(
            vec![
                Package::new("a", 2),
                Package::new("b", 1).installed().with_depends(PackageFormula::Constant(true)),
            ],
            request,
        )
        .unwrap();

        let violations = problem.check(&problem.current_installation());
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], Violation::InstallNotSatisfied(_)));
        assert!(matches!(violations[1], Violation::RemoveNotSatisfied(_)));
    }
}
