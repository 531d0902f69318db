use std::fmt;
use std::str::FromStr;

use pkgsat_cudf::{Installation, ProblemDescription};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sat::{Atom, ClauseGroup, GroupKind, Lit, Oracle, Role};

/// Optimization criterion for choosing among feasible installations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Keep as many currently installed packages as possible
    Removed,
    /// Install as few new packages as possible
    New,
    /// Change the installation status of as few package instances as possible
    Changed,
    /// Have as many packages as possible either absent or at their newest version
    #[serde(alias = "not-up-to-date")]
    NotUpToDate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown criterion {0:?} (expected one of: removed, new, changed, notuptodate)")]
pub struct InvalidCriterionError(pub String);

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Removed,
        Criterion::New,
        Criterion::Changed,
        Criterion::NotUpToDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Removed => "removed",
            Criterion::New => "new",
            Criterion::Changed => "changed",
            Criterion::NotUpToDate => "notuptodate",
        }
    }

    /// Value of the criterion's objective on a concrete installation.
    ///
    /// This is the number of objective literals the encoding makes true for
    /// the installation, so an optimal plan maximizes it.
    pub fn score(&self, problem: &ProblemDescription, installation: &Installation) -> usize {
        let current = problem.current_installation();
        match self {
            Criterion::Removed => current
                .iter()
                .filter(|(name, _)| installation.version_of(name).is_some())
                .count(),
            Criterion::New => problem
                .package_names()
                .filter(|name| current.version_of(name).is_none())
                .filter(|name| installation.version_of(name).is_none())
                .count(),
            Criterion::Changed => problem
                .packages()
                .filter(|p| installation.contains(&p.name, p.version) == p.installed)
                .count(),
            Criterion::NotUpToDate => problem
                .package_names()
                .filter(|name| match installation.version_of(name) {
                    None => true,
                    Some(v) => problem.max_version(name) == Some(v),
                })
                .count(),
        }
    }

    /// Register helper atoms and clauses for this criterion with the
    /// oracle; returns the helper group and the objective literals.
    pub(crate) fn encode<O: Oracle>(
        &self,
        problem: &ProblemDescription,
        oracle: &mut O,
    ) -> (ClauseGroup, Vec<Lit>) {
        let mut group = ClauseGroup::new(GroupKind::Criterion, format!("Criterion {}", self));
        let mut objective = Vec::new();
        let current = problem.current_installation();

        match self {
            Criterion::Removed => {
                for (name, _) in current.iter() {
                    if let Some(min) = problem.min_version(name) {
                        let id = oracle.declare_atom(Atom::new(Role::GeqOn, name, min));
                        objective.push(id.positive());
                    }
                }
            }
            Criterion::New => {
                for name in problem.package_names() {
                    if current.version_of(name).is_some() {
                        continue;
                    }
                    if let Some(min) = problem.min_version(name) {
                        let id = oracle.declare_atom(Atom::new(Role::GeqOff, name, min));
                        objective.push(id.positive());
                    }
                }
            }
            Criterion::Changed => {
                for package in problem.packages() {
                    let installed = oracle
                        .declare_atom(Atom::installed(&package.name, package.version))
                        .positive();
                    let helper = oracle
                        .declare_atom(Atom::new(Role::Unchanged, &package.name, package.version))
                        .positive();
                    let keep = if package.installed { installed } else { !installed };
                    group.add_clause(vec![!helper, keep]);
                    objective.push(helper);
                }
            }
            Criterion::NotUpToDate => {
                for package in problem.packages() {
                    let installed = oracle
                        .declare_atom(Atom::installed(&package.name, package.version))
                        .positive();
                    let any = oracle
                        .declare_atom(Atom::per_name(Role::AnyInstalled, &package.name))
                        .positive();
                    group.add_clause(vec![!installed, any]);
                }
                for name in problem.package_names() {
                    let Some(max) = problem.max_version(name) else {
                        continue;
                    };
                    let newest = oracle.declare_atom(Atom::installed(name, max)).positive();
                    let any = oracle.declare_atom(Atom::per_name(Role::AnyInstalled, name)).positive();
                    let up_to_date = oracle.declare_atom(Atom::per_name(Role::UpToDate, name)).positive();
                    // up_to_date <-> (!any | newest)
                    group.add_clause(vec![!up_to_date, !any, newest]);
                    group.add_clause(vec![up_to_date, any]);
                    group.add_clause(vec![up_to_date, !newest]);
                    objective.push(up_to_date);
                }
            }
        }

        (group, objective)
    }
}

impl FromStr for Criterion {
    type Err = InvalidCriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "removed" => Ok(Criterion::Removed),
            "new" => Ok(Criterion::New),
            "changed" => Ok(Criterion::Changed),
            "notuptodate" => Ok(Criterion::NotUpToDate),
            _ => Err(InvalidCriterionError(s.to_string())),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
