use std::fmt;

use pkgsat_cudf::{Installation, VersionPredicate};
use serde::Serialize;

/// A plan turning the current installation into a new one.
///
/// Every package name whose installation status changes appears in exactly
/// one of the three lists; each list is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Names that were not installed before
    pub install: Vec<VersionPredicate>,
    /// Names that are no longer installed
    pub remove: Vec<VersionPredicate>,
    /// Names installed before and after, at a different version
    pub upgrade: Vec<VersionPredicate>,
}

impl Transaction {
    /// Create a new empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the transaction between two installations
    pub fn from_installations(present: &Installation, result: &Installation) -> Self {
        let mut tx = Self::new();
        tx.calculate_operations(present, result);
        tx
    }

    fn calculate_operations(&mut self, present: &Installation, result: &Installation) {
        // Installation iterates by name, so the lists come out sorted
        for (name, old) in present.iter() {
            if result.contains(name, old) {
                continue;
            }
            match result.version_of(name) {
                Some(new) => self.upgrade.push(VersionPredicate::exact(name, new)),
                None => self.remove.push(VersionPredicate::exact(name, old)),
            }
        }

        for (name, version) in result.iter() {
            if present.version_of(name).is_none() {
                self.install.push(VersionPredicate::exact(name, version));
            }
        }
    }

    /// Check if the transaction changes nothing
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.remove.is_empty() && self.upgrade.is_empty()
    }

    /// Number of changed package names
    pub fn len(&self) -> usize {
        self.install.len() + self.remove.len() + self.upgrade.len()
    }

    /// Apply the transaction to an installation
    pub fn apply(&self, present: &Installation) -> Installation {
        let mut result = present.clone();
        for p in &self.remove {
            result.remove(&p.name);
        }
        for p in self.install.iter().chain(&self.upgrade) {
            result.insert(p.name.clone(), p.version);
        }
        result
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("install", &self.install),
            ("upgrade", &self.upgrade),
            ("remove", &self.remove),
        ];
        for (i, (label, items)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}:", label)?;
            for (j, p) in items.iter().enumerate() {
                let sep = if j == 0 { " " } else { ", " };
                write!(f, "{}{} {}", sep, p.name, p.version)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installation(pairs: &[(&str, i64)]) -> Installation {
        pairs.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_transaction() {
        let present = installation(&[("a", 1)]);
        let tx = Transaction::from_installations(&present, &present);
        assert!(tx.is_empty());
        assert_eq!(tx.len(), 0);
    }

    #[test]
    fn test_three_way_partition() {
        let present = installation(&[("a", 1), ("b", 1), ("c", 2)]);
        let result = installation(&[("a", 1), ("b", 3), ("d", 1), ("e", 2)]);
        let tx = Transaction::from_installations(&present, &result);

        assert_eq!(tx.upgrade, vec![VersionPredicate::exact("b", 3)]);
        assert_eq!(tx.remove, vec![VersionPredicate::exact("c", 2)]);
        assert_eq!(
            tx.install,
            vec![VersionPredicate::exact("d", 1), VersionPredicate::exact("e", 2)]
        );
        assert_eq!(tx.len(), 4);
    }

    #[test]
    fn test_downgrade_is_an_upgrade_entry() {
        let present = installation(&[("a", 3)]);
        let result = installation(&[("a", 1)]);
        let tx = Transaction::from_installations(&present, &result);
        assert_eq!(tx.upgrade, vec![VersionPredicate::exact("a", 1)]);
        assert!(tx.remove.is_empty());
    }

    #[test]
    fn test_apply_restores_result() {
        let present = installation(&[("a", 1), ("b", 1), ("c", 2)]);
        let result = installation(&[("b", 2), ("z", 1)]);
        let tx = Transaction::from_installations(&present, &result);
        assert_eq!(tx.apply(&present), result);
    }

    #[test]
    fn test_display() {
        let present = installation(&[("a", 1), ("b", 1)]);
        let result = installation(&[("b", 2), ("c", 1), ("d", 4)]);
        let tx = Transaction::from_installations(&present, &result);
        assert_eq!(tx.to_string(), "install: c 1, d 4\nupgrade: b 2\nremove: a 1");
    }
}
