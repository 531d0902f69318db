use std::fmt;
use std::ops::Not;

use indexmap::IndexSet;
use pkgsat_cudf::Version;

/// What a propositional atom stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Exactly this instance is installed
    Installed,
    /// Some version >= v is installed
    GeqOn,
    /// No version >= v is installed
    GeqOff,
    /// Some version <= v is installed
    LeqOn,
    /// No version <= v is installed
    LeqOff,
    /// CHANGED helper: this instance keeps its installation status
    Unchanged,
    /// NOTUPTODATE helper: some version of the name is installed
    AnyInstalled,
    /// NOTUPTODATE helper: nothing or the newest version is installed
    UpToDate,
    /// Definitional auxiliary introduced by CNF conversion
    Definition,
    /// Auxiliary of the sequential at-most-one encoding
    Sequential,
    /// Output of a totalizer counter
    Counter,
}

impl Role {
    /// Get the short tag used when printing atoms
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Installed => "installed",
            Role::GeqOn => "geq_on",
            Role::GeqOff => "geq_off",
            Role::LeqOn => "leq_on",
            Role::LeqOff => "leq_off",
            Role::Unchanged => "unchanged",
            Role::AnyInstalled => "any_installed",
            Role::UpToDate => "up_to_date",
            Role::Definition => "def",
            Role::Sequential => "seq",
            Role::Counter => "counter",
        }
    }

    /// Auxiliary roles carry no package name and are numbered instead
    pub fn is_auxiliary(&self) -> bool {
        matches!(self, Role::Definition | Role::Sequential | Role::Counter)
    }
}

/// A typed atom: role tag plus package name and version.
///
/// Per-name helpers use version 0, auxiliary atoms use an empty name and a
/// running number as version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub role: Role,
    pub name: String,
    pub version: Version,
}

impl Atom {
    pub fn new(role: Role, name: impl Into<String>, version: Version) -> Self {
        Self {
            role,
            name: name.into(),
            version,
        }
    }

    pub fn installed(name: impl Into<String>, version: Version) -> Self {
        Self::new(Role::Installed, name, version)
    }

    /// Create a helper atom that belongs to a package name rather than an instance
    pub fn per_name(role: Role, name: impl Into<String>) -> Self {
        Self::new(role, name, 0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.role.is_auxiliary() {
            write!(f, "{}#{}", self.role.as_str(), self.version)
        } else {
            write!(f, "{}({}, {})", self.role.as_str(), self.name, self.version)
        }
    }
}

/// Dense identifier of an interned atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u32);

impl AtomId {
    pub fn new(index: usize) -> Self {
        AtomId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn positive(self) -> Lit {
        Lit::new(self, true)
    }

    pub fn negative(self) -> Lit {
        Lit::new(self, false)
    }
}

/// An atom or its negation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lit {
    atom: AtomId,
    positive: bool,
}

impl Lit {
    pub fn new(atom: AtomId, positive: bool) -> Self {
        Self { atom, positive }
    }

    pub fn atom(self) -> AtomId {
        self.atom
    }

    pub fn is_positive(self) -> bool {
        self.positive
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit::new(self.atom, !self.positive)
    }
}

/// Bidirectional map between atoms and their dense ids.
///
/// Interning the same atom twice yields the same id. Ids are assigned in
/// insertion order, so truncating to an earlier length forgets exactly the
/// atoms created since.
#[derive(Debug, Clone, Default)]
pub struct AtomRegistry {
    atoms: IndexSet<Atom>,
}

impl AtomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id of an atom, registering it first if needed
    pub fn intern(&mut self, atom: Atom) -> AtomId {
        let (index, _) = self.atoms.insert_full(atom);
        AtomId::new(index)
    }

    /// Register a fresh auxiliary atom of the given role
    pub fn fresh(&mut self, role: Role) -> AtomId {
        debug_assert!(role.is_auxiliary());
        let number = self.atoms.len() as Version;
        self.intern(Atom::new(role, "", number))
    }

    /// Look up an atom without registering it
    pub fn lookup(&self, atom: &Atom) -> Option<AtomId> {
        self.atoms.get_index_of(atom).map(AtomId::new)
    }

    /// Get the atom behind an id
    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get_index(id.index())
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Forget every atom registered after the first `len` ones
    pub fn truncate(&mut self, len: usize) {
        self.atoms.truncate(len);
    }

    /// Iterate over `(id, atom)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter().enumerate().map(|(i, a)| (AtomId::new(i), a))
    }

    /// Get the ids of every atom with the given role
    pub fn ids_with_role(&self, role: Role) -> Vec<AtomId> {
        self.iter()
            .filter(|(_, atom)| atom.role == role)
            .map(|(id, _)| id)
            .collect()
    }

    /// Render a literal for debugging output
    pub fn describe(&self, lit: Lit) -> String {
        let atom = self
            .get(lit.atom())
            .map(|a| a.to_string())
            .unwrap_or_else(|| format!("?{}", lit.atom().index()));
        if lit.is_positive() {
            atom
        } else {
            format!("-{}", atom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut registry = AtomRegistry::new();
        let a = registry.intern(Atom::installed("foo", 1));
        let b = registry.intern(Atom::new(Role::GeqOn, "foo", 1));
        let c = registry.intern(Atom::installed("foo", 1));

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b).unwrap(), &Atom::new(Role::GeqOn, "foo", 1));
        assert_eq!(registry.lookup(&Atom::installed("foo", 1)), Some(a));
        assert_eq!(registry.lookup(&Atom::installed("foo", 2)), None);
    }

    #[test]
    fn test_fresh_atoms_are_distinct() {
        let mut registry = AtomRegistry::new();
        let a = registry.fresh(Role::Counter);
        let b = registry.fresh(Role::Counter);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_truncate_forgets_newer_atoms() {
        let mut registry = AtomRegistry::new();
        let a = registry.intern(Atom::installed("foo", 1));
        let mark = registry.len();
        registry.intern(Atom::installed("foo", 2));
        registry.fresh(Role::Definition);

        registry.truncate(mark);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&Atom::installed("foo", 2)), None);
        assert_eq!(registry.intern(Atom::installed("foo", 1)), a);
    }

    #[test]
    fn test_literal_negation() {
        let id = AtomId::new(3);
        let lit = id.positive();
        assert!(lit.is_positive());
        assert_eq!(!lit, id.negative());
        assert_eq!(!!lit, lit);
    }

    #[test]
    fn test_describe() {
        let mut registry = AtomRegistry::new();
        let id = registry.intern(Atom::new(Role::LeqOff, "bar", 2));
        assert_eq!(registry.describe(id.positive()), "leq_off(bar, 2)");
        assert_eq!(registry.describe(id.negative()), "-leq_off(bar, 2)");
    }
}
