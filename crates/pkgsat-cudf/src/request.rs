use serde::Serialize;

use crate::predicate::VersionPredicate;

/// What the user asks for: predicates that must hold and predicates that
/// must not hold after the transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Request {
    pub install: Vec<VersionPredicate>,
    pub remove: Vec<VersionPredicate>,
}

impl Request {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a predicate to hold
    pub fn install(&mut self, predicate: VersionPredicate) -> &mut Self {
        self.install.push(predicate);
        self
    }

    /// Require a predicate not to hold
    pub fn remove(&mut self, predicate: VersionPredicate) -> &mut Self {
        self.remove.push(predicate);
        self
    }

    /// Check if the request asks for nothing
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.remove.is_empty()
    }
}
