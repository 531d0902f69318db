//! Cardinality encodings: at-most-one constraints and totalizer counters

use super::atom::{AtomRegistry, Lit, Role};
use super::clause::Clause;

/// Up to this many literals the at-most-one constraint is encoded pairwise
const PAIRWISE_LIMIT: usize = 5;

/// Encode "at most one of `lits` is true".
///
/// Small sets use the pairwise encoding. Larger sets use the sequential
/// counter, which needs `n - 1` auxiliary atoms but only `3n - 4` clauses.
pub fn at_most_one(lits: &[Lit], registry: &mut AtomRegistry) -> Vec<Clause> {
    if lits.len() < 2 {
        return Vec::new();
    }
    if lits.len() <= PAIRWISE_LIMIT {
        return pairwise(lits);
    }

    let n = lits.len();
    let seq: Vec<Lit> = (0..n - 1)
        .map(|_| registry.fresh(Role::Sequential).positive())
        .collect();

    let mut clauses = Vec::with_capacity(3 * n);
    clauses.push(vec![!lits[0], seq[0]]);
    for i in 1..n - 1 {
        clauses.push(vec![!lits[i], seq[i]]);
        clauses.push(vec![!seq[i - 1], seq[i]]);
        clauses.push(vec![!lits[i], !seq[i - 1]]);
    }
    clauses.push(vec![!lits[n - 1], !seq[n - 2]]);
    clauses
}

fn pairwise(lits: &[Lit]) -> Vec<Clause> {
    let mut clauses = Vec::new();
    for (i, a) in lits.iter().enumerate() {
        for b in &lits[i + 1..] {
            clauses.push(vec![!*a, !*b]);
        }
    }
    clauses
}

/// Totalizer counter over a set of literals.
///
/// `outputs()[k - 1]` implies that at least `k` inputs are true. Only the
/// clauses pushing the count upwards are generated, which is all a search
/// that assumes outputs needs.
#[derive(Debug)]
pub struct Totalizer {
    outputs: Vec<Lit>,
    clauses: Vec<Clause>,
}

impl Totalizer {
    /// Build the counter, registering output atoms in `registry`
    pub fn build(inputs: &[Lit], registry: &mut AtomRegistry) -> Self {
        let mut clauses = Vec::new();
        let outputs = if inputs.is_empty() {
            Vec::new()
        } else {
            Self::node(inputs, registry, &mut clauses)
        };
        Self { outputs, clauses }
    }

    fn node(inputs: &[Lit], registry: &mut AtomRegistry, clauses: &mut Vec<Clause>) -> Vec<Lit> {
        if inputs.len() == 1 {
            return inputs.to_vec();
        }

        let (left, right) = inputs.split_at(inputs.len() / 2);
        let a = Self::node(left, registry, clauses);
        let b = Self::node(right, registry, clauses);

        let total = a.len() + b.len();
        let out: Vec<Lit> = (0..total)
            .map(|_| registry.fresh(Role::Counter).positive())
            .collect();

        // out[i + j] (at least i+j+1) needs a above i or b above j
        for i in 0..=a.len() {
            for j in 0..=b.len() {
                if i + j >= total {
                    continue;
                }
                let mut clause = vec![!out[i + j]];
                if i < a.len() {
                    clause.push(a[i]);
                }
                if j < b.len() {
                    clause.push(b[j]);
                }
                clauses.push(clause);
            }
        }
        out
    }

    /// Literal meaning "at least `k` inputs are true" (`1 <= k <= len`)
    pub fn at_least(&self, k: usize) -> Option<Lit> {
        k.checked_sub(1).and_then(|i| self.outputs.get(i)).copied()
    }

    pub fn outputs(&self) -> &[Lit] {
        &self.outputs
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }
}
