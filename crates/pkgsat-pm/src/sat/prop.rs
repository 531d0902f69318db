//! Small propositional formula type with constant folding and CNF conversion

use super::atom::{AtomRegistry, Lit, Role};
use super::clause::Clause;

/// Above this many clauses a disjunction is not distributed but encoded
/// with definition atoms.
const DISTRIBUTION_LIMIT: usize = 32;

/// Propositional formula over literals.
///
/// The constructors fold constants and flatten nested operators of the same
/// kind, so `True`/`False` only ever appear at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prop {
    True,
    False,
    Lit(Lit),
    Or(Vec<Prop>),
    And(Vec<Prop>),
}

impl Prop {
    pub fn constant(value: bool) -> Prop {
        if value {
            Prop::True
        } else {
            Prop::False
        }
    }

    pub fn lit(lit: Lit) -> Prop {
        Prop::Lit(lit)
    }

    /// Build a disjunction
    pub fn or(operands: impl IntoIterator<Item = Prop>) -> Prop {
        let mut items = Vec::new();
        for operand in operands {
            match operand {
                Prop::True => return Prop::True,
                Prop::False => {}
                Prop::Or(inner) => items.extend(inner),
                other => items.push(other),
            }
        }
        match items.len() {
            0 => Prop::False,
            1 => items.remove(0),
            _ => Prop::Or(items),
        }
    }

    /// Build a conjunction
    pub fn and(operands: impl IntoIterator<Item = Prop>) -> Prop {
        let mut items = Vec::new();
        for operand in operands {
            match operand {
                Prop::False => return Prop::False,
                Prop::True => {}
                Prop::And(inner) => items.extend(inner),
                other => items.push(other),
            }
        }
        match items.len() {
            0 => Prop::True,
            1 => items.remove(0),
            _ => Prop::And(items),
        }
    }

    /// `lit -> consequent`
    pub fn implies(lit: Lit, consequent: Prop) -> Prop {
        Prop::or([Prop::Lit(!lit), consequent])
    }

    /// Convert to clauses.
    ///
    /// Disjunctions are distributed while the result stays small; larger
    /// ones get a definition atom `d -> child` per compound child
    /// (one-sided, since every formula is asserted positively).
    pub fn to_cnf(&self, registry: &mut AtomRegistry) -> Vec<Clause> {
        match self {
            Prop::True => Vec::new(),
            Prop::False => vec![Vec::new()],
            Prop::Lit(lit) => vec![vec![*lit]],
            Prop::And(children) => children
                .iter()
                .flat_map(|child| child.to_cnf(registry))
                .collect(),
            Prop::Or(children) => {
                let mut parts: Vec<Vec<Clause>> =
                    children.iter().map(|child| child.to_cnf(registry)).collect();

                let product = parts
                    .iter()
                    .try_fold(1usize, |acc, part| acc.checked_mul(part.len()))
                    .unwrap_or(usize::MAX);

                let mut definitions = Vec::new();
                if product > DISTRIBUTION_LIMIT {
                    for part in parts.iter_mut().filter(|part| part.len() > 1) {
                        let def = registry.fresh(Role::Definition);
                        for clause in part.drain(..) {
                            let mut defined = clause;
                            defined.push(def.negative());
                            definitions.push(defined);
                        }
                        part.push(vec![def.positive()]);
                    }
                }

                let mut result: Vec<Clause> = vec![Vec::new()];
                for part in parts {
                    let mut next = Vec::with_capacity(result.len() * part.len());
                    for prefix in &result {
                        for clause in &part {
                            let mut combined = prefix.clone();
                            combined.extend_from_slice(clause);
                            next.push(combined);
                        }
                    }
                    result = next;
                }
                result.extend(definitions);
                result
            }
        }
    }
}

impl From<Lit> for Prop {
    fn from(lit: Lit) -> Self {
        Prop::Lit(lit)
    }
}
