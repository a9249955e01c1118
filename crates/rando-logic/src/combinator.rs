// crates/rando-logic/src/combinator.rs
// ============================================================================
// Module: Rule Combinators
// Description: Child storage and normalization for And, Or, and Count.
// Purpose: Keep combinator trees flat, deduplicated, and merged at construction.
// Dependencies: crate::{error, leaf, rule}, smallvec
// ============================================================================

//! ## Overview
//! `And` and `Or` hold a [`RuleSet`]: an insertion-ordered set of children
//! compared as a set. Building one flattens same-kind children, merges
//! combinable leaves (same item and player for `Received`, same player for
//! `HasProgressionPercent`), and drops duplicates. `Count` holds an ordered
//! list and is never flattened, since "k of n" does not associate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use smallvec::SmallVec;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::rule::Rule;

// ============================================================================
// SECTION: Junction
// ============================================================================

/// Which set combinator is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    /// Every child must hold (`And`).
    All,
    /// At least one child must hold (`Or`).
    Any,
}

impl Junction {
    /// Variant name used in errors and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "And",
            Self::Any => "Or",
        }
    }

    /// Literal that decides the whole combinator on its own.
    #[must_use]
    pub const fn absorber(self) -> Rule {
        match self {
            Self::All => Rule::False,
            Self::Any => Rule::True,
        }
    }

    /// Literal that can be dropped from the combinator.
    #[must_use]
    pub const fn identity(self) -> Rule {
        match self {
            Self::All => Rule::True,
            Self::Any => Rule::False,
        }
    }

    /// Wraps a set into the matching rule variant.
    pub(crate) fn wrap(self, set: RuleSet) -> Rule {
        match self {
            Self::All => Rule::And(set),
            Self::Any => Rule::Or(set),
        }
    }

    /// Returns the child set when `rule` is the same kind of combinator.
    const fn children_of(self, rule: &Rule) -> Option<&RuleSet> {
        match (self, rule) {
            (Self::All, Rule::And(set)) | (Self::Any, Rule::Or(set)) => Some(set),
            _ => None,
        }
    }

    /// Merges two combinable leaves, or returns `None` when they are not.
    fn merge(self, existing: &Rule, incoming: &Rule) -> Option<Rule> {
        match (existing, incoming) {
            (Rule::Received(left), Rule::Received(right)) if left.same_key(right) => {
                let count = match self {
                    Self::All => left.count().max(right.count()),
                    Self::Any => left.count().min(right.count()),
                };
                Some(Rule::Received(left.with_count(count)))
            }
            (Rule::HasProgressionPercent(left), Rule::HasProgressionPercent(right))
                if left.same_key(right) =>
            {
                let percent = match self {
                    Self::All => left.percent().max(right.percent()),
                    Self::Any => left.percent().min(right.percent()),
                };
                Some(Rule::HasProgressionPercent(left.with_percent(percent)))
            }
            _ => None,
        }
    }

    /// Flattens, merges, and deduplicates `rules` into one child set.
    pub(crate) fn normalize(self, rules: impl IntoIterator<Item = Rule>) -> RuleSet {
        let mut set = RuleSet::default();
        for rule in rules {
            if let Some(nested) = self.children_of(&rule) {
                for child in nested.iter() {
                    self.insert(&mut set, child.clone());
                }
            } else {
                self.insert(&mut set, rule);
            }
        }
        set
    }

    /// Inserts one already-flat child into `set`.
    fn insert(self, set: &mut RuleSet, rule: Rule) {
        for slot in &mut set.rules {
            if let Some(merged) = self.merge(slot, &rule) {
                **slot = merged;
                return;
            }
            if **slot == rule {
                return;
            }
        }
        set.rules.push(Box::new(rule));
    }

    /// Builds a combinator, rejecting an empty child list.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::EmptyCombinator`] when `rules` is empty.
    pub(crate) fn build(self, rules: impl IntoIterator<Item = Rule>) -> RuleResult<Rule> {
        let set = self.normalize(rules);
        if set.is_empty() {
            return Err(RuleError::EmptyCombinator {
                kind: self.name(),
            });
        }
        Ok(self.wrap(set))
    }

    /// Normalizes `rules` and collapses trivial results.
    ///
    /// Empty input yields the identity literal and a single child stands for
    /// itself.
    pub(crate) fn finish(self, rules: impl IntoIterator<Item = Rule>) -> Rule {
        let mut set = self.normalize(rules);
        match set.rules.len() {
            0 => self.identity(),
            1 => set.rules.pop().map_or_else(|| self.identity(), |rule| *rule),
            _ => self.wrap(set),
        }
    }

    /// Joins two rules the way the `&` and `|` operators do.
    pub(crate) fn join(self, left: Rule, right: Rule) -> Rule {
        let absorber = self.absorber();
        if left == absorber || right == absorber {
            return absorber;
        }
        let identity = self.identity();
        if left == identity {
            return right;
        }
        if right == identity {
            return left;
        }
        self.finish([left, right])
    }
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

/// Insertion-ordered, deduplicated children of an `And` or `Or`.
///
/// # Invariants
/// - No two children are equal.
/// - No child is the same combinator kind as its parent.
/// - Equality and hashing ignore insertion order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Children in insertion order.
    rules: SmallVec<[Box<Rule>; 4]>,
}

impl RuleSet {
    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Returns true when `rule` is one of the children.
    #[must_use]
    pub fn contains(&self, rule: &Rule) -> bool {
        self.iter().any(|child| child == rule)
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|rule| other.contains(rule))
    }
}

impl Eq for RuleSet {}

impl Hash for RuleSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0u64, |acc, rule| {
            let mut hasher = DefaultHasher::new();
            rule.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

// ============================================================================
// SECTION: Count
// ============================================================================

/// "At least `count` of these rules hold."
///
/// # Invariants
/// - `1 <= count <= rules.len()`.
/// - Child order is preserved; it only affects short-circuit cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Count {
    /// Required number of passing children.
    count: usize,
    /// Children scanned in order.
    rules: SmallVec<[Box<Rule>; 8]>,
}

impl Count {
    /// Builds a threshold rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidCount`] when `count` is zero or larger than
    /// the number of rules.
    pub fn new(count: usize, rules: impl IntoIterator<Item = Rule>) -> RuleResult<Self> {
        let rules: SmallVec<[Box<Rule>; 8]> = rules.into_iter().map(Box::new).collect();
        if count == 0 || count > rules.len() {
            return Err(RuleError::InvalidCount {
                count,
                available: rules.len(),
            });
        }
        Ok(Self {
            count,
            rules,
        })
    }

    /// Required number of passing children.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false; a count rule has at least one child.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates children in order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Scans children in order with early exit on success and on impossibility.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `eval`.
    pub(crate) fn evaluate_with<F>(&self, mut eval: F) -> RuleResult<bool>
    where
        F: FnMut(&Rule) -> RuleResult<bool>,
    {
        let mut satisfied = 0usize;
        let mut remaining = self.rules.len();
        for rule in &self.rules {
            remaining -= 1;
            if eval(rule)? {
                satisfied += 1;
                if satisfied >= self.count {
                    return Ok(true);
                }
            }
            if satisfied + remaining < self.count {
                return Ok(false);
            }
        }
        Ok(false)
    }
}
