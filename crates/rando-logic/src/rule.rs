// crates/rando-logic/src/rule.rs
// ============================================================================
// Module: Rule Core Types
// Description: The closed set of access-rule variants and their dispatch.
// Purpose: Define `Rule`, its constructors, evaluation, operators, and display.
// Dependencies: crate::{combinator, error, interfaces, leaf, option, registry, trace}
// ============================================================================

//! ## Overview
//! [`Rule`] is an immutable boolean predicate over `(state, context)`. Trees
//! are built once per generation from leaves and combinators, attached to the
//! host world graph, and evaluated many times. `&` and `|` return new rules and
//! fold the `True`/`False` literals as they go. Evaluation short-circuits in
//! `And`, `Or`, and `Count`; option rules resolve their branch through the
//! context on every call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;
use std::ops::BitAnd;
use std::ops::BitOr;

use crate::combinator::Count;
use crate::combinator::Junction;
use crate::combinator::RuleSet;
use crate::error::RuleResult;
use crate::interfaces::ItemCatalog;
use crate::interfaces::LogicContext;
use crate::interfaces::LogicState;
use crate::interfaces::PlayerId;
use crate::interfaces::SpotKind;
use crate::leaf::HasProgressionPercent;
use crate::leaf::Reach;
use crate::leaf::Received;
use crate::leaf::TotalReceived;
use crate::option::OptionRule;
use crate::registry::Has;
use crate::trace::NoopTrace;
use crate::trace::RuleTrace;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Difficulty reported by rules that can never be satisfied.
pub const IMPOSSIBLE_DIFFICULTY: u32 = 999_999_999;

/// Difficulty reported by reachability leaves.
pub const REACH_DIFFICULTY: u32 = 1;

// ============================================================================
// SECTION: Rule Definition
// ============================================================================

/// Access rule tree.
///
/// # Invariants
/// - Values are immutable once built; combinators return new rules.
/// - `And`/`Or` children are flat, merged, deduplicated, and non-empty.
/// - Equality is structural; `And`/`Or` compare as sets and `Has` compares by
///   name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Always satisfied. Identity of `And`, absorber of `Or`.
    True,
    /// Never satisfied. Identity of `Or`, absorber of `And`.
    False,
    /// Player holds at least `count` copies of one item.
    Received(Received),
    /// Player holds at least `count` copies summed across an item set.
    TotalReceived(TotalReceived),
    /// Player collected a share of their world's progression items.
    HasProgressionPercent(HasProgressionPercent),
    /// A region, location, or entrance is reachable.
    Reach(Reach),
    /// Every child holds.
    And(RuleSet),
    /// At least one child holds.
    Or(RuleSet),
    /// At least `k` children hold.
    Count(Count),
    /// Branch chosen from the player's options at evaluation time.
    Option(Box<OptionRule>),
    /// Named reference into a [`crate::RuleRegistry`].
    Has(Has),
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Rule {
    /// Builds an `And` over `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::EmptyCombinator`] when `rules` is empty.
    pub fn and(rules: impl IntoIterator<Item = Self>) -> RuleResult<Self> {
        Junction::All.build(rules)
    }

    /// Builds an `Or` over `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::EmptyCombinator`] when `rules` is empty.
    pub fn or(rules: impl IntoIterator<Item = Self>) -> RuleResult<Self> {
        Junction::Any.build(rules)
    }

    /// Builds a `Count` requiring `count` of `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::InvalidCount`] unless `1 <= count <= len`.
    pub fn count(count: usize, rules: impl IntoIterator<Item = Self>) -> RuleResult<Self> {
        Count::new(count, rules).map(Self::Count)
    }

    /// Builds a `Received` leaf.
    ///
    /// # Errors
    ///
    /// Returns an error when `item` is not a progression item or `count` is zero.
    pub fn received<I>(catalog: &I, item: &str, player: PlayerId, count: u32) -> RuleResult<Self>
    where
        I: ItemCatalog + ?Sized,
    {
        Received::new(catalog, item, player, count).map(Self::Received)
    }

    /// Builds a `TotalReceived` leaf.
    ///
    /// # Errors
    ///
    /// Returns an error when the item set is empty, contains a
    /// non-progression item, or `count` is zero.
    pub fn total_received<I, S>(
        catalog: &I,
        count: u32,
        items: impl IntoIterator<Item = S>,
        player: PlayerId,
    ) -> RuleResult<Self>
    where
        I: ItemCatalog + ?Sized,
        S: AsRef<str>,
    {
        TotalReceived::new(catalog, count, items, player).map(Self::TotalReceived)
    }

    /// Builds a `HasProgressionPercent` leaf.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::InvalidPercent`] outside `(0, 100]`.
    pub fn has_progression_percent(player: PlayerId, percent: u32) -> RuleResult<Self> {
        HasProgressionPercent::new(player, percent).map(Self::HasProgressionPercent)
    }

    /// Builds a `Reach` leaf.
    #[must_use]
    pub fn reach(spot: &str, kind: SpotKind, player: PlayerId) -> Self {
        Self::Reach(Reach::new(spot, kind, player))
    }

    /// Wraps an option-dependent rule.
    #[must_use]
    pub fn option(rule: OptionRule) -> Self {
        Self::Option(Box::new(rule))
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl Rule {
    /// Evaluates the rule against a host state and player context.
    ///
    /// # Errors
    ///
    /// Returns an error when an option cannot be resolved, a `Has` target is
    /// undefined, or the host fails a reachability query.
    pub fn evaluate<S, C>(&self, state: &S, ctx: &C) -> RuleResult<bool>
    where
        S: LogicState + ?Sized,
        C: LogicContext + ?Sized,
    {
        self.evaluate_with_trace(state, ctx, &mut NoopTrace)
    }

    /// Evaluates the rule and reports every leaf result to `trace`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Rule::evaluate`].
    pub fn evaluate_with_trace<S, C, T>(&self, state: &S, ctx: &C, trace: &mut T) -> RuleResult<bool>
    where
        S: LogicState + ?Sized,
        C: LogicContext + ?Sized,
        T: RuleTrace + ?Sized,
    {
        match self {
            Self::True => Ok(true),
            Self::False => Ok(false),
            Self::Received(leaf) => Ok(traced(trace, self, leaf.evaluate(state))),
            Self::TotalReceived(leaf) => Ok(traced(trace, self, leaf.evaluate(state))),
            Self::HasProgressionPercent(leaf) => Ok(traced(trace, self, leaf.evaluate(state))),
            Self::Reach(leaf) => {
                let result = leaf.evaluate(state)?;
                Ok(traced(trace, self, result))
            }

            // Short-circuit on first failure
            Self::And(rules) => {
                for rule in rules.iter() {
                    if !rule.evaluate_with_trace(state, ctx, trace)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            // Short-circuit on first success
            Self::Or(rules) => {
                for rule in rules.iter() {
                    if rule.evaluate_with_trace(state, ctx, trace)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            Self::Count(count) => {
                count.evaluate_with(|rule| rule.evaluate_with_trace(state, ctx, trace))
            }
            Self::Option(option) => {
                let chosen = option.choose_rule(ctx)?;
                trace.on_option_resolved(self, &chosen);
                chosen.evaluate_with_trace(state, ctx, trace)
            }
            Self::Has(has) => has.with_target(|target| target.evaluate_with_trace(state, ctx, trace)),
        }
    }
}

/// Reports a leaf result and hands it back.
fn traced<T: RuleTrace + ?Sized>(trace: &mut T, rule: &Rule, result: bool) -> bool {
    trace.on_leaf_evaluated(rule, result);
    result
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

impl Rule {
    /// Follows option rules until a concrete rule is reached.
    ///
    /// Nested option rules resolve repeatedly; anything else is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the context's error when an option cannot be read, or a choice
    /// error from a complex chooser.
    pub fn resolve<C: LogicContext + ?Sized>(&self, ctx: &C) -> RuleResult<Cow<'_, Self>> {
        let mut current = Cow::Borrowed(self);
        loop {
            let next = match &current {
                Cow::Borrowed(rule) => match *rule {
                    Self::Option(option) => option.choose_rule(ctx)?,
                    _ => break,
                },
                Cow::Owned(Self::Option(option)) => {
                    Cow::Owned(option.choose_rule(ctx)?.into_owned())
                }
                Cow::Owned(_) => break,
            };
            current = next;
        }
        Ok(current)
    }

    /// Resolves every option rule in the tree for one player's context.
    ///
    /// Combinators are rebuilt so newly exposed children flatten and merge.
    /// `Has` references stay indirect.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and rebuild errors from the combinators.
    pub fn specialize<C: LogicContext + ?Sized>(&self, ctx: &C) -> RuleResult<Self> {
        match self {
            Self::And(rules) => {
                Self::and(rules.iter().map(|rule| rule.specialize(ctx)).collect::<RuleResult<Vec<_>>>()?)
            }
            Self::Or(rules) => {
                Self::or(rules.iter().map(|rule| rule.specialize(ctx)).collect::<RuleResult<Vec<_>>>()?)
            }
            Self::Count(count) => Self::count(
                count.count(),
                count.iter().map(|rule| rule.specialize(ctx)).collect::<RuleResult<Vec<_>>>()?,
            ),
            Self::Option(_) => self.resolve(ctx)?.specialize(ctx),
            _ => Ok(self.clone()),
        }
    }

    /// Immediate children of a combinator; empty for everything else.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::And(rules) | Self::Or(rules) => rules.iter().collect(),
            Self::Count(count) => count.iter().collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Operators
// ============================================================================

impl BitAnd for Rule {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Junction::All.join(self, rhs)
    }
}

impl BitOr for Rule {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Junction::Any.join(self, rhs)
    }
}

// ============================================================================
// SECTION: Display
// ============================================================================

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Received(leaf) if leaf.count() == 1 => write!(f, "Received {}", leaf.item()),
            Self::Received(leaf) => write!(f, "Received {} {}", leaf.count(), leaf.item()),
            Self::TotalReceived(leaf) => {
                write!(f, "Received {} items from [", leaf.count())?;
                for (index, item) in leaf.items().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(item)?;
                }
                f.write_str("]")
            }
            Self::HasProgressionPercent(leaf) => {
                write!(f, "Received {}% progression items", leaf.percent())
            }
            Self::Reach(leaf) => write!(f, "Reach {} {}", leaf.kind(), leaf.spot()),
            Self::And(rules) => write_joined(f, rules.iter(), " & "),
            Self::Or(rules) => write_joined(f, rules.iter(), " | "),
            Self::Count(count) => {
                write!(f, "Count {} of [", count.count())?;
                for (index, rule) in count.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{rule}")?;
                }
                f.write_str("]")
            }
            Self::Option(option) => write!(f, "{option}"),
            Self::Has(has) => write!(f, "{has}"),
        }
    }
}

/// Writes `(a <sep> b <sep> c)`.
fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    rules: impl Iterator<Item = &'a Rule>,
    separator: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (index, rule) in rules.enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{rule}")?;
    }
    f.write_str(")")
}
