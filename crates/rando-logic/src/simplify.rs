// crates/rando-logic/src/simplify.rs
// ============================================================================
// Module: Rule Simplification
// Description: Literal folding, with and without a game state.
// Purpose: Shrink rule trees once at setup and opportunistically while solving.
// Dependencies: crate::{combinator, error, interfaces, rule}
// ============================================================================

//! ## Overview
//! [`Rule::simplify`] folds `True`/`False` literals through `And`, `Or`, and
//! `Count` and collapses single-child combinators. It needs no state and does
//! not resolve options or registry references.
//!
//! [`Rule::evaluate_while_simplifying`] evaluates against a state and returns
//! the boolean together with a rule equivalent to the input for the same
//! context. Children after a short-circuit are carried over untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::combinator::Count;
use crate::combinator::Junction;
use crate::combinator::RuleSet;
use crate::error::RuleResult;
use crate::interfaces::LogicContext;
use crate::interfaces::LogicState;
use crate::rule::Rule;

// ============================================================================
// SECTION: Stateless Simplification
// ============================================================================

impl Rule {
    /// Structurally simplified copy of this rule.
    ///
    /// - `And`/`Or` return their absorber when any child simplifies to it,
    ///   drop identity children, and collapse to the single remaining child or
    ///   to the identity when none remain.
    /// - `Count` drops `True` children (lowering the threshold) and `False`
    ///   children, then becomes `True`, `False`, `And`, or `Or` when the
    ///   threshold allows.
    #[must_use]
    pub fn simplify(&self) -> Self {
        match self {
            Self::And(rules) => fold_junction(Junction::All, rules.iter().map(Self::simplify)),
            Self::Or(rules) => fold_junction(Junction::Any, rules.iter().map(Self::simplify)),
            Self::Count(count) => fold_count(count.count(), count.iter().map(Self::simplify)),
            _ => self.clone(),
        }
    }
}

/// Folds literals out of an already simplified child list.
fn fold_junction(junction: Junction, rules: impl IntoIterator<Item = Rule>) -> Rule {
    let absorber = junction.absorber();
    let identity = junction.identity();
    let mut kept = Vec::new();
    for rule in rules {
        if rule == absorber {
            return absorber;
        }
        if rule != identity {
            kept.push(rule);
        }
    }
    junction.finish(kept)
}

/// Folds literals out of a threshold rule.
fn fold_count(count: usize, rules: impl IntoIterator<Item = Rule>) -> Rule {
    let mut needed = count;
    let mut kept = Vec::new();
    for rule in rules {
        match rule {
            Rule::True => needed = needed.saturating_sub(1),
            Rule::False => {}
            other => kept.push(other),
        }
    }
    if needed == 0 {
        return Rule::True;
    }
    if kept.len() < needed {
        return Rule::False;
    }
    if needed == kept.len() {
        return Junction::All.finish(kept);
    }
    if needed == 1 {
        return Junction::Any.finish(kept);
    }
    Count::new(needed, kept).map_or(Rule::False, Rule::Count)
}

// ============================================================================
// SECTION: Evaluate While Simplifying
// ============================================================================

impl Rule {
    /// Evaluates the rule and returns a simplified equivalent alongside.
    ///
    /// Option rules resolve to their chosen branch for `ctx` and `Has`
    /// references are replaced by their target, so the returned rule is only
    /// equivalent for the same context.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Rule::evaluate`].
    pub fn evaluate_while_simplifying<S, C>(&self, state: &S, ctx: &C) -> RuleResult<(Self, bool)>
    where
        S: LogicState + ?Sized,
        C: LogicContext + ?Sized,
    {
        match self {
            Self::And(rules) => simplify_junction(Junction::All, rules, state, ctx),
            Self::Or(rules) => simplify_junction(Junction::Any, rules, state, ctx),
            Self::Count(count) => simplify_count(count, state, ctx),
            Self::Option(option) => option.choose_rule(ctx)?.evaluate_while_simplifying(state, ctx),
            Self::Has(has) => has.with_target(|target| target.evaluate_while_simplifying(state, ctx)),
            _ => Ok((self.clone(), self.evaluate(state, ctx)?)),
        }
    }
}

/// Short-circuit evaluation of `And`/`Or` that rebuilds the child set.
fn simplify_junction<S, C>(
    junction: Junction,
    rules: &RuleSet,
    state: &S,
    ctx: &C,
) -> RuleResult<(Rule, bool)>
where
    S: LogicState + ?Sized,
    C: LogicContext + ?Sized,
{
    // And stops on the first false child, Or on the first true one.
    let stop_on = matches!(junction, Junction::Any);
    let children: Vec<&Rule> = rules.iter().collect();
    let mut simplified = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let (rule, result) = child.evaluate_while_simplifying(state, ctx)?;
        if rule == junction.absorber() {
            return Ok((junction.absorber(), stop_on));
        }
        simplified.push(rule);
        if result == stop_on {
            simplified.extend(children[index + 1..].iter().map(|rest| (*rest).clone()));
            return Ok((fold_junction(junction, simplified), stop_on));
        }
    }
    Ok((fold_junction(junction, simplified), !stop_on))
}

/// Threshold evaluation that rebuilds the child list.
fn simplify_count<S, C>(count: &Count, state: &S, ctx: &C) -> RuleResult<(Rule, bool)>
where
    S: LogicState + ?Sized,
    C: LogicContext + ?Sized,
{
    let children: Vec<&Rule> = count.iter().collect();
    let mut simplified = Vec::with_capacity(children.len());
    let mut satisfied = 0usize;
    for (index, child) in children.iter().enumerate() {
        let (rule, result) = child.evaluate_while_simplifying(state, ctx)?;
        simplified.push(rule);
        if result {
            satisfied += 1;
        }
        let remaining = children.len() - index - 1;
        if satisfied >= count.count() || satisfied + remaining < count.count() {
            simplified.extend(children[index + 1..].iter().map(|rest| (*rest).clone()));
            break;
        }
    }
    Ok((fold_count(count.count(), simplified), satisfied >= count.count()))
}
