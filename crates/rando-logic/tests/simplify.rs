// crates/rando-logic/tests/simplify.rs
// ============================================================================
// Module: Simplification Tests
// Description: Tests for literal folding with and without a game state.
// Purpose: Ensure simplified rules stay equivalent to their inputs.
// ============================================================================
//! ## Overview
//! Integration tests for [`rando_logic::Rule::simplify`] and
//! [`rando_logic::Rule::evaluate_while_simplifying`].

#[path = "support/mocks.rs"]
mod mocks;
mod support;

use mocks::MemoryContext;
use mocks::MemoryState;
use mocks::PLAYER;
use mocks::catalog;
use rando_logic::OptionRule;
use rando_logic::Rule;
use rando_logic::RuleRegistry;
use support::TestResult;
use support::ensure;
use support::ensure_eq;

/// One copy of `item` for the default player.
fn received(item: &str) -> TestResult<Rule> {
    Ok(Rule::received(&catalog(), item, PLAYER, 1)?)
}

// ============================================================================
// SECTION: Stateless Simplification
// ============================================================================

#[test]
fn test_literals_fold_through_junctions() -> TestResult {
    let a = received("A")?;
    let rule = Rule::and([a.clone(), Rule::or([Rule::True, received("B")?])?])?;
    ensure_eq(&rule.simplify(), &a, "Or with True drops out of the And")?;

    let rule = Rule::or([a.clone(), Rule::and([Rule::False, received("B")?])?])?;
    ensure_eq(&rule.simplify(), &a, "And with False drops out of the Or")?;

    ensure_eq(&Rule::and([Rule::True])?.simplify(), &Rule::True, "only identities left")?;
    ensure_eq(&Rule::or([Rule::True, a])?.simplify(), &Rule::True, "absorber wins")
}

#[test]
fn test_count_folds_literals() -> TestResult {
    let (a, b) = (received("A")?, received("B")?);
    ensure_eq(
        &Rule::count(2, [Rule::True, a.clone(), b.clone()])?.simplify(),
        &Rule::or([a.clone(), b.clone()])?,
        "True lowers the threshold to one",
    )?;
    ensure_eq(
        &Rule::count(2, [Rule::False, a.clone(), b.clone()])?.simplify(),
        &Rule::and([a.clone(), b.clone()])?,
        "threshold equals remaining children",
    )?;
    ensure_eq(&Rule::count(3, [Rule::False, a.clone(), b.clone()])?.simplify(), &Rule::False, "unreachable")?;
    ensure_eq(&Rule::count(2, [Rule::True, Rule::True, a])?.simplify(), &Rule::True, "met by literals")?;

    let untouched = Rule::count(2, [received("A")?, b, received("C")?])?;
    ensure_eq(&untouched.simplify(), &untouched, "nothing to fold")
}

#[test]
fn test_simplify_keeps_indirect_rules() -> TestResult {
    let mut registry = RuleRegistry::new();
    let option = Rule::option(OptionRule::simple("goal", 1_i64, Rule::True, Rule::False));
    let rule = Rule::and([option, registry.has("later")])?;
    ensure_eq(&rule.simplify(), &rule, "options and references are left alone")
}

// ============================================================================
// SECTION: Evaluate While Simplifying
// ============================================================================

#[test]
fn test_option_branch_is_folded_in() -> TestResult {
    let a = received("A")?;
    let option = Rule::option(OptionRule::simple("goal", 1_i64, received("B")?, Rule::True));
    let rule = Rule::and([a.clone(), option])?;
    let ctx = MemoryContext::new().with_option("goal", 2_i64);

    let (simplified, result) = rule.evaluate_while_simplifying(&MemoryState::new().with("A"), &ctx)?;
    ensure(result, "A held and the option is free")?;
    ensure_eq(&simplified, &a, "True branch dropped")
}

#[test]
fn test_false_branch_absorbs_junction() -> TestResult {
    let option = Rule::option(OptionRule::simple("goal", 1_i64, Rule::False, Rule::True));
    let rule = Rule::and([received("A")?, option])?;
    let ctx = MemoryContext::new().with_option("goal", 1_i64);

    let (simplified, result) = rule.evaluate_while_simplifying(&MemoryState::new().with("A"), &ctx)?;
    ensure(!result, "False branch chosen")?;
    ensure_eq(&simplified, &Rule::False, "absorbed")
}

#[test]
fn test_short_circuit_carries_remaining_children() -> TestResult {
    let option = Rule::option(OptionRule::simple("goal", 1_i64, Rule::False, Rule::True));
    let rule = Rule::and([received("A")?, option])?;
    let ctx = MemoryContext::new().with_option("goal", 1_i64);

    let (simplified, result) = rule.evaluate_while_simplifying(&MemoryState::new(), &ctx)?;
    ensure(!result, "A missing")?;
    ensure_eq(&simplified, &rule, "unevaluated option kept")
}

#[test]
fn test_has_target_is_inlined() -> TestResult {
    let mut registry = RuleRegistry::new();
    let rule = Rule::or([received("A")?, registry.has("pair")])?;
    let pair = Rule::and([received("B")?, received("C")?])?;
    registry.define("pair", pair.clone())?;

    let state = MemoryState::new().with("B").with("C");
    let (simplified, result) = rule.evaluate_while_simplifying(&state, &MemoryContext::new())?;
    ensure(result, "pair held")?;
    ensure_eq(&simplified, &Rule::or([received("A")?, pair])?, "reference replaced by target")
}

#[test]
fn test_count_folds_resolved_literals() -> TestResult {
    let option = Rule::option(OptionRule::simple("goal", 1_i64, Rule::True, Rule::False));
    let rule = Rule::count(2, [option, received("A")?, received("B")?])?;
    let ctx = MemoryContext::new().with_option("goal", 1_i64);

    let (simplified, result) = rule.evaluate_while_simplifying(&MemoryState::new().with("A"), &ctx)?;
    ensure(result, "option plus A meets two")?;
    ensure_eq(&simplified, &Rule::or([received("A")?, received("B")?])?, "threshold lowered by True")
}

#[test]
fn test_results_match_plain_evaluation() -> TestResult {
    let rule = Rule::and([
        Rule::or([received("A")?, received("B")?])?,
        Rule::count(2, [received("C")?, received("D")?, received("Key")?])?,
    ])?;
    let ctx = MemoryContext::new();
    let states = [
        MemoryState::new(),
        MemoryState::new().with("A").with("C").with("D"),
        MemoryState::new().with("B").with("Key"),
        MemoryState::new().with("B").with("Key").with("C"),
    ];
    for state in &states {
        let (simplified, result) = rule.evaluate_while_simplifying(state, &ctx)?;
        ensure_eq(&result, &rule.evaluate(state, &ctx)?, "same result as evaluate")?;
        ensure_eq(&simplified.evaluate(state, &ctx)?, &result, "simplified rule agrees")?;
    }
    Ok(())
}
