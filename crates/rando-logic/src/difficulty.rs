// crates/rando-logic/src/difficulty.rs
// ============================================================================
// Module: Difficulty Scoring
// Description: Heuristic cost of satisfying a rule.
// Purpose: Bias solver search order toward cheaper requirements.
// Dependencies: crate::{error, interfaces, rule}
// ============================================================================

//! ## Overview
//! Difficulty never affects correctness. `And` takes its hardest child, `Or`
//! its easiest, and `Count(k)` the hardest member of its `k` cheapest children.
//! Item leaves cost their required count, progression percentages cost the
//! percentage, and reachability costs [`REACH_DIFFICULTY`].

use crate::error::RuleResult;
use crate::interfaces::LogicContext;
use crate::rule::IMPOSSIBLE_DIFFICULTY;
use crate::rule::REACH_DIFFICULTY;
use crate::rule::Rule;

impl Rule {
    /// Heuristic cost of satisfying this rule for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns resolution errors from option rules and `Has` references.
    pub fn difficulty<C: LogicContext + ?Sized>(&self, ctx: &C) -> RuleResult<u32> {
        match self {
            Self::True => Ok(0),
            Self::False => Ok(IMPOSSIBLE_DIFFICULTY),
            Self::Received(leaf) => Ok(leaf.count()),
            Self::TotalReceived(leaf) => Ok(leaf.count()),
            Self::HasProgressionPercent(leaf) => Ok(leaf.percent()),
            Self::Reach(_) => Ok(REACH_DIFFICULTY),
            Self::And(rules) => {
                let mut hardest = 0;
                for rule in rules.iter() {
                    hardest = hardest.max(rule.difficulty(ctx)?);
                }
                Ok(hardest)
            }
            Self::Or(rules) => {
                let mut easiest = IMPOSSIBLE_DIFFICULTY;
                for rule in rules.iter() {
                    easiest = easiest.min(rule.difficulty(ctx)?);
                }
                Ok(easiest)
            }
            Self::Count(count) => {
                let mut costs = count.iter().map(|rule| rule.difficulty(ctx)).collect::<RuleResult<Vec<_>>>()?;
                costs.sort_unstable();
                Ok(costs.get(count.count().saturating_sub(1)).copied().unwrap_or(IMPOSSIBLE_DIFFICULTY))
            }
            Self::Option(option) => option.choose_rule(ctx)?.difficulty(ctx),
            Self::Has(has) => has.with_target(|target| target.difficulty(ctx)),
        }
    }
}
