// crates/rando-logic/src/trace.rs
// ============================================================================
// Module: Evaluation Trace Hooks
// Description: Observer hooks for leaf evaluation and option resolution.
// Purpose: Let hosts observe evaluation without pulling a logging stack into the core.
// Dependencies: crate::rule
// ============================================================================

//! ## Overview
//! [`Rule::evaluate_with_trace`] reports each leaf result and each option
//! resolution to a [`RuleTrace`]. [`NoopTrace`] is the zero-cost default used
//! by [`Rule::evaluate`]; [`EvaluationLog`] records events for debugging and
//! tests.

use crate::rule::Rule;

// ============================================================================
// SECTION: Trace Hook
// ============================================================================

/// Observer for rule evaluation.
pub trait RuleTrace {
    /// Called after a state-query leaf is evaluated.
    fn on_leaf_evaluated(&mut self, rule: &Rule, result: bool);

    /// Called after an option rule picks its branch.
    fn on_option_resolved(&mut self, _rule: &Rule, _chosen: &Rule) {}
}

/// No-op trace hook for fast paths
///
/// # Invariants
/// - Zero-sized marker type; carries no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl RuleTrace for NoopTrace {
    fn on_leaf_evaluated(&mut self, _rule: &Rule, _result: bool) {}
}

// ============================================================================
// SECTION: Recording Trace
// ============================================================================

/// One recorded evaluation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A leaf produced `result`.
    Leaf {
        /// Rendered leaf.
        rule: String,
        /// Leaf result.
        result: bool,
    },
    /// An option rule resolved to `chosen`.
    Option {
        /// Rendered option rule.
        rule: String,
        /// Rendered branch.
        chosen: String,
    },
}

/// Trace hook that records every event in order.
#[derive(Debug, Default, Clone)]
pub struct EvaluationLog {
    /// Events in evaluation order.
    events: Vec<TraceEvent>,
}

impl EvaluationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in evaluation order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of leaves evaluated.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, TraceEvent::Leaf { .. })).count()
    }
}

impl RuleTrace for EvaluationLog {
    fn on_leaf_evaluated(&mut self, rule: &Rule, result: bool) {
        self.events.push(TraceEvent::Leaf {
            rule: rule.to_string(),
            result,
        });
    }

    fn on_option_resolved(&mut self, rule: &Rule, chosen: &Rule) {
        self.events.push(TraceEvent::Option {
            rule: rule.to_string(),
            chosen: chosen.to_string(),
        });
    }
}
