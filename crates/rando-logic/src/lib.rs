// crates/rando-logic/src/lib.rs
// ============================================================================
// Module: Rando Logic Root
// Description: Public API surface for the access-rule algebra.
// Purpose: Wire together rule types, evaluation tooling, and spec loading.
// Dependencies: crate::{combinator, difficulty, error, explain, factory, interfaces, leaf,
//              option, registry, rule, simplify, spec, spec_io, trace}
// ============================================================================

//! ## Overview
//! Access rules gate locations and entrances of a randomizer world graph.
//! Content code builds [`Rule`] trees from leaves and combinators (directly,
//! through a [`LogicFactory`], or from serialized [`RuleSpec`] tables), a host
//! attaches them to its graph, and the solver evaluates them against a
//! [`LogicState`] and [`LogicContext`] many times per generation.
//!
//! Beyond evaluation the crate provides structural simplification,
//! difficulty scoring, option-dependent rules, a forward-reference
//! [`RuleRegistry`], and recursive [`Explanation`]s of why a rule failed.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod combinator;
pub mod difficulty;
pub mod error;
pub mod explain;
pub mod factory;
pub mod interfaces;
pub mod leaf;
pub mod option;
pub mod registry;
pub mod rule;
pub mod simplify;
pub mod spec;
pub mod spec_io;
pub mod trace;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use combinator::Count;
pub use combinator::Junction;
pub use combinator::RuleSet;
pub use error::RuleError;
pub use error::RuleResult;
pub use explain::ExplainOptions;
pub use explain::Explanation;
pub use explain::ExplanationReport;
pub use factory::CountBuilder;
pub use factory::JunctionBuilder;
pub use factory::LogicFactory;
pub use interfaces::ItemCatalog;
pub use interfaces::ItemClassification;
pub use interfaces::LogicContext;
pub use interfaces::LogicState;
pub use interfaces::OptionValue;
pub use interfaces::PlayerId;
pub use interfaces::SpotDetails;
pub use interfaces::SpotKind;
pub use leaf::HasProgressionPercent;
pub use leaf::Name;
pub use leaf::Reach;
pub use leaf::Received;
pub use leaf::TotalReceived;
pub use option::ChoiceOutcome;
pub use option::Chooser;
pub use option::OptionRule;
pub use registry::Has;
pub use registry::RuleRegistry;
pub use rule::IMPOSSIBLE_DIFFICULTY;
pub use rule::REACH_DIFFICULTY;
pub use rule::Rule;
pub use spec::RuleSpec;
pub use spec::RuleTable;
pub use spec::SpecLimits;
pub use spec::SpecValidator;
pub use spec_io::load_table_from_file;
pub use trace::EvaluationLog;
pub use trace::NoopTrace;
pub use trace::RuleTrace;
pub use trace::TraceEvent;

// ============================================================================
// SECTION: Convenience Facades
// ============================================================================

/// Convenience functions for composing rules without builders
pub mod convenience {
    use super::Rule;
    use super::RuleResult;

    /// Creates a rule requiring all of the given rules
    ///
    /// # Errors
    ///
    /// Returns [`super::RuleError::EmptyCombinator`] when `rules` is empty.
    pub fn all(rules: Vec<Rule>) -> RuleResult<Rule> {
        Rule::and(rules)
    }

    /// Creates a rule requiring any of the given rules
    ///
    /// # Errors
    ///
    /// Returns [`super::RuleError::EmptyCombinator`] when `rules` is empty.
    pub fn any(rules: Vec<Rule>) -> RuleResult<Rule> {
        Rule::or(rules)
    }

    /// Creates a rule requiring at least `count` of the given rules
    ///
    /// # Errors
    ///
    /// Returns [`super::RuleError::InvalidCount`] unless `1 <= count <= len`.
    pub fn at_least(count: usize, rules: Vec<Rule>) -> RuleResult<Rule> {
        Rule::count(count, rules)
    }
}
