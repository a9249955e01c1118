// crates/rando-logic/src/error.rs
// ============================================================================
// Module: Rule Error Definitions
// Description: Structured diagnostics for rule construction and evaluation.
// Purpose: Give content code and hosts one error type to propagate with `?`.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure the rule algebra can report lives here. Construction-time
//! invariant violations (empty combinators, non-progression items, bad
//! percentages, uncovered option branches) are returned from constructors so
//! that generation fails the moment a malformed rule is built. Lookup failures
//! (undefined registry names, unknown options, host reachability errors) are
//! returned from evaluation. There is no silent fallback path.

use thiserror::Error;

use crate::interfaces::PlayerId;

// ============================================================================
// SECTION: Rule Error
// ============================================================================

/// Errors raised while building or evaluating rules.
///
/// # Invariants
/// - Variants are cheap to clone so explanation nodes can cache them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------
    /// An `And`/`Or` combinator was built from zero rules.
    #[error("{kind} combinator requires at least one rule")]
    EmptyCombinator {
        /// Combinator name (`And` or `Or`).
        kind: &'static str,
    },

    /// A count threshold is outside its valid range.
    #[error("invalid count {count}: expected a value in 1..={available}")]
    InvalidCount {
        /// Requested threshold.
        count: usize,
        /// Largest threshold that can be satisfied.
        available: usize,
    },

    /// An item-gating rule asked for zero copies.
    #[error("{kind} count must be at least 1")]
    ZeroCount {
        /// Rule kind (`Received` or `TotalReceived`).
        kind: &'static str,
    },

    /// A `TotalReceived` rule was built over an empty item set.
    #[error("TotalReceived requires at least one item")]
    EmptyItemSet,

    /// A progression percentage is outside `(0, 100]`.
    #[error("progression percent {percent} must be in (0, 100]")]
    InvalidPercent {
        /// Requested percentage.
        percent: u32,
    },

    /// The item catalog has no entry for the item.
    #[error("item '{item}' is not in the item catalog")]
    UnknownItem {
        /// Item name.
        item: String,
    },

    /// A non-progression item was used in an item-gating rule.
    #[error("item '{item}' is not a progression item and cannot gate logic")]
    NotProgression {
        /// Item name.
        item: String,
    },

    /// A `Choose` rule left an option value uncovered without a default.
    #[error("option '{option}' value {value} has no branch and no default was given")]
    UncoveredChoice {
        /// Option name.
        option: String,
        /// Rendered option value.
        value: String,
    },

    /// A registry name was defined twice.
    #[error("rule '{name}' is already defined in the registry")]
    AlreadyDefined {
        /// Registry name.
        name: String,
    },

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------
    /// A complex option chooser returned a branch key it did not declare.
    #[error("option rule '{label}' chose unknown branch '{branch}'")]
    UnknownBranch {
        /// Label of the complex option rule.
        label: String,
        /// Returned branch key.
        branch: String,
    },

    /// The context does not know the option.
    #[error("unknown option '{option}' for player {player}")]
    UnknownOption {
        /// Option name.
        option: String,
        /// Player whose options were queried.
        player: PlayerId,
    },

    /// An option value had the wrong shape for the rule querying it.
    #[error("option '{option}' has type {found}, expected {expected}")]
    OptionType {
        /// Option name.
        option: String,
        /// Expected value shape.
        expected: &'static str,
        /// Actual value shape.
        found: &'static str,
    },

    /// A `Has` rule was evaluated before its registry entry was defined.
    #[error("rule '{name}' is referenced but was never defined")]
    UndefinedRule {
        /// Registry name.
        name: String,
    },

    /// A `Has` rule outlived the registry it points into.
    #[error("rule '{name}' points into a registry that has been dropped")]
    RegistryDropped {
        /// Registry name.
        name: String,
    },

    // ------------------------------------------------------------------------
    // Host
    // ------------------------------------------------------------------------
    /// The host graph has no spot with the given name.
    #[error("unknown {kind} '{spot}'")]
    UnknownSpot {
        /// Spot kind label.
        kind: &'static str,
        /// Spot name.
        spot: String,
    },

    /// The host reported a failure while answering a state query.
    #[error("host error: {0}")]
    Host(String),

    // ------------------------------------------------------------------------
    // Serialized specs
    // ------------------------------------------------------------------------
    /// A serialized rule spec failed to parse or validate.
    #[error("invalid rule spec: {0}")]
    Spec(String),
}

impl RuleError {
    /// Creates a host error with a custom message
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Creates a spec error with a custom message
    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec(message.into())
    }
}

// ============================================================================
// SECTION: Result Alias
// ============================================================================

/// Convenient Result type for rule operations
pub type RuleResult<T = ()> = Result<T, RuleError>;
