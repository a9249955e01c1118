// crates/rando-logic/src/interfaces.rs
// ============================================================================
// Module: Host Interfaces
// Description: State, context, and item catalog contracts for rule evaluation.
// Purpose: Define the in-process boundary between the rule algebra and a host.
// Dependencies: crate::{error, rule}, serde
// ============================================================================

//! ## Overview
//! Rules never own game data. Evaluation reads a host-owned [`LogicState`]
//! (collected items, reachability, progression counters) and a read-only
//! [`LogicContext`] (the player's resolved options). Construction of item
//! gating leaves consults an [`ItemCatalog`] so that only progression items
//! can gate logic. Implementations must be deterministic for a given state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::rule::Rule;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Player slot number within a multiworld generation.
pub type PlayerId = u32;

/// How the host should resolve a reachability target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotKind {
    /// A region node of the world graph.
    Region,
    /// A location inside a region.
    Location,
    /// An entrance edge between regions.
    Entrance,
}

impl SpotKind {
    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Location => "location",
            Self::Entrance => "entrance",
        }
    }
}

impl fmt::Display for SpotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => f.write_str("Region"),
            Self::Location => f.write_str("Location"),
            Self::Entrance => f.write_str("Entrance"),
        }
    }
}

// ============================================================================
// SECTION: Option Values
// ============================================================================

/// Resolved value of a player option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionValue {
    /// Numeric or choice option.
    Int(i64),
    /// Free text option.
    Text(String),
    /// Multi-select option.
    Set(BTreeSet<String>),
}

impl OptionValue {
    /// Returns the shape name used in type errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Set(_) => "set",
        }
    }

    /// Returns the integer payload when this is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Tests whether this option value satisfies `expected`.
    ///
    /// A set option matches a text value it contains; everything else
    /// compares by equality.
    #[must_use]
    pub fn matches(&self, expected: &Self) -> bool {
        match (self, expected) {
            (Self::Set(values), Self::Text(value)) => values.contains(value),
            _ => self == expected,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "\"{value}\""),
            Self::Set(values) => {
                f.write_str("{")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{value}\"")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ============================================================================
// SECTION: Item Catalog
// ============================================================================

/// Item classification as declared by a game's item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClassification {
    /// Required to reach locations.
    Progression,
    /// Progression, but excluded from progression balancing.
    ProgressionSkipBalancing,
    /// Helpful but never required.
    Useful,
    /// Padding.
    Filler,
    /// Harmful item.
    Trap,
}

impl ItemClassification {
    /// Returns true when the item may gate logic.
    #[must_use]
    pub const fn is_progression(self) -> bool {
        matches!(self, Self::Progression | Self::ProgressionSkipBalancing)
    }
}

/// Item table lookup consulted when building item-gating rules.
pub trait ItemCatalog {
    /// Returns the classification of `item`, or `None` when unknown.
    fn classification(&self, item: &str) -> Option<ItemClassification>;

    /// Ensures `item` is a known progression item.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownItem`] or [`RuleError::NotProgression`].
    fn require_progression(&self, item: &str) -> RuleResult {
        match self.classification(item) {
            None => Err(RuleError::UnknownItem {
                item: item.to_string(),
            }),
            Some(class) if class.is_progression() => Ok(()),
            Some(_) => Err(RuleError::NotProgression {
                item: item.to_string(),
            }),
        }
    }
}

impl<S: BuildHasher> ItemCatalog for HashMap<String, ItemClassification, S> {
    fn classification(&self, item: &str) -> Option<ItemClassification> {
        self.get(item).copied()
    }
}

impl ItemCatalog for BTreeMap<String, ItemClassification> {
    fn classification(&self, item: &str) -> Option<ItemClassification> {
        self.get(item).copied()
    }
}

// ============================================================================
// SECTION: Evaluation Context
// ============================================================================

/// Read-only accessor for one player's resolved options.
pub trait LogicContext {
    /// Player whose options this context describes.
    fn player(&self) -> PlayerId;

    /// Returns the resolved value of `option`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownOption`] when the option does not exist.
    fn option_value(&self, option: &str) -> RuleResult<OptionValue>;

    /// Returns the resolved values of several options, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`LogicContext::option_value`].
    fn option_values(&self, options: &[&str]) -> RuleResult<Vec<OptionValue>> {
        options.iter().map(|option| self.option_value(option)).collect()
    }
}

// ============================================================================
// SECTION: Game State
// ============================================================================

/// Host graph facts used to explain `Reach` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotDetails {
    /// Access rule attached to the spot (locations and entrances).
    pub access_rule: Option<Rule>,
    /// Region containing the spot (locations) or the entrance source region.
    pub parent_region: Option<String>,
    /// Entrances leading into the spot (regions).
    pub entrances: Vec<String>,
}

/// Host-owned mutable game state, read-only from the algebra's side.
pub trait LogicState {
    /// Number of copies of `item` the player has collected.
    fn count(&self, item: &str, player: PlayerId) -> u32;

    /// Returns true when the player holds at least `count` copies of `item`.
    fn has(&self, item: &str, player: PlayerId, count: u32) -> bool {
        self.count(item, player) >= count
    }

    /// Host graph reachability query.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownSpot`] or [`RuleError::Host`] when the host
    /// cannot answer.
    fn can_reach(&self, spot: &str, kind: SpotKind, player: PlayerId) -> RuleResult<bool>;

    /// Progression items collected by the player, excluding items the world
    /// does not count toward progression percentages.
    fn progression_collected(&self, player: PlayerId) -> u32;

    /// Total progression items in the player's world.
    fn progression_total(&self, player: PlayerId) -> u32;

    /// Graph facts for explanations; hosts without introspection return `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownSpot`] when the spot does not exist.
    fn spot_details(
        &self,
        _spot: &str,
        _kind: SpotKind,
        _player: PlayerId,
    ) -> RuleResult<Option<SpotDetails>> {
        Ok(None)
    }
}
