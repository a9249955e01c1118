// crates/rando-logic-host/src/world.rs
// ============================================================================
// Module: Host World Graph
// Description: Host-side interface for reading and writing access rules.
// Purpose: Decouple the adapter from any concrete graph implementation.
// Dependencies: rando-logic, thiserror
// ============================================================================

//! ## Overview
//! [`WorldGraph`] is implemented by the host. Rules are stored on locations
//! and entrances; regions only take part through indirect conditions.

use rando_logic::PlayerId;
use rando_logic::Rule;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures reported by the host graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No location with this name exists.
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
    /// No entrance with this name exists.
    #[error("unknown entrance '{0}'")]
    UnknownEntrance(String),
    /// No region with this name exists for the player.
    #[error("unknown region '{region}' for player {player}")]
    UnknownRegion {
        /// Region name.
        region: String,
        /// Owning player.
        player: PlayerId,
    },
}

// ============================================================================
// SECTION: World Graph
// ============================================================================

/// Host world graph of one player.
pub trait WorldGraph {
    /// Rule currently attached to `location`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownLocation`] when the location does not exist.
    fn location_rule(&self, location: &str) -> Result<Option<Rule>, HostError>;

    /// Replaces the rule attached to `location`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownLocation`] when the location does not exist.
    fn set_location_rule(&mut self, location: &str, rule: Rule) -> Result<(), HostError>;

    /// Rule currently attached to `entrance`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownEntrance`] when the entrance does not exist.
    fn entrance_rule(&self, entrance: &str) -> Result<Option<Rule>, HostError>;

    /// Replaces the rule attached to `entrance`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownEntrance`] when the entrance does not exist.
    fn set_entrance_rule(&mut self, entrance: &str, rule: Rule) -> Result<(), HostError>;

    /// Returns true when `region` of `player` exists in the graph.
    fn has_region(&self, region: &str, player: PlayerId) -> bool;

    /// Records that `entrance` must be re-checked whenever `region` of
    /// `player` becomes reachable.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when either end does not exist.
    fn register_indirect_condition(
        &mut self,
        region: &str,
        player: PlayerId,
        entrance: &str,
    ) -> Result<(), HostError>;
}
