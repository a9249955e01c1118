// crates/rando-logic-host/tests/support/world.rs
// ============================================================================
// Module: Test World
// Description: In-memory world graph, inventory, and option context.
// ============================================================================
//! ## Overview
//! [`MemoryWorld`] stores rules per location and entrance and records
//! indirect conditions. [`Inventory`] is the state checks run against, and
//! [`Options`] serves fixed option values.

#![allow(
    dead_code,
    clippy::missing_const_for_fn,
    reason = "Shared mocks are not used by every test binary."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

use rando_logic::ItemClassification;
use rando_logic::LogicContext;
use rando_logic::LogicState;
use rando_logic::OptionValue;
use rando_logic::PlayerId;
use rando_logic::Rule;
use rando_logic::RuleError;
use rando_logic::RuleResult;
use rando_logic::SpotKind;
use rando_logic_host::HostError;
use rando_logic_host::WorldGraph;

/// Player owning the test world.
pub const PLAYER: PlayerId = 1;

/// Progression items known to the tests.
pub fn catalog() -> HashMap<String, ItemClassification> {
    ["Key", "Lamp", "Hammer"].into_iter().map(|item| (item.to_string(), ItemClassification::Progression)).collect()
}

// ========================================================================
// World Graph
// ========================================================================

/// An indirect condition as registered by the adapter.
pub type Condition = (String, PlayerId, String);

/// In-memory world graph.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    /// Location rules by name.
    locations: BTreeMap<String, Option<Rule>>,
    /// Entrance rules by name.
    entrances: BTreeMap<String, Option<Rule>>,
    /// Regions by owner.
    regions: BTreeSet<(String, PlayerId)>,
    /// Registered indirect conditions.
    indirect: BTreeSet<Condition>,
}

impl MemoryWorld {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region of [`PLAYER`].
    pub fn with_region(mut self, region: &str) -> Self {
        self.regions.insert((region.to_string(), PLAYER));
        self
    }

    /// Adds a location with no rule.
    pub fn with_location(mut self, location: &str) -> Self {
        self.locations.insert(location.to_string(), None);
        self
    }

    /// Adds an entrance with no rule.
    pub fn with_entrance(mut self, entrance: &str) -> Self {
        self.entrances.insert(entrance.to_string(), None);
        self
    }

    /// Registered indirect conditions, sorted.
    pub fn indirect(&self) -> Vec<Condition> {
        self.indirect.iter().cloned().collect()
    }
}

impl WorldGraph for MemoryWorld {
    fn location_rule(&self, location: &str) -> Result<Option<Rule>, HostError> {
        self.locations.get(location).cloned().ok_or_else(|| HostError::UnknownLocation(location.to_string()))
    }

    fn set_location_rule(&mut self, location: &str, rule: Rule) -> Result<(), HostError> {
        let slot =
            self.locations.get_mut(location).ok_or_else(|| HostError::UnknownLocation(location.to_string()))?;
        *slot = Some(rule);
        Ok(())
    }

    fn entrance_rule(&self, entrance: &str) -> Result<Option<Rule>, HostError> {
        self.entrances.get(entrance).cloned().ok_or_else(|| HostError::UnknownEntrance(entrance.to_string()))
    }

    fn set_entrance_rule(&mut self, entrance: &str, rule: Rule) -> Result<(), HostError> {
        let slot =
            self.entrances.get_mut(entrance).ok_or_else(|| HostError::UnknownEntrance(entrance.to_string()))?;
        *slot = Some(rule);
        Ok(())
    }

    fn has_region(&self, region: &str, player: PlayerId) -> bool {
        self.regions.contains(&(region.to_string(), player))
    }

    fn register_indirect_condition(
        &mut self,
        region: &str,
        player: PlayerId,
        entrance: &str,
    ) -> Result<(), HostError> {
        if !self.entrances.contains_key(entrance) {
            return Err(HostError::UnknownEntrance(entrance.to_string()));
        }
        if !self.regions.contains(&(region.to_string(), player)) {
            return Err(HostError::UnknownRegion {
                region: region.to_string(),
                player,
            });
        }
        self.indirect.insert((region.to_string(), player, entrance.to_string()));
        Ok(())
    }
}

// ========================================================================
// Inventory
// ========================================================================

/// Items held and regions reached by [`PLAYER`].
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Collected copies by item.
    items: HashMap<String, u32>,
    /// Known regions and whether they are reachable.
    regions: BTreeMap<String, bool>,
}

impl Inventory {
    /// Empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one copy of `item`.
    pub fn with(mut self, item: &str) -> Self {
        *self.items.entry(item.to_string()).or_default() += 1;
        self
    }

    /// Declares a region and its reachability.
    pub fn with_region(mut self, region: &str, reachable: bool) -> Self {
        self.regions.insert(region.to_string(), reachable);
        self
    }
}

impl LogicState for Inventory {
    fn count(&self, item: &str, _player: PlayerId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    fn can_reach(&self, spot: &str, kind: SpotKind, _player: PlayerId) -> RuleResult<bool> {
        match kind {
            SpotKind::Region => self.regions.get(spot).copied(),
            SpotKind::Location | SpotKind::Entrance => None,
        }
        .ok_or_else(|| RuleError::UnknownSpot {
            kind: kind.as_str(),
            spot: spot.to_string(),
        })
    }

    fn progression_collected(&self, _player: PlayerId) -> u32 {
        self.items.values().sum()
    }

    fn progression_total(&self, _player: PlayerId) -> u32 {
        0
    }
}

// ========================================================================
// Options
// ========================================================================

/// Fixed option values for [`PLAYER`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Option values by name.
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// No options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option value.
    pub fn with(mut self, option: &str, value: impl Into<OptionValue>) -> Self {
        self.values.insert(option.to_string(), value.into());
        self
    }
}

impl LogicContext for Options {
    fn player(&self) -> PlayerId {
        PLAYER
    }

    fn option_value(&self, option: &str) -> RuleResult<OptionValue> {
        self.values.get(option).cloned().ok_or_else(|| RuleError::UnknownOption {
            option: option.to_string(),
            player: PLAYER,
        })
    }
}
