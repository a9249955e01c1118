// crates/rando-logic/tests/support/mocks.rs
// ============================================================================
// Module: Test Mocks
// Description: In-memory state, context, and item catalog for rule tests.
// ============================================================================
//! ## Overview
//! [`MemoryState`] answers item, reachability, and progression queries from
//! maps; [`MemoryContext`] serves fixed option values for one player.

#![allow(
    dead_code,
    clippy::missing_const_for_fn,
    reason = "Shared mocks are not used by every test binary."
)]

use std::collections::BTreeMap;
use std::collections::HashMap;

use rando_logic::ItemClassification;
use rando_logic::LogicContext;
use rando_logic::LogicState;
use rando_logic::OptionValue;
use rando_logic::PlayerId;
use rando_logic::RuleError;
use rando_logic::RuleResult;
use rando_logic::SpotDetails;
use rando_logic::SpotKind;

/// Player used by most tests.
pub const PLAYER: PlayerId = 1;

// ========================================================================
// Item Catalog
// ========================================================================

/// Item table shared by the tests.
pub fn catalog() -> HashMap<String, ItemClassification> {
    let mut catalog: HashMap<String, ItemClassification> = [
        "Pickaxe", "Sword", "Dagger", "Bow", "Key", "Gem", "Lantern", "A", "B", "C", "D",
    ]
    .into_iter()
    .map(|item| (item.to_string(), ItemClassification::Progression))
    .collect();
    for index in 1..=10 {
        catalog.insert(format!("Item{index}"), ItemClassification::Progression);
    }
    catalog.insert("Compass".to_string(), ItemClassification::ProgressionSkipBalancing);
    catalog.insert("Potion".to_string(), ItemClassification::Filler);
    catalog.insert("Shield".to_string(), ItemClassification::Useful);
    catalog
}

// ========================================================================
// Game State
// ========================================================================

/// In-memory game state.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Collected copies by player and item.
    items: HashMap<(PlayerId, String), u32>,
    /// Known spots and whether they are reachable.
    spots: BTreeMap<(SpotKind, String), bool>,
    /// Graph facts for explanations.
    details: BTreeMap<(SpotKind, String), SpotDetails>,
    /// Total progression items per player.
    totals: HashMap<PlayerId, u32>,
}

impl MemoryState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one copy of `item` for [`PLAYER`].
    pub fn with(mut self, item: &str) -> Self {
        self.collect(item, PLAYER, 1);
        self
    }

    /// Adds `count` copies of `item` for [`PLAYER`].
    pub fn with_n(mut self, item: &str, count: u32) -> Self {
        self.collect(item, PLAYER, count);
        self
    }

    /// Adds `count` copies of `item` for `player`.
    pub fn collect(&mut self, item: &str, player: PlayerId, count: u32) {
        *self.items.entry((player, item.to_string())).or_default() += count;
    }

    /// Declares a spot and its reachability.
    pub fn with_spot(mut self, kind: SpotKind, spot: &str, reachable: bool) -> Self {
        self.spots.insert((kind, spot.to_string()), reachable);
        self
    }

    /// Declares a spot with graph facts.
    pub fn with_details(mut self, kind: SpotKind, spot: &str, reachable: bool, details: SpotDetails) -> Self {
        self.spots.insert((kind, spot.to_string()), reachable);
        self.details.insert((kind, spot.to_string()), details);
        self
    }

    /// Sets the total progression count for [`PLAYER`].
    pub fn with_progression_total(mut self, total: u32) -> Self {
        self.totals.insert(PLAYER, total);
        self
    }
}

impl LogicState for MemoryState {
    fn count(&self, item: &str, player: PlayerId) -> u32 {
        self.items.get(&(player, item.to_string())).copied().unwrap_or(0)
    }

    fn can_reach(&self, spot: &str, kind: SpotKind, _player: PlayerId) -> RuleResult<bool> {
        self.spots.get(&(kind, spot.to_string())).copied().ok_or_else(|| RuleError::UnknownSpot {
            kind: kind.as_str(),
            spot: spot.to_string(),
        })
    }

    fn progression_collected(&self, player: PlayerId) -> u32 {
        self.items.iter().filter(|((owner, _), _)| *owner == player).map(|(_, count)| *count).sum()
    }

    fn progression_total(&self, player: PlayerId) -> u32 {
        self.totals.get(&player).copied().unwrap_or(0)
    }

    fn spot_details(&self, spot: &str, kind: SpotKind, _player: PlayerId) -> RuleResult<Option<SpotDetails>> {
        Ok(self.details.get(&(kind, spot.to_string())).cloned())
    }
}

// ========================================================================
// Context
// ========================================================================

/// Fixed option values for one player.
#[derive(Debug, Clone)]
pub struct MemoryContext {
    /// Player served.
    player: PlayerId,
    /// Option values by name.
    options: BTreeMap<String, OptionValue>,
}

impl MemoryContext {
    /// Context for [`PLAYER`] with no options.
    pub fn new() -> Self {
        Self {
            player: PLAYER,
            options: BTreeMap::new(),
        }
    }

    /// Context for another player.
    pub fn for_player(player: PlayerId) -> Self {
        Self {
            player,
            options: BTreeMap::new(),
        }
    }

    /// Sets an option value.
    pub fn with_option(mut self, option: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(option.to_string(), value.into());
        self
    }
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicContext for MemoryContext {
    fn player(&self) -> PlayerId {
        self.player
    }

    fn option_value(&self, option: &str) -> RuleResult<OptionValue> {
        self.options.get(option).cloned().ok_or_else(|| RuleError::UnknownOption {
            option: option.to_string(),
            player: self.player,
        })
    }
}
