// crates/rando-logic/src/leaf.rs
// ============================================================================
// Module: State-Query Leaves
// Description: Atomic predicates over the host game state.
// Purpose: Define received, total-received, progression-percent, and reach leaves.
// Dependencies: crate::{error, interfaces}
// ============================================================================

//! ## Overview
//! Leaves are the boundary where the universal rule algebra hands off to the
//! host. Each leaf owns one piece of evaluation logic, checks its own
//! preconditions in its constructor, and never mutates state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::interfaces::ItemCatalog;
use crate::interfaces::LogicState;
use crate::interfaces::PlayerId;
use crate::interfaces::SpotKind;

/// Shared, cheaply cloned name used for items, spots, options, and registry keys.
pub type Name = Arc<str>;

// ============================================================================
// SECTION: Received
// ============================================================================

/// "Player received `item` at least `count` times."
///
/// # Invariants
/// - `item` is a progression item of the catalog it was built against.
/// - `count >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Received {
    /// Item name.
    item: Name,
    /// Owning player.
    player: PlayerId,
    /// Required copies.
    count: u32,
}

impl Received {
    /// Builds a received leaf after checking the item classification.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ZeroCount`] for a zero count and the catalog's
    /// error when the item is not a progression item.
    pub fn new<I>(catalog: &I, item: &str, player: PlayerId, count: u32) -> RuleResult<Self>
    where
        I: ItemCatalog + ?Sized,
    {
        if count == 0 {
            return Err(RuleError::ZeroCount {
                kind: "Received",
            });
        }
        catalog.require_progression(item)?;
        Ok(Self {
            item: Arc::from(item),
            player,
            count,
        })
    }

    /// Item name.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Owning player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Required copies.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Copies currently held.
    pub fn held<S: LogicState + ?Sized>(&self, state: &S) -> u32 {
        state.count(&self.item, self.player)
    }

    /// Evaluates the leaf.
    pub fn evaluate<S: LogicState + ?Sized>(&self, state: &S) -> bool {
        state.has(&self.item, self.player, self.count)
    }

    /// Returns true when both leaves gate the same item for the same player.
    pub(crate) fn same_key(&self, other: &Self) -> bool {
        self.player == other.player && self.item == other.item
    }

    /// Copy of this leaf with a different count.
    pub(crate) fn with_count(&self, count: u32) -> Self {
        Self {
            item: Arc::clone(&self.item),
            player: self.player,
            count,
        }
    }
}

// ============================================================================
// SECTION: Total Received
// ============================================================================

/// "Player received `count` items in total across `items`."
///
/// Sums item quantities, unlike `Count`, which counts passing sub-rules.
///
/// # Invariants
/// - `items` is non-empty and every item is a progression item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TotalReceived {
    /// Required summed copies.
    count: u32,
    /// Items counted toward the total.
    items: BTreeSet<Name>,
    /// Owning player.
    player: PlayerId,
}

impl TotalReceived {
    /// Builds a total-received leaf.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ZeroCount`], [`RuleError::EmptyItemSet`], or the
    /// catalog's error for the first non-progression item.
    pub fn new<I, S>(
        catalog: &I,
        count: u32,
        items: impl IntoIterator<Item = S>,
        player: PlayerId,
    ) -> RuleResult<Self>
    where
        I: ItemCatalog + ?Sized,
        S: AsRef<str>,
    {
        if count == 0 {
            return Err(RuleError::ZeroCount {
                kind: "TotalReceived",
            });
        }
        let mut names = BTreeSet::new();
        for item in items {
            let item = item.as_ref();
            catalog.require_progression(item)?;
            names.insert(Arc::from(item));
        }
        if names.is_empty() {
            return Err(RuleError::EmptyItemSet);
        }
        Ok(Self {
            count,
            items: names,
            player,
        })
    }

    /// Required summed copies.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Items counted toward the total.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(AsRef::as_ref)
    }

    /// Owning player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Summed copies currently held.
    pub fn held<S: LogicState + ?Sized>(&self, state: &S) -> u32 {
        self.items.iter().fold(0u32, |total, item| total.saturating_add(state.count(item, self.player)))
    }

    /// Evaluates the leaf, stopping once the threshold is reached.
    pub fn evaluate<S: LogicState + ?Sized>(&self, state: &S) -> bool {
        let mut total = 0u32;
        for item in &self.items {
            total = total.saturating_add(state.count(item, self.player));
            if total >= self.count {
                return true;
            }
        }
        false
    }
}

// ============================================================================
// SECTION: Progression Percent
// ============================================================================

/// "Player collected `percent`% of their world's progression items."
///
/// # Invariants
/// - `percent` is in `1..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HasProgressionPercent {
    /// Owning player.
    player: PlayerId,
    /// Required percentage.
    percent: u32,
}

impl HasProgressionPercent {
    /// Builds a progression-percent leaf.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPercent`] outside `(0, 100]`.
    pub const fn new(player: PlayerId, percent: u32) -> RuleResult<Self> {
        if percent == 0 || percent > 100 {
            return Err(RuleError::InvalidPercent {
                percent,
            });
        }
        Ok(Self {
            player,
            percent,
        })
    }

    /// Owning player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Required percentage.
    #[must_use]
    pub const fn percent(&self) -> u32 {
        self.percent
    }

    /// Progression items needed out of `total`, rounded down.
    #[must_use]
    pub fn needed(&self, total: u32) -> u32 {
        let needed = u64::from(total) * u64::from(self.percent) / 100;
        u32::try_from(needed).unwrap_or(total)
    }

    /// Evaluates the leaf.
    pub fn evaluate<S: LogicState + ?Sized>(&self, state: &S) -> bool {
        let needed = self.needed(state.progression_total(self.player));
        state.progression_collected(self.player) >= needed
    }

    /// Returns true when both leaves belong to the same player.
    pub(crate) const fn same_key(&self, other: &Self) -> bool {
        self.player == other.player
    }

    /// Copy of this leaf with a different percentage.
    pub(crate) const fn with_percent(&self, percent: u32) -> Self {
        Self {
            player: self.player,
            percent,
        }
    }
}

// ============================================================================
// SECTION: Reach
// ============================================================================

/// "The spot is reachable in the host graph."
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reach {
    /// Region, location, or entrance name.
    spot: Name,
    /// How the host should resolve the name.
    kind: SpotKind,
    /// Owning player.
    player: PlayerId,
}

impl Reach {
    /// Builds a reach leaf.
    pub fn new(spot: &str, kind: SpotKind, player: PlayerId) -> Self {
        Self {
            spot: Arc::from(spot),
            kind,
            player,
        }
    }

    /// Spot name.
    #[must_use]
    pub fn spot(&self) -> &str {
        &self.spot
    }

    /// Spot kind.
    #[must_use]
    pub const fn kind(&self) -> SpotKind {
        self.kind
    }

    /// Owning player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Evaluates the leaf through the host graph.
    ///
    /// # Errors
    ///
    /// Propagates the host's error for unknown spots.
    pub fn evaluate<S: LogicState + ?Sized>(&self, state: &S) -> RuleResult<bool> {
        state.can_reach(&self.spot, self.kind, self.player)
    }
}
