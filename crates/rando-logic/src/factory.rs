// crates/rando-logic/src/factory.rs
// ============================================================================
// Module: Rule Factory
// Description: Per-player rule constructors and fluent combinator builders.
// Purpose: Give content code a compact way to build validated rule trees.
// Dependencies: crate::{error, interfaces, rule}
// ============================================================================

//! ## Overview
//! Content code builds hundreds of rules for one player against one item
//! table. [`LogicFactory`] binds the catalog and player once so each call only
//! names what differs. [`JunctionBuilder`] and [`CountBuilder`] collect
//! children fluently and validate on `build`.

use crate::combinator::Junction;
use crate::error::RuleResult;
use crate::interfaces::ItemCatalog;
use crate::interfaces::PlayerId;
use crate::interfaces::SpotKind;
use crate::rule::Rule;

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Rule constructors bound to one item catalog and one player.
#[derive(Debug)]
pub struct LogicFactory<'c, I: ?Sized> {
    /// Item table used for progression checks.
    catalog: &'c I,
    /// Player the rules belong to.
    player: PlayerId,
}

impl<I: ?Sized> Clone for LogicFactory<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized> Copy for LogicFactory<'_, I> {}

impl<'c, I: ItemCatalog + ?Sized> LogicFactory<'c, I> {
    /// Creates a factory for `player`.
    pub const fn new(catalog: &'c I, player: PlayerId) -> Self {
        Self {
            catalog,
            player,
        }
    }

    /// Player the rules belong to.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// One copy of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error when `item` is not a progression item.
    pub fn received(&self, item: &str) -> RuleResult<Rule> {
        Rule::received(self.catalog, item, self.player, 1)
    }

    /// `count` copies of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error when `item` is not a progression item or `count` is zero.
    pub fn received_n(&self, item: &str, count: u32) -> RuleResult<Rule> {
        Rule::received(self.catalog, item, self.player, count)
    }

    /// One copy of every item.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty list or a non-progression item.
    pub fn received_all<S: AsRef<str>>(&self, items: impl IntoIterator<Item = S>) -> RuleResult<Rule> {
        Rule::and(self.each_received(items)?)
    }

    /// One copy of any item.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty list or a non-progression item.
    pub fn received_any<S: AsRef<str>>(&self, items: impl IntoIterator<Item = S>) -> RuleResult<Rule> {
        Rule::or(self.each_received(items)?)
    }

    /// One copy each of at least `count` distinct items.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid threshold or a non-progression item.
    pub fn received_n_of<S: AsRef<str>>(
        &self,
        count: usize,
        items: impl IntoIterator<Item = S>,
    ) -> RuleResult<Rule> {
        Rule::count(count, self.each_received(items)?)
    }

    /// `count` copies summed across `items`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty list, a zero count, or a non-progression item.
    pub fn total_received<S: AsRef<str>>(
        &self,
        count: u32,
        items: impl IntoIterator<Item = S>,
    ) -> RuleResult<Rule> {
        Rule::total_received(self.catalog, count, items, self.player)
    }

    /// `percent`% of the player's progression items.
    ///
    /// # Errors
    ///
    /// Returns an error outside `(0, 100]`.
    pub fn has_progression_percent(&self, percent: u32) -> RuleResult<Rule> {
        Rule::has_progression_percent(self.player, percent)
    }

    /// Region reachability.
    #[must_use]
    pub fn can_reach_region(&self, region: &str) -> Rule {
        Rule::reach(region, SpotKind::Region, self.player)
    }

    /// Location reachability.
    #[must_use]
    pub fn can_reach_location(&self, location: &str) -> Rule {
        Rule::reach(location, SpotKind::Location, self.player)
    }

    /// Entrance reachability.
    #[must_use]
    pub fn can_reach_entrance(&self, entrance: &str) -> Rule {
        Rule::reach(entrance, SpotKind::Entrance, self.player)
    }

    /// Received leaves for each item, in order.
    fn each_received<S: AsRef<str>>(&self, items: impl IntoIterator<Item = S>) -> RuleResult<Vec<Rule>> {
        items.into_iter().map(|item| self.received(item.as_ref())).collect()
    }
}

// ============================================================================
// SECTION: Fluent Builders
// ============================================================================

/// Fluent builder for `And` and `Or`.
#[derive(Debug, Clone)]
pub struct JunctionBuilder {
    /// Combinator being built.
    junction: Junction,
    /// Children collected so far.
    rules: Vec<Rule>,
}

impl JunctionBuilder {
    /// Starts an `And`.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            junction: Junction::All,
            rules: Vec::new(),
        }
    }

    /// Starts an `Or`.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            junction: Junction::Any,
            rules: Vec::new(),
        }
    }

    /// Adds a child.
    #[must_use]
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several children.
    #[must_use]
    pub fn with_all(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Builds the combinator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::EmptyCombinator`] when no child was added.
    pub fn build(self) -> RuleResult<Rule> {
        self.junction.build(self.rules)
    }
}

/// Fluent builder for `Count`.
#[derive(Debug, Clone)]
pub struct CountBuilder {
    /// Required number of passing children.
    count: usize,
    /// Children collected so far.
    rules: Vec<Rule>,
}

impl CountBuilder {
    /// Starts a threshold rule requiring `count` children.
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self {
            count,
            rules: Vec::new(),
        }
    }

    /// Adds a child.
    #[must_use]
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several children.
    #[must_use]
    pub fn with_all(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Builds the threshold rule.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::InvalidCount`] unless `1 <= count <= len`.
    pub fn build(self) -> RuleResult<Rule> {
        Rule::count(self.count, self.rules)
    }
}
