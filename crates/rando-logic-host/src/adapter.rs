// crates/rando-logic-host/src/adapter.rs
// ============================================================================
// Module: Rule Adapter
// Description: Attach rules to a host world graph and check access.
// Purpose: Prepare rules for one world's context and log failing checks.
// Dependencies: rando-logic, rando-logic-config, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`RuleAdapter`] borrows a host [`WorldGraph`] and the [`LogicContext`] of
//! the world's player. Every rule passing through it is prepared once:
//! option rules are specialized for the context, literals are folded, and for
//! entrances the regions the rule reaches are registered as indirect
//! conditions. Access checks that fail with an error are logged together
//! with the rule's explanation before the error is returned.

use std::collections::BTreeSet;

use rando_logic::ExplainOptions;
use rando_logic::LogicContext;
use rando_logic::LogicState;
use rando_logic::Rule;
use rando_logic::RuleError;
use rando_logic_config::LogicConfig;
use thiserror::Error;
use tracing::debug;
use tracing::error;

use crate::connections::RegionRef;
use crate::connections::region_references;
use crate::world::HostError;
use crate::world::WorldGraph;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while attaching or checking rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Rule construction or evaluation failed.
    #[error(transparent)]
    Rule(#[from] RuleError),
    /// The host graph rejected the request.
    #[error(transparent)]
    Host(#[from] HostError),
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Adapter behavior toggles.
#[allow(clippy::struct_excessive_bools, reason = "Settings mirror the [adapter] config flags.")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterSettings {
    /// Resolve option rules for the adapter's context before attaching.
    pub specialize_options: bool,
    /// Fold literals out of rules before attaching.
    pub simplify_on_attach: bool,
    /// Register region references of entrance rules as indirect conditions.
    pub register_indirect_connections: bool,
    /// Log an explanation when an access check fails with an error.
    pub explain_failures: bool,
    /// Rendering options for logged explanations.
    pub explain: ExplainOptions,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::from(&LogicConfig::default())
    }
}

impl From<&LogicConfig> for AdapterSettings {
    fn from(config: &LogicConfig) -> Self {
        Self {
            specialize_options: config.adapter.specialize_options,
            simplify_on_attach: config.adapter.simplify_on_attach,
            register_indirect_connections: config.adapter.register_indirect_connections,
            explain_failures: config.adapter.explain_failures,
            explain: config.explain.options(),
        }
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Attaches rules to one player's world graph.
pub struct RuleAdapter<'a, W: ?Sized, C: ?Sized> {
    /// Host graph receiving rules.
    world: &'a mut W,
    /// Option context of the world's player.
    ctx: &'a C,
    /// Behavior toggles.
    settings: AdapterSettings,
}

impl<'a, W, C> RuleAdapter<'a, W, C>
where
    W: WorldGraph + ?Sized,
    C: LogicContext + ?Sized,
{
    /// Creates an adapter.
    pub const fn new(world: &'a mut W, ctx: &'a C, settings: AdapterSettings) -> Self {
        Self {
            world,
            ctx,
            settings,
        }
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// The wrapped host graph.
    #[must_use]
    pub fn world(&self) -> &W {
        &*self.world
    }

    /// Applies specialization and simplification as configured.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Rule`] when an option cannot be resolved for
    /// the adapter's context.
    pub fn prepare(&self, rule: Rule) -> Result<Rule, AdapterError> {
        let rule = if self.settings.specialize_options { rule.specialize(self.ctx)? } else { rule };
        Ok(if self.settings.simplify_on_attach { rule.simplify() } else { rule })
    }

    // ------------------------------------------------------------------------
    // Entrances
    // ------------------------------------------------------------------------

    /// Replaces the rule of `entrance`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation, region scanning, or the
    /// host graph fails. The graph is left unchanged on error.
    pub fn set_entrance_rule(&mut self, entrance: &str, rule: Rule) -> Result<(), AdapterError> {
        let rule = self.prepare(rule)?;
        self.world.entrance_rule(entrance)?;
        let regions = self.staged_regions(&rule)?;
        self.register_regions(entrance, regions)?;
        debug!(entrance = %entrance, rule = %rule, "set entrance rule");
        self.world.set_entrance_rule(entrance, rule)?;
        Ok(())
    }

    /// Combines `rule` with the existing rule of `entrance` using `And`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation, region scanning, or the
    /// host graph fails. The graph is left unchanged on error.
    pub fn add_entrance_rule(&mut self, entrance: &str, rule: Rule) -> Result<(), AdapterError> {
        let rule = self.prepare(rule)?;
        let existing = self.world.entrance_rule(entrance)?;
        let regions = self.staged_regions(&rule)?;
        let combined = match existing {
            Some(existing) => existing & rule,
            None => rule,
        };
        self.register_regions(entrance, regions)?;
        debug!(entrance = %entrance, rule = %combined, "extended entrance rule");
        self.world.set_entrance_rule(entrance, combined)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// Replaces the rule of `location`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation or the host graph fails.
    pub fn set_location_rule(&mut self, location: &str, rule: Rule) -> Result<(), AdapterError> {
        let rule = self.prepare(rule)?;
        debug!(location = %location, rule = %rule, "set location rule");
        self.world.set_location_rule(location, rule)?;
        Ok(())
    }

    /// Combines `rule` with the existing rule of `location` using `And`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation or the host graph fails.
    pub fn add_location_rule(&mut self, location: &str, rule: Rule) -> Result<(), AdapterError> {
        let rule = self.prepare(rule)?;
        let combined = match self.world.location_rule(location)? {
            Some(existing) => existing & rule,
            None => rule,
        };
        debug!(location = %location, rule = %combined, "extended location rule");
        self.world.set_location_rule(location, combined)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Access Checks
    // ------------------------------------------------------------------------

    /// Evaluates `rule` against `state` with the adapter's context.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Rule`] when evaluation fails. The failing rule
    /// is logged first, with its explanation when enabled.
    pub fn check_access<S: LogicState + ?Sized>(&self, rule: &Rule, state: &S) -> Result<bool, AdapterError> {
        rule.evaluate(state, self.ctx).map_err(|err| {
            if self.settings.explain_failures {
                let explanation = rule.explain_with(state, self.ctx, true, self.settings.explain);
                error!(rule = %rule, error = %err, explanation = %explanation, "access rule failed to evaluate");
            } else {
                error!(rule = %rule, error = %err, "access rule failed to evaluate");
            }
            AdapterError::Rule(err)
        })
    }

    /// Evaluates the rule attached to `location`; a location without a rule
    /// is always accessible.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the location is unknown or evaluation
    /// fails.
    pub fn can_access_location<S: LogicState + ?Sized>(&self, location: &str, state: &S) -> Result<bool, AdapterError> {
        match self.world.location_rule(location)? {
            Some(rule) => self.check_access(&rule, state),
            None => Ok(true),
        }
    }

    /// Regions `rule` reaches, checked against the graph before anything is
    /// registered.
    fn staged_regions(&self, rule: &Rule) -> Result<BTreeSet<RegionRef>, AdapterError> {
        if !self.settings.register_indirect_connections {
            return Ok(BTreeSet::new());
        }
        let regions = region_references(rule)?;
        if let Some(missing) = regions.iter().find(|region| !self.world.has_region(&region.region, region.player)) {
            return Err(HostError::UnknownRegion {
                region: missing.region.clone(),
                player: missing.player,
            }
            .into());
        }
        Ok(regions)
    }

    /// Registers each staged region as an indirect condition of `entrance`.
    fn register_regions(&mut self, entrance: &str, regions: BTreeSet<RegionRef>) -> Result<(), AdapterError> {
        for region in regions {
            debug!(entrance = %entrance, region = %region.region, player = region.player, "indirect condition");
            self.world.register_indirect_condition(&region.region, region.player, entrance)?;
        }
        Ok(())
    }
}
