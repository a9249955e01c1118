// crates/rando-logic/src/spec.rs
// ============================================================================
// Module: Serializable Rule Specs
// Description: Data-only mirror of the rule algebra with RON and JSON support.
// Purpose: Load authored rule tables, validate their shape, and build rules.
// Dependencies: crate::{error, factory, interfaces, option, registry, rule}, ron, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`RuleSpec`] describes a rule without closures, so it can be written by
//! hand in RON or produced by tools as JSON. Specs are untrusted input:
//! [`SpecValidator`] bounds depth and width before anything is built, and
//! [`RuleSpec::build`] runs every spec through the same validated
//! constructors content code uses.
//!
//! A [`RuleTable`] maps names to specs. Loading a table declares every name in
//! the registry first and then defines them, so entries may reference each
//! other through `Has` in any order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::factory::LogicFactory;
use crate::interfaces::ItemCatalog;
use crate::interfaces::OptionValue;
use crate::interfaces::SpotKind;
use crate::option::OptionRule;
use crate::registry::RuleRegistry;
use crate::rule::Rule;

// ============================================================================
// SECTION: Rule Spec
// ============================================================================

/// Serializable description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSpec {
    /// Always satisfied.
    True,
    /// Never satisfied.
    False,
    /// `count` copies of `item`.
    Received {
        /// Item name.
        item: String,
        /// Required copies.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// `count` copies summed across `items`.
    TotalReceived {
        /// Required summed copies.
        count: u32,
        /// Items counted toward the total.
        items: Vec<String>,
    },
    /// `percent`% of the player's progression items.
    ProgressionPercent {
        /// Required percentage.
        percent: u32,
    },
    /// Spot reachability.
    Reach {
        /// Spot name.
        spot: String,
        /// Spot kind.
        kind: SpotKind,
    },
    /// Every child holds.
    And(Vec<RuleSpec>),
    /// At least one child holds.
    Or(Vec<RuleSpec>),
    /// At least `count` children hold.
    Count {
        /// Required number of passing children.
        count: usize,
        /// Children.
        rules: Vec<RuleSpec>,
    },
    /// Branch on one option value.
    OptionEquals {
        /// Option name.
        option: String,
        /// Value selecting `on_match`.
        value: OptionValue,
        /// Branch when the option matches.
        on_match: Box<RuleSpec>,
        /// Branch otherwise.
        otherwise: Box<RuleSpec>,
    },
    /// Branch on an integer option flag.
    OptionFlag {
        /// Option name.
        option: String,
        /// Flag mask.
        flag: i64,
        /// Branch when every flag bit is set.
        on_set: Box<RuleSpec>,
        /// Branch otherwise.
        otherwise: Box<RuleSpec>,
    },
    /// Value-by-value mapping of one option.
    Choose {
        /// Option name.
        option: String,
        /// Every value the option can take.
        #[serde(default)]
        domain: Vec<OptionValue>,
        /// Value-to-branch mapping.
        choices: Vec<(OptionValue, RuleSpec)>,
        /// Branch for unmapped values.
        #[serde(default)]
        default: Option<Box<RuleSpec>>,
    },
    /// Reference to a named rule.
    Has(String),
}

/// Default copy count for `Received` specs.
const fn default_count() -> u32 {
    1
}

impl RuleSpec {
    /// Builds the rule for the factory's player.
    ///
    /// `Has` references are declared in `registry` as they are met.
    ///
    /// # Errors
    ///
    /// Returns the constructor error of the first invalid node.
    pub fn build<I>(&self, factory: &LogicFactory<'_, I>, registry: &mut RuleRegistry) -> RuleResult<Rule>
    where
        I: ItemCatalog + ?Sized,
    {
        match self {
            Self::True => Ok(Rule::True),
            Self::False => Ok(Rule::False),
            Self::Received {
                item,
                count,
            } => factory.received_n(item, *count),
            Self::TotalReceived {
                count,
                items,
            } => factory.total_received(*count, items),
            Self::ProgressionPercent {
                percent,
            } => factory.has_progression_percent(*percent),
            Self::Reach {
                spot,
                kind,
            } => Ok(Rule::reach(spot, *kind, factory.player())),
            Self::And(specs) => Rule::and(build_all(specs, factory, registry)?),
            Self::Or(specs) => Rule::or(build_all(specs, factory, registry)?),
            Self::Count {
                count,
                rules,
            } => Rule::count(*count, build_all(rules, factory, registry)?),
            Self::OptionEquals {
                option,
                value,
                on_match,
                otherwise,
            } => Ok(Rule::option(OptionRule::simple(
                option,
                value.clone(),
                on_match.build(factory, registry)?,
                otherwise.build(factory, registry)?,
            ))),
            Self::OptionFlag {
                option,
                flag,
                on_set,
                otherwise,
            } => Ok(Rule::option(OptionRule::bitwise(
                option,
                *flag,
                on_set.build(factory, registry)?,
                otherwise.build(factory, registry)?,
            ))),
            Self::Choose {
                option,
                domain,
                choices,
                default,
            } => {
                let mut built = Vec::with_capacity(choices.len());
                for (value, spec) in choices {
                    built.push((value.clone(), spec.build(factory, registry)?));
                }
                let default = match default {
                    Some(spec) => Some(spec.build(factory, registry)?),
                    None => None,
                };
                OptionRule::choose(option, domain.iter().cloned(), built, default).map(Rule::option)
            }
            Self::Has(name) => Ok(registry.has(name)),
        }
    }

    /// Direct children of this spec, including option branches.
    fn children(&self) -> Vec<&Self> {
        match self {
            Self::And(specs) | Self::Or(specs) => specs.iter().collect(),
            Self::Count {
                rules, ..
            } => rules.iter().collect(),
            Self::OptionEquals {
                on_match,
                otherwise,
                ..
            } => vec![&**on_match, &**otherwise],
            Self::OptionFlag {
                on_set,
                otherwise,
                ..
            } => vec![&**on_set, &**otherwise],
            Self::Choose {
                choices,
                default,
                ..
            } => choices.iter().map(|(_, spec)| spec).chain(default.as_deref()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Builds every spec in order.
fn build_all<I>(
    specs: &[RuleSpec],
    factory: &LogicFactory<'_, I>,
    registry: &mut RuleRegistry,
) -> RuleResult<Vec<Rule>>
where
    I: ItemCatalog + ?Sized,
{
    specs.iter().map(|spec| spec.build(factory, registry)).collect()
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Default maximum spec nesting depth.
pub const DEFAULT_SPEC_DEPTH: usize = 32;

/// Default maximum children per node.
pub const DEFAULT_SPEC_CHILDREN: usize = 256;

/// Default maximum spec file size in bytes.
pub const DEFAULT_SPEC_FILE_BYTES: usize = 1024 * 1024;

/// Shape limits for untrusted specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecLimits {
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum children of one node.
    pub max_children: usize,
    /// Maximum size of a spec file.
    pub max_file_bytes: usize,
}

impl Default for SpecLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_SPEC_DEPTH,
            max_children: DEFAULT_SPEC_CHILDREN,
            max_file_bytes: DEFAULT_SPEC_FILE_BYTES,
        }
    }
}

/// Structural validator for rule specs.
#[derive(Debug, Clone, Default)]
pub struct SpecValidator {
    /// Limits enforced.
    limits: SpecLimits,
}

impl SpecValidator {
    /// Creates a validator with the given limits.
    #[must_use]
    pub const fn new(limits: SpecLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Limits enforced.
    #[must_use]
    pub const fn limits(&self) -> &SpecLimits {
        &self.limits
    }

    /// Validates depth, width, and combinator arity.
    ///
    /// Item and option checks happen at build time.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] describing the first violation.
    pub fn validate(&self, spec: &RuleSpec) -> RuleResult {
        self.validate_node(spec, 0)
    }

    /// Validates one node and its descendants.
    fn validate_node(&self, spec: &RuleSpec, depth: usize) -> RuleResult {
        if depth > self.limits.max_depth {
            return Err(RuleError::spec(format!(
                "rule spec too deep: {depth} levels (max {})",
                self.limits.max_depth
            )));
        }
        match spec {
            RuleSpec::And(specs) | RuleSpec::Or(specs) if specs.is_empty() => {
                return Err(RuleError::spec("empty And/Or rule spec"));
            }
            RuleSpec::Count {
                count,
                rules,
            } if *count == 0 || *count > rules.len() => {
                return Err(RuleError::spec(format!(
                    "Count {count} is outside 1..={} for its rules",
                    rules.len()
                )));
            }
            _ => {}
        }
        let children = spec.children();
        if children.len() > self.limits.max_children {
            return Err(RuleError::spec(format!(
                "rule spec has {} children (max {})",
                children.len(),
                self.limits.max_children
            )));
        }
        for child in children {
            self.validate_node(child, depth + 1)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Rule Table
// ============================================================================

/// Named rule specs, serialized as a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    /// Specs by name.
    rules: BTreeMap<String, RuleSpec>,
}

impl RuleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: impl Into<String>, spec: RuleSpec) -> Option<RuleSpec> {
        self.rules.insert(name.into(), spec)
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.get(name)
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.rules.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses a RON table.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] when parsing fails.
    pub fn from_ron(source: &str) -> RuleResult<Self> {
        ron::from_str(source).map_err(|err| RuleError::spec(err.to_string()))
    }

    /// Parses a JSON table.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] when parsing fails.
    pub fn from_json(source: &str) -> RuleResult<Self> {
        serde_json::from_str(source).map_err(|err| RuleError::spec(err.to_string()))
    }

    /// Pretty RON rendering.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] when serialization fails.
    pub fn to_ron(&self) -> RuleResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|err| RuleError::spec(err.to_string()))
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] when serialization fails.
    pub fn to_json(&self) -> RuleResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| RuleError::spec(err.to_string()))
    }

    /// Validates every entry.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Spec`] naming the first invalid entry.
    pub fn validate(&self, validator: &SpecValidator) -> RuleResult {
        for (name, spec) in &self.rules {
            validator.validate(spec).map_err(|err| match err {
                RuleError::Spec(message) => RuleError::spec(format!("rule '{name}': {message}")),
                other => other,
            })?;
        }
        Ok(())
    }

    /// Declares every name, builds every entry, then defines them all.
    ///
    /// Nothing is defined unless every entry builds.
    ///
    /// # Errors
    ///
    /// Returns the first build error or [`RuleError::AlreadyDefined`] when a
    /// name is already defined in `registry`.
    pub fn load_into<I>(&self, factory: &LogicFactory<'_, I>, registry: &mut RuleRegistry) -> RuleResult
    where
        I: ItemCatalog + ?Sized,
    {
        for name in self.rules.keys() {
            if registry.is_defined(name) {
                return Err(RuleError::AlreadyDefined {
                    name: name.clone(),
                });
            }
            registry.declare(name);
        }
        let mut built = Vec::with_capacity(self.rules.len());
        for (name, spec) in &self.rules {
            built.push((name, spec.build(factory, registry)?));
        }
        for (name, rule) in built {
            registry.define(name, rule)?;
        }
        Ok(())
    }
}
