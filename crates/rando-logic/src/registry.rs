// crates/rando-logic/src/registry.rs
// ============================================================================
// Module: Rule Registry
// Description: Named, write-once rule table with forward references.
// Purpose: Let large mutually-referential rule tables be built in any order.
// Dependencies: crate::{error, leaf, rule}
// ============================================================================

//! ## Overview
//! Building a table of named rules happens in two phases. [`RuleRegistry::has`]
//! declares a slot and returns a [`Rule::Has`] reference to it, which may be
//! embedded in other rules right away. [`RuleRegistry::define`] fills the slot
//! exactly once. A `Has` rule looks its target up at evaluation time, so a
//! reference evaluated before its definition fails with
//! [`RuleError::UndefinedRule`].
//!
//! `Has` holds a weak handle, so a registry and the rules inside it may refer
//! to each other without keeping each other alive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::Weak;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::leaf::Name;
use crate::rule::Rule;

/// Shared storage behind one registry name.
type Slot = Arc<OnceLock<Rule>>;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Write-once table of named rules.
///
/// # Invariants
/// - Each name is defined at most once.
/// - Declared slots are never removed.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    /// Declared slots by name.
    slots: BTreeMap<Name, Slot>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` without defining it.
    ///
    /// Declared names show up in [`RuleRegistry::undefined`] until defined.
    pub fn declare(&mut self, name: &str) {
        self.slot(name);
    }

    /// Declares `name` if needed and returns its slot.
    fn slot(&mut self, name: &str) -> (Name, Slot) {
        if let Some((key, slot)) = self.slots.get_key_value(name) {
            return (Arc::clone(key), Arc::clone(slot));
        }
        let key: Name = Arc::from(name);
        let slot = Slot::default();
        self.slots.insert(Arc::clone(&key), Arc::clone(&slot));
        (key, slot)
    }

    /// Returns a reference rule to `name`, declaring it when new.
    ///
    /// Never fails; the target may be defined later.
    pub fn has(&mut self, name: &str) -> Rule {
        let (name, slot) = self.slot(name);
        Rule::Has(Has {
            name,
            slot: Arc::downgrade(&slot),
        })
    }

    /// Defines `name` as `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::AlreadyDefined`] when `name` already has a rule.
    pub fn define(&mut self, name: &str, rule: Rule) -> RuleResult {
        let (_, slot) = self.slot(name);
        slot.set(rule).map_err(|_| RuleError::AlreadyDefined {
            name: name.to_string(),
        })
    }

    /// Defines several rules, stopping at the first duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::AlreadyDefined`] for the first name already defined.
    pub fn extend<S: AsRef<str>>(&mut self, entries: impl IntoIterator<Item = (S, Rule)>) -> RuleResult {
        for (name, rule) in entries {
            self.define(name.as_ref(), rule)?;
        }
        Ok(())
    }

    /// Returns the rule defined for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.slots.get(name).and_then(|slot| slot.get())
    }

    /// Returns true when `name` has a definition.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names that were referenced or declared but never defined, sorted.
    #[must_use]
    pub fn undefined(&self) -> Vec<&str> {
        self.slots.iter().filter(|(_, slot)| slot.get().is_none()).map(|(name, _)| &**name).collect()
    }

    /// Checks that every referenced name has a definition.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UndefinedRule`] for the first undefined name.
    pub fn validate(&self) -> RuleResult {
        match self.undefined().first() {
            Some(name) => Err(RuleError::UndefinedRule {
                name: (*name).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Declared names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(AsRef::as_ref)
    }

    /// Number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// SECTION: Has Reference
// ============================================================================

/// Named reference into a [`RuleRegistry`].
///
/// # Invariants
/// - Equality and hashing use the name only.
#[derive(Clone)]
pub struct Has {
    /// Registry name.
    name: Name,
    /// Weak handle to the registry slot.
    slot: Weak<OnceLock<Rule>>,
}

impl Has {
    /// Registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true when the target is defined and the registry is alive.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.slot.upgrade().is_some_and(|slot| slot.get().is_some())
    }

    /// Runs `f` against the target rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::RegistryDropped`] when the registry is gone,
    /// [`RuleError::UndefinedRule`] when the name has no definition, or the
    /// error returned by `f`.
    pub fn with_target<R>(&self, f: impl FnOnce(&Rule) -> RuleResult<R>) -> RuleResult<R> {
        let slot = self.slot.upgrade().ok_or_else(|| RuleError::RegistryDropped {
            name: self.name.to_string(),
        })?;
        let target = slot.get().ok_or_else(|| RuleError::UndefinedRule {
            name: self.name.to_string(),
        })?;
        f(target)
    }
}

impl PartialEq for Has {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Has {}

impl Hash for Has {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Has {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Has").field("name", &self.name).field("defined", &self.is_defined()).finish()
    }
}

impl fmt::Display for Has {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.upgrade() {
            None => write!(f, "Has {} -> <dropped registry>", self.name),
            Some(slot) if slot.get().is_none() => write!(f, "Has {} -> <undefined>", self.name),
            Some(_) => write!(f, "Has {}", self.name),
        }
    }
}
