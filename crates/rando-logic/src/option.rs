// crates/rando-logic/src/option.rs
// ============================================================================
// Module: Option-Dependent Rules
// Description: Rules whose branch depends on a player's generation options.
// Purpose: Resolve simple, bitwise, multi-way, and custom option choices lazily.
// Dependencies: crate::{error, interfaces, leaf, rule}
// ============================================================================

//! ## Overview
//! An [`OptionRule`] holds the option name(s) and every candidate branch. It
//! is resolved through a [`LogicContext`] each time it is used and never
//! caches the result, so one tree can serve several players. Hosts that
//! attach rules per player can resolve once up front with
//! [`crate::Rule::specialize`].
//!
//! Four shapes are supported:
//! - simple: one option compared against one value
//! - bitwise: one integer option tested against a flag mask
//! - choose: one option mapped value by value, checked for coverage at build
//! - complex: a custom function over several resolved option values

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::interfaces::LogicContext;
use crate::interfaces::OptionValue;
use crate::leaf::Name;
use crate::rule::Rule;

// ============================================================================
// SECTION: Complex Choice Types
// ============================================================================

/// Result of a custom option chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// A rule built directly by the chooser.
    Rule(Rule),
    /// Key of one of the branches declared with the rule.
    Branch(String),
}

/// Custom chooser over resolved option values, in declaration order.
pub type Chooser = Arc<dyn Fn(&[OptionValue]) -> RuleResult<ChoiceOutcome> + Send + Sync>;

// ============================================================================
// SECTION: Option Rule
// ============================================================================

/// Rule deferred until a player's options are known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionRule {
    /// Resolution shape and branch data.
    kind: OptionKind,
}

/// Resolution shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OptionKind {
    /// Equality against one value.
    Simple(SimpleChoice),
    /// Flag test on an integer option.
    Bitwise(BitwiseChoice),
    /// Value-by-value mapping.
    Choose(MultiChoice),
    /// Custom function over several options.
    Complex(ComplexChoice),
}

/// Branch data for a simple choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SimpleChoice {
    /// Option queried.
    option: Name,
    /// Value selecting `on_match`.
    value: OptionValue,
    /// Branch when the option matches.
    on_match: Rule,
    /// Branch otherwise.
    otherwise: Rule,
}

/// Branch data for a bitwise choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BitwiseChoice {
    /// Option queried.
    option: Name,
    /// Flag mask that must be fully set.
    flag: i64,
    /// Branch when every flag bit is set.
    on_set: Rule,
    /// Branch otherwise.
    otherwise: Rule,
}

/// Branch data for a multi-way choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MultiChoice {
    /// Option queried.
    option: Name,
    /// Value-to-branch mapping in declaration order.
    choices: Vec<(OptionValue, Rule)>,
    /// Branch for values with no mapping.
    default: Option<Rule>,
}

/// Branch data for a custom choice.
#[derive(Clone)]
struct ComplexChoice {
    /// Name shown in displays and errors.
    label: Name,
    /// Options resolved and passed to the chooser, in order.
    options: Vec<Name>,
    /// Named branches the chooser may select.
    branches: BTreeMap<String, Rule>,
    /// Custom chooser.
    chooser: Chooser,
}

impl fmt::Debug for ComplexChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexChoice")
            .field("label", &self.label)
            .field("options", &self.options)
            .field("branches", &self.branches)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ComplexChoice {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.options == other.options
            && self.branches == other.branches
            && Arc::ptr_eq(&self.chooser, &other.chooser)
    }
}

impl Eq for ComplexChoice {}

impl Hash for ComplexChoice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.options.hash(state);
        self.branches.hash(state);
        std::ptr::hash(Arc::as_ptr(&self.chooser).cast::<()>(), state);
    }
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl OptionRule {
    /// `on_match` when `option` equals `value` (or a set option contains it),
    /// `otherwise` if not.
    #[must_use]
    pub fn simple(option: &str, value: impl Into<OptionValue>, on_match: Rule, otherwise: Rule) -> Self {
        Self {
            kind: OptionKind::Simple(SimpleChoice {
                option: Arc::from(option),
                value: value.into(),
                on_match,
                otherwise,
            }),
        }
    }

    /// `on_set` when every bit of `flag` is set in the integer `option`.
    #[must_use]
    pub fn bitwise(option: &str, flag: i64, on_set: Rule, otherwise: Rule) -> Self {
        Self {
            kind: OptionKind::Bitwise(BitwiseChoice {
                option: Arc::from(option),
                flag,
                on_set,
                otherwise,
            }),
        }
    }

    /// Multi-way choice over the values of `option`.
    ///
    /// `domain` lists every value the option can take. Without a `default`,
    /// each of them must have a branch.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UncoveredChoice`] for the first uncovered value
    /// when no default is given.
    pub fn choose(
        option: &str,
        domain: impl IntoIterator<Item = OptionValue>,
        choices: impl IntoIterator<Item = (OptionValue, Rule)>,
        default: Option<Rule>,
    ) -> RuleResult<Self> {
        let choices: Vec<(OptionValue, Rule)> = choices.into_iter().collect();
        if default.is_none() {
            for value in domain {
                if !choices.iter().any(|(key, _)| *key == value) {
                    return Err(RuleError::UncoveredChoice {
                        option: option.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(Self {
            kind: OptionKind::Choose(MultiChoice {
                option: Arc::from(option),
                choices,
                default,
            }),
        })
    }

    /// Custom choice over several options.
    ///
    /// `chooser` receives the resolved values of `options` in order and
    /// returns either a rule or the key of one of `branches`.
    pub fn complex<S, F>(
        label: &str,
        options: impl IntoIterator<Item = S>,
        branches: impl IntoIterator<Item = (String, Rule)>,
        chooser: F,
    ) -> Self
    where
        S: AsRef<str>,
        F: Fn(&[OptionValue]) -> RuleResult<ChoiceOutcome> + Send + Sync + 'static,
    {
        Self {
            kind: OptionKind::Complex(ComplexChoice {
                label: Arc::from(label),
                options: options.into_iter().map(|option| Arc::from(option.as_ref())).collect(),
                branches: branches.into_iter().collect(),
                chooser: Arc::new(chooser),
            }),
        }
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

impl OptionRule {
    /// Picks the branch that applies for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the context's error for unknown options,
    /// [`RuleError::OptionType`] when a bitwise option is not an integer,
    /// [`RuleError::UncoveredChoice`] when a multi-way choice has no branch for
    /// the value, [`RuleError::UnknownBranch`] when a custom chooser names a
    /// branch that was not declared, and any error the chooser returns.
    pub fn choose_rule<C: LogicContext + ?Sized>(&self, ctx: &C) -> RuleResult<Cow<'_, Rule>> {
        match &self.kind {
            OptionKind::Simple(choice) => {
                let value = ctx.option_value(&choice.option)?;
                if value.matches(&choice.value) {
                    Ok(Cow::Borrowed(&choice.on_match))
                } else {
                    Ok(Cow::Borrowed(&choice.otherwise))
                }
            }
            OptionKind::Bitwise(choice) => {
                let value = ctx.option_value(&choice.option)?;
                let bits = value.as_int().ok_or_else(|| RuleError::OptionType {
                    option: choice.option.to_string(),
                    expected: "int",
                    found: value.type_name(),
                })?;
                if bits & choice.flag == choice.flag {
                    Ok(Cow::Borrowed(&choice.on_set))
                } else {
                    Ok(Cow::Borrowed(&choice.otherwise))
                }
            }
            OptionKind::Choose(choice) => {
                let value = ctx.option_value(&choice.option)?;
                choice
                    .choices
                    .iter()
                    .find(|(key, _)| *key == value)
                    .map(|(_, rule)| rule)
                    .or(choice.default.as_ref())
                    .map(Cow::Borrowed)
                    .ok_or_else(|| RuleError::UncoveredChoice {
                        option: choice.option.to_string(),
                        value: value.to_string(),
                    })
            }
            OptionKind::Complex(choice) => {
                let names: Vec<&str> = choice.options.iter().map(AsRef::as_ref).collect();
                let values = ctx.option_values(&names)?;
                match (choice.chooser)(&values)? {
                    ChoiceOutcome::Rule(rule) => Ok(Cow::Owned(rule)),
                    ChoiceOutcome::Branch(key) => choice.branches.get(&key).map(Cow::Borrowed).ok_or_else(|| {
                        RuleError::UnknownBranch {
                            label: choice.label.to_string(),
                            branch: key,
                        }
                    }),
                }
            }
        }
    }

    /// Options this rule reads.
    #[must_use]
    pub fn option_names(&self) -> Vec<&str> {
        match &self.kind {
            OptionKind::Simple(choice) => vec![&*choice.option],
            OptionKind::Bitwise(choice) => vec![&*choice.option],
            OptionKind::Choose(choice) => vec![&*choice.option],
            OptionKind::Complex(choice) => choice.options.iter().map(AsRef::as_ref).collect(),
        }
    }

    /// Every branch known without resolving.
    ///
    /// Rules a custom chooser builds on the fly are not included.
    #[must_use]
    pub fn branches(&self) -> Vec<&Rule> {
        match &self.kind {
            OptionKind::Simple(choice) => vec![&choice.on_match, &choice.otherwise],
            OptionKind::Bitwise(choice) => vec![&choice.on_set, &choice.otherwise],
            OptionKind::Choose(choice) => {
                choice.choices.iter().map(|(_, rule)| rule).chain(choice.default.as_ref()).collect()
            }
            OptionKind::Complex(choice) => choice.branches.values().collect(),
        }
    }
}

// ============================================================================
// SECTION: Display
// ============================================================================

impl fmt::Display for OptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OptionKind::Simple(choice) => write!(
                f,
                "Option {} == {} ? {} : {}",
                choice.option, choice.value, choice.on_match, choice.otherwise
            ),
            OptionKind::Bitwise(choice) => write!(
                f,
                "Option {} has flag {} ? {} : {}",
                choice.option, choice.flag, choice.on_set, choice.otherwise
            ),
            OptionKind::Choose(choice) => {
                write!(f, "Choose {} {{", choice.option)?;
                for (index, (value, rule)) in choice.choices.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value} => {rule}")?;
                }
                if let Some(default) = &choice.default {
                    if !choice.choices.is_empty() {
                        f.write_str(", ")?;
                    }
                    write!(f, "_ => {default}")?;
                }
                f.write_str("}")
            }
            OptionKind::Complex(choice) => {
                write!(f, "Choice {}(", choice.label)?;
                for (index, option) in choice.options.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(option)?;
                }
                f.write_str(")")
            }
        }
    }
}
