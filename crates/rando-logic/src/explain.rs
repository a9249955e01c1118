// crates/rando-logic/src/explain.rs
// ============================================================================
// Module: Rule Explanations
// Description: Recursive, lazily evaluated trace of why a rule passed or failed.
// Purpose: Turn a failing access rule into a readable diagnostic tree.
// Dependencies: crate::{error, interfaces, leaf, rule}, serde, serde_json
// ============================================================================

//! ## Overview
//! [`Rule::explain`] wraps a rule, a state, and a context into an
//! [`Explanation`] node. The node's result and its children are computed on
//! first use and cached. Rendering prints one summary line per node and only
//! descends into children whose result differs from the expected outcome, so
//! a trace for a failed rule follows the failing branches.
//!
//! `Reach` nodes do not expand into the host's graph search. They expand into
//! the target's own access rule and the reachability of its parent region
//! (locations and entrances) or of its entrances (regions), as reported by
//! [`LogicState::spot_details`]. Each `Reach` target and each `Has` name is
//! expanded at most once per tree; later occurrences print
//! `[Already explained]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::cell::OnceCell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::error::RuleResult;
use crate::interfaces::LogicContext;
use crate::interfaces::LogicState;
use crate::interfaces::PlayerId;
use crate::interfaces::SpotKind;
use crate::rule::Rule;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Default maximum expansion depth.
pub const DEFAULT_EXPLAIN_DEPTH: usize = 32;

/// Rendering options for explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplainOptions {
    /// Nodes at this depth are never expanded.
    pub max_depth: usize,
    /// Append `[have/need]` to item-counting leaves.
    pub show_progress: bool,
}

impl Default for ExplainOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_EXPLAIN_DEPTH,
            show_progress: true,
        }
    }
}

// ============================================================================
// SECTION: Explanation Node
// ============================================================================

/// Identity of a node that should be expanded only once per tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ExploreKey {
    /// A reachability target.
    Spot(SpotKind, String, PlayerId),
    /// A registry name.
    Named(String),
}

/// Children of a node once computed.
enum Expansion<'a, S: ?Sized, C: ?Sized> {
    /// The node's key was expanded elsewhere in the tree.
    Repeated,
    /// Sub-explanations, failures first.
    Children(Vec<Explanation<'a, S, C>>),
}

/// One node of an explanation tree.
pub struct Explanation<'a, S: ?Sized, C: ?Sized> {
    /// Rule explained by this node.
    rule: Cow<'a, Rule>,
    /// Host state evaluated against.
    state: &'a S,
    /// Player context evaluated against.
    ctx: &'a C,
    /// Outcome the caller expected.
    expected: bool,
    /// Distance from the root.
    depth: usize,
    /// Rendering options shared by the tree.
    options: ExplainOptions,
    /// Keys already expanded anywhere in the tree.
    explored: Rc<RefCell<BTreeSet<ExploreKey>>>,
    /// Cached evaluation result.
    result: OnceCell<RuleResult<bool>>,
    /// Cached children.
    expansion: OnceCell<Expansion<'a, S, C>>,
}

impl Rule {
    /// Explains this rule with default options.
    ///
    /// `expected` is the outcome the caller hoped for; children that
    /// disagree with it are expanded.
    pub fn explain<'a, S, C>(&'a self, state: &'a S, ctx: &'a C, expected: bool) -> Explanation<'a, S, C>
    where
        S: LogicState + ?Sized,
        C: LogicContext + ?Sized,
    {
        Explanation::new(self, state, ctx, expected, ExplainOptions::default())
    }

    /// Explains this rule with explicit options.
    pub fn explain_with<'a, S, C>(
        &'a self,
        state: &'a S,
        ctx: &'a C,
        expected: bool,
        options: ExplainOptions,
    ) -> Explanation<'a, S, C>
    where
        S: LogicState + ?Sized,
        C: LogicContext + ?Sized,
    {
        Explanation::new(self, state, ctx, expected, options)
    }
}

impl<'a, S, C> Explanation<'a, S, C>
where
    S: LogicState + ?Sized,
    C: LogicContext + ?Sized,
{
    /// Creates a root node.
    pub fn new(rule: &'a Rule, state: &'a S, ctx: &'a C, expected: bool, options: ExplainOptions) -> Self {
        Self {
            rule: Cow::Borrowed(rule),
            state,
            ctx,
            expected,
            depth: 0,
            options,
            explored: Rc::default(),
            result: OnceCell::new(),
            expansion: OnceCell::new(),
        }
    }

    /// Creates a child node sharing this node's tree state.
    fn child(&self, rule: Cow<'a, Rule>) -> Self {
        Self {
            rule,
            state: self.state,
            ctx: self.ctx,
            expected: self.expected,
            depth: self.depth + 1,
            options: self.options,
            explored: Rc::clone(&self.explored),
            result: OnceCell::new(),
            expansion: OnceCell::new(),
        }
    }

    /// Rule explained by this node.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Outcome the caller expected.
    #[must_use]
    pub const fn expected(&self) -> bool {
        self.expected
    }

    /// Evaluation result, computed once.
    pub fn result(&self) -> &RuleResult<bool> {
        self.result.get_or_init(|| self.rule.evaluate(self.state, self.ctx))
    }

    /// Returns true when the result is exactly the expected outcome.
    pub fn met_expectation(&self) -> bool {
        matches!(self.result(), Ok(result) if *result == self.expected)
    }

    /// Returns true when this node was asked to expand after its key had
    /// already been expanded elsewhere.
    pub fn already_explained(&self) -> bool {
        matches!(self.expansion.get(), Some(Expansion::Repeated))
    }

    /// Sub-explanations, failures first.
    pub fn children(&self) -> &[Self] {
        match self.expansion() {
            Expansion::Repeated => &[],
            Expansion::Children(children) => children,
        }
    }

    /// `(have, need)` for item-counting leaves.
    pub fn progress(&self) -> Option<(u32, u32)> {
        match self.rule.as_ref() {
            Rule::Received(leaf) => Some((leaf.held(self.state), leaf.count())),
            Rule::TotalReceived(leaf) => Some((leaf.held(self.state), leaf.count())),
            Rule::HasProgressionPercent(leaf) => {
                let total = self.state.progression_total(leaf.player());
                Some((self.state.progression_collected(leaf.player()), leaf.needed(total)))
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Expansion
    // ------------------------------------------------------------------------

    /// Computes children on first use.
    fn expansion(&self) -> &Expansion<'a, S, C> {
        self.expansion.get_or_init(|| {
            if self.depth >= self.options.max_depth {
                return Expansion::Children(Vec::new());
            }
            if let Some(key) = self.key() {
                if !self.explored.borrow_mut().insert(key) {
                    return Expansion::Repeated;
                }
            }
            let mut children: Vec<Self> =
                self.sub_rules().into_iter().map(|rule| self.child(rule)).collect();
            children.sort_by_key(|child| matches!(child.result(), Ok(true)));
            Expansion::Children(children)
        })
    }

    /// Key for nodes expanded at most once.
    fn key(&self) -> Option<ExploreKey> {
        match self.rule.as_ref() {
            Rule::Reach(leaf) => Some(ExploreKey::Spot(leaf.kind(), leaf.spot().to_string(), leaf.player())),
            Rule::Has(has) => Some(ExploreKey::Named(has.name().to_string())),
            _ => None,
        }
    }

    /// Rules this node expands into.
    fn sub_rules(&self) -> Vec<Cow<'a, Rule>> {
        match &self.rule {
            Cow::Borrowed(rule) => {
                let rule: &'a Rule = *rule;
                match rule {
                    Rule::Option(option) => option.choose_rule(self.ctx).map_or_else(|_| Vec::new(), |chosen| vec![chosen]),
                    Rule::And(_) | Rule::Or(_) | Rule::Count(_) => {
                        rule.children().into_iter().map(Cow::Borrowed).collect()
                    }
                    _ => self.synthesized(rule),
                }
            }
            Cow::Owned(rule) => match rule {
                Rule::Option(option) => option
                    .choose_rule(self.ctx)
                    .map_or_else(|_| Vec::new(), |chosen| vec![Cow::Owned(chosen.into_owned())]),
                Rule::And(_) | Rule::Or(_) | Rule::Count(_) => {
                    rule.children().into_iter().map(|child| Cow::Owned(child.clone())).collect()
                }
                _ => self.synthesized(rule),
            },
        }
    }

    /// Owned sub-rules for `Has` and `Reach` nodes.
    fn synthesized(&self, rule: &Rule) -> Vec<Cow<'a, Rule>> {
        match rule {
            Rule::Has(has) => {
                has.with_target(|target| Ok(target.clone())).map_or_else(|_| Vec::new(), |target| vec![Cow::Owned(target)])
            }
            Rule::Reach(leaf) => reach_sub_rules(self.state, leaf.spot(), leaf.kind(), leaf.player())
                .into_iter()
                .map(Cow::Owned)
                .collect(),
            _ => Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Summary line without indentation.
    fn summary(&self) -> String {
        let mut line = format!("{} -> ", self.rule);
        match self.result() {
            Ok(true) => line.push_str("True"),
            Ok(false) => line.push_str("False"),
            Err(error) => {
                line.push_str("error: ");
                line.push_str(&error.to_string());
            }
        }
        if self.options.show_progress {
            if let Some((have, need)) = self.progress() {
                line.push_str(&format!(" [{have}/{need}]"));
            }
        }
        if self.already_explained() {
            line.push_str(" [Already explained]");
        }
        line
    }

    /// Writes this node and, when `expand` is set, its children.
    fn render(&self, f: &mut fmt::Formatter<'_>, expand: bool) -> fmt::Result {
        let children = if expand { self.children() } else { &[] };
        writeln!(f, "{}{}", "  ".repeat(self.depth), self.summary())?;
        for child in children {
            child.render(f, !child.met_expectation())?;
        }
        Ok(())
    }

    /// Serializable snapshot following the rendering policy.
    pub fn report(&self) -> ExplanationReport {
        self.report_node(true)
    }

    /// Builds one report node.
    fn report_node(&self, expand: bool) -> ExplanationReport {
        let (result, error) = match self.result() {
            Ok(result) => (Some(*result), None),
            Err(error) => (None, Some(error.to_string())),
        };
        let children = if expand {
            self.children().iter().map(|child| child.report_node(!child.met_expectation())).collect()
        } else {
            Vec::new()
        };
        ExplanationReport {
            rule: self.rule.to_string(),
            result,
            error,
            progress: self.progress().filter(|_| self.options.show_progress),
            already_explained: self.already_explained(),
            children,
        }
    }
}

impl<S, C> fmt::Display for Explanation<'_, S, C>
where
    S: LogicState + ?Sized,
    C: LogicContext + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

impl<S, C> fmt::Debug for Explanation<'_, S, C>
where
    S: LogicState + ?Sized,
    C: LogicContext + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Explanation")
            .field("rule", &self.rule)
            .field("expected", &self.expected)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// Rules a `Reach` expands into, from the host's graph facts.
fn reach_sub_rules<S>(state: &S, spot: &str, kind: SpotKind, player: PlayerId) -> Vec<Rule>
where
    S: LogicState + ?Sized,
{
    // Spots the host cannot describe stay opaque; the node line already shows the error.
    let Ok(Some(details)) = state.spot_details(spot, kind, player) else {
        return Vec::new();
    };
    match kind {
        SpotKind::Location | SpotKind::Entrance => {
            let mut rules = vec![details.access_rule.unwrap_or(Rule::True)];
            if let Some(parent) = details.parent_region {
                rules.push(Rule::reach(&parent, SpotKind::Region, player));
            }
            rules
        }
        SpotKind::Region => {
            let entrances: Vec<Rule> = details
                .entrances
                .iter()
                .map(|entrance| Rule::reach(entrance, SpotKind::Entrance, player))
                .collect();
            match entrances.len() {
                0 => Vec::new(),
                1 => entrances,
                _ => Rule::or(entrances).map_or_else(|_| Vec::new(), |rule| vec![rule]),
            }
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Serializable explanation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationReport {
    /// Rendered rule.
    pub rule: String,
    /// Evaluation result, absent when evaluation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    /// Evaluation error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `(have, need)` for item-counting leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<(u32, u32)>,
    /// The node's key was expanded elsewhere.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_explained: bool,
    /// Expanded children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExplanationReport>,
}

impl ExplanationReport {
    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
