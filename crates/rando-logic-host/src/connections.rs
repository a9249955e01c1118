// crates/rando-logic-host/src/connections.rs
// ============================================================================
// Module: Indirect Connections
// Description: Collect the regions a rule can ask the host to reach.
// Purpose: Let entrance rules register indirect conditions automatically.
// Dependencies: rando-logic
// ============================================================================

//! ## Overview
//! An entrance whose rule reaches a region elsewhere in the graph must be
//! revisited once that region opens up. [`region_references`] walks a rule
//! through every combinator, every option branch (the branch taken is only
//! known per evaluation), and every registry reference, and returns the
//! region leaves it finds.

use std::collections::BTreeSet;

use rando_logic::PlayerId;
use rando_logic::Rule;
use rando_logic::RuleResult;
use rando_logic::SpotKind;

// ============================================================================
// SECTION: Region References
// ============================================================================

/// A region reached by some rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionRef {
    /// Region name.
    pub region: String,
    /// Owning player.
    pub player: PlayerId,
}

/// Returns every region `rule` may test reachability of, sorted.
///
/// Location and entrance leaves are not included; the host resolves those
/// through their parent regions.
///
/// # Errors
///
/// Returns [`rando_logic::RuleError::UndefinedRule`] or
/// [`rando_logic::RuleError::RegistryDropped`] when a registry reference
/// cannot be followed.
pub fn region_references(rule: &Rule) -> RuleResult<BTreeSet<RegionRef>> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    collect(rule, &mut found, &mut visited)?;
    Ok(found)
}

/// Walks `rule`, following each registry name once.
fn collect(rule: &Rule, found: &mut BTreeSet<RegionRef>, visited: &mut BTreeSet<String>) -> RuleResult<()> {
    match rule {
        Rule::Reach(reach) if reach.kind() == SpotKind::Region => {
            found.insert(RegionRef {
                region: reach.spot().to_string(),
                player: reach.player(),
            });
            Ok(())
        }
        Rule::And(_) | Rule::Or(_) | Rule::Count(_) => {
            rule.children().into_iter().try_for_each(|child| collect(child, found, visited))
        }
        Rule::Option(option) => option.branches().into_iter().try_for_each(|branch| collect(branch, found, visited)),
        Rule::Has(has) => {
            if !visited.insert(has.name().to_string()) {
                return Ok(());
            }
            has.with_target(|target| collect(target, found, visited))
        }
        Rule::True
        | Rule::False
        | Rule::Received(_)
        | Rule::TotalReceived(_)
        | Rule::HasProgressionPercent(_)
        | Rule::Reach(_) => Ok(()),
    }
}
