// crates/rando-logic-host/tests/adapter.rs
// ============================================================================
// Module: Rule Adapter Tests
// Description: Attaching rules to a world graph and checking access.
// Purpose: Ensure rules are prepared once, combined with And, registered as
//          indirect conditions, and logged when checks fail.
// ============================================================================
//! ## Overview
//! Integration tests for [`RuleAdapter`] against an in-memory world graph.

#[path = "support/world.rs"]
mod mocks;
mod support;

use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use mocks::Inventory;
use mocks::MemoryWorld;
use mocks::Options;
use mocks::PLAYER;
use mocks::catalog;
use rando_logic::OptionRule;
use rando_logic::Rule;
use rando_logic::RuleError;
use rando_logic::RuleRegistry;
use rando_logic::SpotKind;
use rando_logic_config::LogicConfig;
use rando_logic_host::AdapterError;
use rando_logic_host::AdapterSettings;
use rando_logic_host::HostError;
use rando_logic_host::RuleAdapter;
use rando_logic_host::WorldGraph;
use support::TestResult;
use support::ensure;
use support::ensure_eq;

fn key() -> TestResult<Rule> {
    Ok(Rule::received(&catalog(), "Key", PLAYER, 1)?)
}

fn lamp() -> TestResult<Rule> {
    Ok(Rule::received(&catalog(), "Lamp", PLAYER, 1)?)
}

fn world() -> MemoryWorld {
    MemoryWorld::new()
        .with_region("Hall")
        .with_region("Tower")
        .with_region("Attic")
        .with_location("Chest")
        .with_entrance("Door")
}

// ========================================================================
// Log Capture
// ========================================================================

/// Log sink shared with the subscriber.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        self.0.lock().map(|bytes| String::from_utf8_lossy(&bytes).into_owned()).unwrap_or_default()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().map_err(|_| io::Error::other("log buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a debug-level subscriber and returns what it logged.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

// ========================================================================
// Locations
// ========================================================================

#[test]
fn test_set_location_rule_simplifies_before_attaching() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    adapter.set_location_rule("Chest", Rule::and([Rule::True, key()?])?)?;
    ensure_eq(&world.location_rule("Chest")?, &Some(key()?), "literal folded away")
}

#[test]
fn test_add_location_rule_ands_with_existing() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    adapter.add_location_rule("Chest", key()?)?;
    ensure_eq(&adapter.world().location_rule("Chest")?, &Some(key()?), "empty location takes the rule")?;
    adapter.add_location_rule("Chest", lamp()?)?;
    ensure_eq(&world.location_rule("Chest")?, &Some(Rule::and([key()?, lamp()?])?), "both required")
}

#[test]
fn test_unknown_location_is_host_error() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure_eq(
        &adapter.set_location_rule("Vault", key()?),
        &Err(AdapterError::Host(HostError::UnknownLocation("Vault".to_string()))),
        "missing location",
    )
}

// ========================================================================
// Option Specialization
// ========================================================================

#[test]
fn test_option_rules_specialized_for_context() -> TestResult {
    let mut world = world();
    let ctx = Options::new().with("hard", 1_i64);
    let rule = Rule::option(OptionRule::simple("hard", 1_i64, key()?, Rule::True));
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    adapter.set_location_rule("Chest", rule)?;
    ensure_eq(&world.location_rule("Chest")?, &Some(key()?), "hard branch attached")
}

#[test]
fn test_specialization_can_be_disabled() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let rule = Rule::option(OptionRule::simple("hard", 1_i64, key()?, Rule::True));
    let settings = AdapterSettings {
        specialize_options: false,
        ..AdapterSettings::default()
    };
    let mut adapter = RuleAdapter::new(&mut world, &ctx, settings);
    adapter.set_location_rule("Chest", rule.clone())?;
    ensure_eq(&world.location_rule("Chest")?, &Some(rule), "option kept for evaluation time")
}

#[test]
fn test_missing_option_fails_attach() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let rule = Rule::option(OptionRule::simple("hard", 1_i64, key()?, Rule::True));
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure_eq(
        &adapter.set_location_rule("Chest", rule),
        &Err(AdapterError::Rule(RuleError::UnknownOption {
            option: "hard".to_string(),
            player: PLAYER,
        })),
        "unresolvable option",
    )?;
    ensure_eq(&world.location_rule("Chest")?, &None, "nothing attached")
}

// ========================================================================
// Entrances And Indirect Conditions
// ========================================================================

#[test]
fn test_entrance_rule_registers_reached_regions() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut registry = RuleRegistry::new();
    let upper = registry.has("upper");
    registry.define(
        "upper",
        Rule::reach("Attic", SpotKind::Region, PLAYER) | Rule::reach("Chest", SpotKind::Location, PLAYER),
    )?;
    let rule = Rule::reach("Tower", SpotKind::Region, PLAYER) | (key()? & upper);

    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    adapter.set_entrance_rule("Door", rule)?;
    ensure_eq(
        &world.indirect(),
        &vec![
            ("Attic".to_string(), PLAYER, "Door".to_string()),
            ("Tower".to_string(), PLAYER, "Door".to_string()),
        ],
        "regions behind Has included, locations skipped",
    )?;
    ensure(world.entrance_rule("Door")?.is_some(), "rule attached")
}

#[test]
fn test_add_entrance_rule_registers_new_regions() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    adapter.set_entrance_rule("Door", key()?)?;
    adapter.add_entrance_rule("Door", Rule::reach("Hall", SpotKind::Region, PLAYER))?;
    ensure_eq(
        &world.entrance_rule("Door")?,
        &Some(Rule::and([key()?, Rule::reach("Hall", SpotKind::Region, PLAYER)])?),
        "both required",
    )?;
    ensure_eq(&world.indirect(), &vec![("Hall".to_string(), PLAYER, "Door".to_string())], "hall registered")
}

#[test]
fn test_indirect_registration_can_be_disabled() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let settings = AdapterSettings {
        register_indirect_connections: false,
        ..AdapterSettings::default()
    };
    let mut adapter = RuleAdapter::new(&mut world, &ctx, settings);
    adapter.set_entrance_rule("Door", Rule::reach("Tower", SpotKind::Region, PLAYER))?;
    ensure(world.indirect().is_empty(), "nothing registered")
}

#[test]
fn test_undefined_reference_blocks_entrance_attach() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut registry = RuleRegistry::new();
    let missing = registry.has("missing");
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure_eq(
        &adapter.set_entrance_rule("Door", missing),
        &Err(AdapterError::Rule(RuleError::UndefinedRule {
            name: "missing".to_string(),
        })),
        "undefined name",
    )?;
    ensure_eq(&world.entrance_rule("Door")?, &None, "nothing attached")
}

#[test]
fn test_unknown_region_is_host_error() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure_eq(
        &adapter.set_entrance_rule("Door", Rule::reach("Cellar", SpotKind::Region, PLAYER)),
        &Err(AdapterError::Host(HostError::UnknownRegion {
            region: "Cellar".to_string(),
            player: PLAYER,
        })),
        "region not in graph",
    )
}

#[test]
fn test_failed_region_check_registers_nothing() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let rule = Rule::reach("Attic", SpotKind::Region, PLAYER) | Rule::reach("Cellar", SpotKind::Region, PLAYER);
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure(adapter.set_entrance_rule("Door", rule).is_err(), "cellar is not in the graph")?;
    ensure_eq(&world.indirect(), &Vec::new(), "attic not registered either")?;
    ensure_eq(&world.entrance_rule("Door")?, &None, "nothing attached")
}

#[test]
fn test_unknown_entrance_registers_nothing() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    for result in [
        adapter.add_entrance_rule("Gate", Rule::reach("Tower", SpotKind::Region, PLAYER)),
        adapter.set_entrance_rule("Gate", Rule::reach("Tower", SpotKind::Region, PLAYER)),
    ] {
        ensure_eq(&result, &Err(AdapterError::Host(HostError::UnknownEntrance("Gate".to_string()))), "missing entrance")?;
    }
    ensure_eq(&world.indirect(), &Vec::new(), "tower not registered")
}

// ========================================================================
// Access Checks
// ========================================================================

#[test]
fn test_can_access_location() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    ensure(adapter.can_access_location("Chest", &Inventory::new())?, "no rule means open")?;
    adapter.set_location_rule("Chest", key()?)?;
    ensure(!adapter.can_access_location("Chest", &Inventory::new())?, "locked without key")?;
    ensure(adapter.can_access_location("Chest", &Inventory::new().with("Key"))?, "open with key")
}

#[test]
fn test_failed_check_logs_explanation() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    let rule = key()? & Rule::reach("Nowhere", SpotKind::Region, PLAYER);
    let state = Inventory::new().with("Key");

    let (result, logs) = capture_logs(|| adapter.check_access(&rule, &state));
    ensure_eq(
        &result,
        &Err(AdapterError::Rule(RuleError::UnknownSpot {
            kind: "region",
            spot: "Nowhere".to_string(),
        })),
        "error returned unchanged",
    )?;
    ensure(logs.contains("access rule failed to evaluate"), "failure logged")?;
    ensure(logs.contains("Nowhere"), "failing rule named")?;
    ensure(logs.contains("explanation="), "explanation attached")
}

#[test]
fn test_failed_check_without_explanation() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let settings = AdapterSettings {
        explain_failures: false,
        ..AdapterSettings::default()
    };
    let adapter = RuleAdapter::new(&mut world, &ctx, settings);
    let rule = Rule::reach("Nowhere", SpotKind::Region, PLAYER);

    let (result, logs) = capture_logs(|| adapter.check_access(&rule, &Inventory::new()));
    ensure(result.is_err(), "error returned")?;
    ensure(logs.contains("access rule failed to evaluate"), "failure logged")?;
    ensure(!logs.contains("explanation="), "no explanation")
}

#[test]
fn test_attach_logged_at_debug() -> TestResult {
    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, AdapterSettings::default());
    let rule = key()?;
    let (result, logs) = capture_logs(|| adapter.set_location_rule("Chest", rule));
    result?;
    ensure(logs.contains("set location rule"), "attach logged")?;
    ensure(logs.contains("Chest"), "location named")
}

// ========================================================================
// Settings
// ========================================================================

#[test]
fn test_settings_follow_config() -> TestResult {
    let config = LogicConfig::from_toml("[adapter]\nsimplify_on_attach = false\n\n[explain]\nmax_depth = 3\n")?;
    let settings = AdapterSettings::from(&config);
    ensure(!settings.simplify_on_attach, "simplification off")?;
    ensure(settings.specialize_options, "specialization default on")?;
    ensure_eq(&settings.explain.max_depth, &3, "explain depth")?;

    let mut world = world();
    let ctx = Options::new();
    let mut adapter = RuleAdapter::new(&mut world, &ctx, settings);
    ensure_eq(adapter.settings(), &settings, "settings kept")?;
    let rule = Rule::and([Rule::True, key()?])?;
    adapter.set_location_rule("Chest", rule.clone())?;
    ensure_eq(&world.location_rule("Chest")?, &Some(rule), "attached as written")
}
