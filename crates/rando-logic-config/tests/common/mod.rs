// crates/rando-logic-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for rando-logic-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use rando_logic_config::ConfigError;
use rando_logic_config::LogicConfig;

/// Result type shared by config suites.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `LogicConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<LogicConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Assert that a result is an error containing a specific substring.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
