// crates/rando-logic-config/src/config.rs
// ============================================================================
// Module: Rando Logic Configuration
// Description: Configuration loading and validation for rule tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rando-logic, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file is a valid configuration.
//! Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rando_logic::ExplainOptions;
use rando_logic::RuleTable;
use rando_logic::SpecLimits;
use rando_logic::load_table_from_file;
use rando_logic::spec::DEFAULT_SPEC_CHILDREN;
use rando_logic::spec::DEFAULT_SPEC_DEPTH;
use rando_logic::spec::DEFAULT_SPEC_FILE_BYTES;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "rando-logic.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "RANDO_LOGIC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum explanation depth.
pub(crate) const MAX_EXPLAIN_DEPTH: usize = 256;
/// Maximum rule spec nesting depth.
pub(crate) const MAX_SPEC_DEPTH: usize = 128;
/// Maximum rule spec children per node.
pub(crate) const MAX_SPEC_CHILDREN: usize = 4096;
/// Maximum rule table file size in bytes.
pub(crate) const MAX_SPEC_FILE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum number of rule table files.
pub(crate) const MAX_SPEC_TABLES: usize = 64;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Rando logic configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogicConfig {
    /// Host adapter behavior.
    #[serde(default)]
    pub adapter: AdapterConfig,
    /// Explanation rendering.
    #[serde(default)]
    pub explain: ExplainConfig,
    /// Rule table loading.
    #[serde(default)]
    pub spec: SpecConfig,
}

impl LogicConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path` when given, else `RANDO_LOGIC_CONFIG`, else
    /// `rando-logic.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.explain.validate()?;
        self.spec.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Host adapter configuration.
#[allow(clippy::struct_excessive_bools, reason = "Config flags mirror user-facing toggles.")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdapterConfig {
    /// Resolve option rules for the world's context before attaching.
    #[serde(default = "default_true")]
    pub specialize_options: bool,
    /// Fold literals out of rules before attaching.
    #[serde(default = "default_true")]
    pub simplify_on_attach: bool,
    /// Register region references of entrance rules as indirect conditions.
    #[serde(default = "default_true")]
    pub register_indirect_connections: bool,
    /// Log an explanation when an access check fails with an error.
    #[serde(default = "default_true")]
    pub explain_failures: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            specialize_options: true,
            simplify_on_attach: true,
            register_indirect_connections: true,
            explain_failures: true,
        }
    }
}

// ============================================================================
// SECTION: Explanations
// ============================================================================

/// Explanation rendering configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExplainConfig {
    /// Nodes at this depth are never expanded.
    #[serde(default = "default_explain_depth")]
    pub max_depth: usize,
    /// Append `[have/need]` to item-counting leaves.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        let options = ExplainOptions::default();
        Self {
            max_depth: options.max_depth,
            show_progress: options.show_progress,
        }
    }
}

impl ExplainConfig {
    /// Validates explanation configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > MAX_EXPLAIN_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "explain.max_depth must be between 1 and {MAX_EXPLAIN_DEPTH}"
            )));
        }
        Ok(())
    }

    /// Rendering options for [`rando_logic::Rule::explain_with`].
    #[must_use]
    pub const fn options(&self) -> ExplainOptions {
        ExplainOptions {
            max_depth: self.max_depth,
            show_progress: self.show_progress,
        }
    }
}

// ============================================================================
// SECTION: Rule Specs
// ============================================================================

/// Rule table loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecConfig {
    /// Maximum spec nesting depth.
    #[serde(default = "default_spec_depth")]
    pub max_depth: usize,
    /// Maximum children of one spec node.
    #[serde(default = "default_spec_children")]
    pub max_children: usize,
    /// Maximum size of one table file in bytes.
    #[serde(default = "default_spec_file_bytes")]
    pub max_file_bytes: usize,
    /// Rule table files, loaded in order.
    #[serde(default)]
    pub tables: Vec<PathBuf>,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_SPEC_DEPTH,
            max_children: DEFAULT_SPEC_CHILDREN,
            max_file_bytes: DEFAULT_SPEC_FILE_BYTES,
            tables: Vec::new(),
        }
    }
}

impl SpecConfig {
    /// Validates rule table configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range("spec.max_depth", self.max_depth, MAX_SPEC_DEPTH)?;
        validate_range("spec.max_children", self.max_children, MAX_SPEC_CHILDREN)?;
        validate_range("spec.max_file_bytes", self.max_file_bytes, MAX_SPEC_FILE_BYTES)?;
        if self.tables.len() > MAX_SPEC_TABLES {
            return Err(ConfigError::Invalid(format!(
                "spec.tables exceeds max entries ({MAX_SPEC_TABLES})"
            )));
        }
        for table in &self.tables {
            validate_path_string("spec.tables", &table.to_string_lossy())?;
        }
        Ok(())
    }

    /// Shape limits for [`rando_logic::SpecValidator`].
    #[must_use]
    pub const fn limits(&self) -> SpecLimits {
        SpecLimits {
            max_depth: self.max_depth,
            max_children: self.max_children,
            max_file_bytes: self.max_file_bytes,
        }
    }

    /// Loads every configured table, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first table that fails to
    /// load or validate.
    pub fn load_tables(&self, base: &Path) -> Result<Vec<RuleTable>, ConfigError> {
        self.tables
            .iter()
            .map(|table| {
                let path = base.join(table);
                load_table_from_file(&path, self.limits()).map_err(|err| {
                    ConfigError::Invalid(format!("spec.tables {}: {err}", table.display()))
                })
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serde default for enabled flags.
const fn default_true() -> bool {
    true
}

/// Serde default for `explain.max_depth`.
const fn default_explain_depth() -> usize {
    rando_logic::explain::DEFAULT_EXPLAIN_DEPTH
}

/// Serde default for `spec.max_depth`.
const fn default_spec_depth() -> usize {
    DEFAULT_SPEC_DEPTH
}

/// Serde default for `spec.max_children`.
const fn default_spec_children() -> usize {
    DEFAULT_SPEC_CHILDREN
}

/// Serde default for `spec.max_file_bytes`.
const fn default_spec_file_bytes() -> usize {
    DEFAULT_SPEC_FILE_BYTES
}

/// Resolves the config path from an explicit argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that `value` lies in `1..=max`.
fn validate_range(field: &str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {max}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
