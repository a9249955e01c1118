// crates/rando-logic/src/spec_io.rs
// ============================================================================
// Module: Rule Spec File Loading
// Description: Size-limited loading of rule tables from disk.
// Purpose: Read authored RON (or tool-generated JSON) tables fail-closed.
// Dependencies: crate::{error, spec}
// ============================================================================

//! ## Overview
//! Files are checked against [`SpecLimits::max_file_bytes`] before they are
//! read, parsed by extension (`.json` as JSON, anything else as RON), and
//! validated before the table is returned.

use std::fs;
use std::path::Path;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::spec::RuleTable;
use crate::spec::SpecLimits;
use crate::spec::SpecValidator;

/// Loads and validates a rule table file.
///
/// # Errors
///
/// Returns [`RuleError::Spec`] when the file cannot be read, exceeds the size
/// limit, fails to parse, or fails validation.
pub fn load_table_from_file(path: &Path, limits: SpecLimits) -> RuleResult<RuleTable> {
    let metadata = fs::metadata(path)
        .map_err(|err| RuleError::spec(format!("cannot read {}: {err}", path.display())))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > limits.max_file_bytes {
        return Err(RuleError::spec(format!(
            "{} is {size} bytes (max {})",
            path.display(),
            limits.max_file_bytes
        )));
    }
    let source = fs::read_to_string(path)
        .map_err(|err| RuleError::spec(format!("cannot read {}: {err}", path.display())))?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let table = if is_json { RuleTable::from_json(&source)? } else { RuleTable::from_ron(&source)? };
    table.validate(&SpecValidator::new(limits))?;
    Ok(table)
}
