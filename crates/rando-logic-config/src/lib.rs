// crates/rando-logic-config/src/lib.rs
// ============================================================================
// Module: Rando Logic Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for rando-logic.toml semantics.
// Dependencies: rando-logic, serde, toml
// ============================================================================

//! ## Overview
//! `rando-logic-config` defines the configuration model for loading rule
//! tables, rendering explanations, and attaching rules through the host
//! adapter. Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
