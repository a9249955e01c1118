// crates/rando-logic-host/src/lib.rs
// ============================================================================
// Module: Rando Logic Host Root
// Description: Attach finished rule trees to a host world graph.
// Purpose: The only place rules cross into the host's graph.
// Dependencies: crate::{adapter, connections, world}
// ============================================================================

//! ## Overview
//! A host implements [`WorldGraph`] for its region/location/entrance graph.
//! Content code attaches rules through a [`RuleAdapter`], which specializes
//! option rules for the world's context, simplifies, and registers the
//! regions an entrance rule depends on as indirect conditions so the host's
//! graph search knows when to revisit that entrance.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod connections;
pub mod world;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AdapterError;
pub use adapter::AdapterSettings;
pub use adapter::RuleAdapter;
pub use connections::RegionRef;
pub use connections::region_references;
pub use world::HostError;
pub use world::WorldGraph;
