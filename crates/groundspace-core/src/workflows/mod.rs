//! # Workflows Module
//!
//! The public, user-facing layer of groundspace. Workflows tie the
//! stateless [`crate::core`] physics and the stateful [`crate::engine`]
//! machinery together into complete procedures.
//!
//! The single workflow offered today is [`ground_state_space`], the
//! hierarchical charge-space pruning run: it ingests a read-only layout,
//! builds the cluster hierarchy, and alternates bound-driven pruning with
//! upward merges until only the root cluster remains, returning the pruned
//! search tree for downstream enumerative simulators.

pub mod ground_state_space;
