//! # Groundspace Core Library
//!
//! A high-performance library for pruning the electrostatic ground-state
//! search space of silicon dangling bond (SiDB) layouts through hierarchical
//! bound propagation.
//!
//! Given a fixed arrangement of dangling bond sites and a set of physical
//! parameters, the engine partitions the sites into a binary hierarchy of
//! clusters and computes, for each cluster, the set of charge-count multisets
//! that could plausibly participate in a physically valid ground-state
//! configuration. Multisets that cannot satisfy the local population
//! stability inequalities under *any* completion of the remaining sites are
//! provably excluded. The output is a compact search tree whose top-level
//! charge space enumerates only candidate multisets; downstream enumerative
//! simulators expand this tree into individual charge configurations.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`Layout`, lattice geometry), pure physical functions (screened Coulomb
//!   potential, the population stability envelope), and math utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer holds the cluster
//!   hierarchy arena, the tagged potential-projection stores with extremal
//!   queries, and the bound-analysis algorithms (witness partitioning,
//!   multiset and composition assessment).
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine` and `core` together to execute the complete pruning
//!   procedure: the charge-space fixpoint loop alternating with hierarchical
//!   merges. It provides a simple and powerful entry point for end-users of
//!   the library.

pub mod core;
pub mod engine;
pub mod workflows;
