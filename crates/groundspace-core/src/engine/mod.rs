//! # Engine Module
//!
//! This module implements the stateful machinery of the ground-state space
//! engine: the cluster hierarchy, the tagged potential-projection stores,
//! and the bound-analysis algorithms that decide which charge multisets
//! survive pruning.
//!
//! ## Overview
//!
//! The engine maintains, for every cluster of sites, a *charge space* of
//! candidate charge multisets together with potential projections onto every
//! external site and aggregate received-potential bounds at every internal
//! site. The analysis submodules test candidate multisets against the
//! population stability envelope using these bounds; the driver in
//! [`crate::workflows`] orchestrates the fixpoint loop that removes failing
//! candidates and merges clusters up the hierarchy.
//!
//! ## Architecture
//!
//! - **Charge bookkeeping** ([`charge`]) - Site charge states and per-cluster
//!   charge multisets
//! - **Projections** ([`projection`]) - Ordered stores of tagged potential
//!   projections with extremal queries, and aggregate potential bounds
//! - **Hierarchy data model** ([`cluster`]) - The cluster arena, charge
//!   spaces, compositions, and the hierarchy handle
//! - **Hierarchy construction** ([`hierarchy`]) - Deterministic agglomerative
//!   clustering of the layout into a binary tree
//! - **Witness partitioning** ([`witness`]) - Exact feasibility search
//!   assigning witness sites to charge roles
//! - **Bound analysis** ([`analysis`]) - Multiset and composition assessment
//!   against the stability envelope
//! - **Configuration** ([`config`]) - Engine tuning knobs

pub mod analysis;
pub mod charge;
pub mod cluster;
pub mod config;
pub mod hierarchy;
pub mod projection;
pub mod witness;
