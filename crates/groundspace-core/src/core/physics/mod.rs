//! # Physics Module
//!
//! Physical constants, simulation parameters, and the pure functions that
//! describe the electrostatics of SiDB layouts.
//!
//! The submodules are consumed by every other component of the library:
//!
//! - [`constants`] - Fundamental constants in SI units plus the model
//!   constants of the SiDB charge-transition picture
//! - [`parameters`] - User-supplied simulation parameters with validation
//! - [`potentials`] - The Thomas-Fermi screened Coulomb potential kernel
//! - [`stability`] - The population stability envelope: the potential bands
//!   within which each charge state is admissible

pub mod constants;
pub mod parameters;
pub mod potentials;
pub mod stability;
