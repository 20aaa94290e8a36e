/// The Coulomb constant 1/(4πε₀) in units of N·m²/C².
///
/// Together with [`ELEMENTARY_CHARGE`] this yields electrostatic potentials
/// in volts when distances are expressed in meters.
pub const COULOMB_CONSTANT: f64 = 8.987_552e9; // In N·m²/C²

/// The elementary charge in coulombs.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19; // In C

/// Additive tolerance applied to the population stability inequalities.
///
/// Charge-state admissibility is tested against the band edges widened by
/// this margin, so that configurations sitting numerically on a transition
/// level are not discarded by floating-point noise.
pub const POPULATION_STABILITY_TOLERANCE: f64 = 1e-6; // In eV

/// The intra-site charging energy separating the two charge-transition
/// levels of a dangling bond, `μ⁺ = μ⁻ − U`.
pub const ONSITE_CHARGING_ENERGY: f64 = 0.59; // In eV
