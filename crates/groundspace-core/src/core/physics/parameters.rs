use super::constants::ONSITE_CHARGING_ENERGY;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParameterError {
    #[error("relative permittivity must be positive, got {0}")]
    NonPositivePermittivity(f64),

    #[error("Thomas-Fermi screening distance must be positive, got {0} nm")]
    NonPositiveScreeningDistance(f64),
}

/// The charge-state alphabet available to each site.
///
/// In the three-state simulation base every site may be negative, neutral,
/// or positive; the two-state base omits the positive charge state, which is
/// energetically inaccessible for many layouts and halves the branching
/// factor of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulationBase {
    Two,
    #[default]
    Three,
}

/// Physical parameters of an SiDB simulation.
///
/// These describe the substrate and the energetic position of the dangling
/// bond charge-transition levels. The defaults correspond to the commonly
/// used experimental conditions for hydrogen-passivated silicon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Relative permittivity of the substrate (dimensionless, > 0).
    pub epsilon_r: f64,
    /// Thomas-Fermi screening distance in nanometers (> 0).
    pub lambda_tf: f64,
    /// The (0/−) charge-transition level relative to the Fermi level, in eV.
    pub mu_minus: f64,
    /// The charge-state alphabet.
    pub base: SimulationBase,
    /// Uniform external potential applied to every site, in volts.
    pub global_potential: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            epsilon_r: 5.6,
            lambda_tf: 5.0,
            mu_minus: -0.32,
            base: SimulationBase::Three,
            global_potential: 0.0,
        }
    }
}

impl SimulationParameters {
    /// The (+/0) charge-transition level, `μ⁺ = μ⁻ − U`, in eV.
    ///
    /// The on-site charging energy `U` is fixed by the physical model; see
    /// [`ONSITE_CHARGING_ENERGY`].
    pub fn mu_plus(&self) -> f64 {
        self.mu_minus - ONSITE_CHARGING_ENERGY
    }

    /// Validates the parameter preconditions.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if the permittivity or the screening
    /// distance is not strictly positive. Callers are expected to validate
    /// before handing the parameters to the engine; the engine itself
    /// assumes valid inputs.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.epsilon_r <= 0.0 {
            return Err(ParameterError::NonPositivePermittivity(self.epsilon_r));
        }
        if self.lambda_tf <= 0.0 {
            return Err(ParameterError::NonPositiveScreeningDistance(self.lambda_tf));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_describe_hydrogen_passivated_silicon() {
        let params = SimulationParameters::default();
        assert_eq!(params.epsilon_r, 5.6);
        assert_eq!(params.lambda_tf, 5.0);
        assert_eq!(params.mu_minus, -0.32);
        assert_eq!(params.base, SimulationBase::Three);
        assert_eq!(params.global_potential, 0.0);
    }

    #[test]
    fn mu_plus_lies_one_charging_energy_below_mu_minus() {
        let params = SimulationParameters::default();
        assert!((params.mu_plus() - (-0.91)).abs() < 1e-12);
    }

    #[test]
    fn default_parameters_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn non_positive_permittivity_is_rejected() {
        let params = SimulationParameters {
            epsilon_r: 0.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::NonPositivePermittivity(0.0))
        );
    }

    #[test]
    fn non_positive_screening_distance_is_rejected() {
        let params = SimulationParameters {
            lambda_tf: -1.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::NonPositiveScreeningDistance(-1.0))
        );
    }
}
