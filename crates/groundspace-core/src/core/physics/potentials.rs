use super::constants::{COULOMB_CONSTANT, ELEMENTARY_CHARGE};
use super::parameters::SimulationParameters;

/// Calculates the chargeless screened Coulomb potential between two sites.
///
/// This function implements the Thomas-Fermi screened electrostatic
/// potential `V(d) = k·e / (ε_r·d) · exp(−d / λ_TF)` that a unit point
/// charge at one site produces at another site `d` nanometers away. The
/// result is the magnitude of the interaction; the sign contributed by a
/// particular charge state is applied by the caller.
///
/// # Arguments
///
/// * `distance_nm` - The distance between the two sites in nanometers.
/// * `params` - The simulation parameters supplying `ε_r` and `λ_TF`.
///
/// # Return
///
/// Returns the potential in volts. Two coincident sites (a site paired with
/// itself) yield zero, since a site does not act on itself.
#[inline]
pub fn screened_coulomb_potential(distance_nm: f64, params: &SimulationParameters) -> f64 {
    if distance_nm == 0.0 {
        return 0.0;
    }
    COULOMB_CONSTANT * ELEMENTARY_CHARGE / (params.epsilon_r * distance_nm * 1e-9)
        * (-distance_nm / params.lambda_tf).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn potential_at_zero_distance_is_zero() {
        let params = SimulationParameters::default();
        assert_eq!(screened_coulomb_potential(0.0, &params), 0.0);
    }

    #[test]
    fn unscreened_unit_potential_matches_coulombs_law() {
        let params = SimulationParameters {
            epsilon_r: 1.0,
            lambda_tf: 1e12,
            ..Default::default()
        };
        let expected = COULOMB_CONSTANT * ELEMENTARY_CHARGE / 1e-9;
        let potential = screened_coulomb_potential(1.0, &params);
        assert!((potential - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn potential_at_ten_nanometers_under_default_conditions() {
        let params = SimulationParameters::default();
        let expected = COULOMB_CONSTANT * ELEMENTARY_CHARGE / (5.6 * 10e-9) * (-2.0_f64).exp();
        assert!(f64_approx_equal(
            screened_coulomb_potential(10.0, &params),
            expected
        ));
    }

    #[test]
    fn potential_decays_monotonically_with_distance() {
        let params = SimulationParameters::default();
        let mut previous = f64::INFINITY;
        for step in 1..=20 {
            let potential = screened_coulomb_potential(0.5 * step as f64, &params);
            assert!(potential > 0.0);
            assert!(potential < previous);
            previous = potential;
        }
    }

    #[test]
    fn screening_attenuates_the_bare_interaction() {
        let screened = SimulationParameters::default();
        let unscreened = SimulationParameters {
            lambda_tf: 1e12,
            ..Default::default()
        };
        assert!(
            screened_coulomb_potential(5.0, &screened)
                < screened_coulomb_potential(5.0, &unscreened)
        );
    }
}
