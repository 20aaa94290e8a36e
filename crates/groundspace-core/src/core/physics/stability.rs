use super::constants::POPULATION_STABILITY_TOLERANCE;
use super::parameters::SimulationParameters;

/// The population stability envelope of a simulation.
///
/// The two charge-transition levels `μ⁻` and `μ⁺` divide the axis of
/// received electrostatic potential into three admissibility bands, widened
/// by [`POPULATION_STABILITY_TOLERANCE`] on each side:
///
/// - negative is admissible for `V ≤ ε − μ⁻`,
/// - neutral is admissible for `−ε − μ⁻ ≤ V ≤ ε − μ⁺`,
/// - positive is admissible for `V ≥ −ε − μ⁺`.
///
/// The four predicates below are phrased as *failure* tests on one-sided
/// potential bounds: each returns `true` only when even the most favorable
/// completion of the unknown surroundings cannot make the charge state
/// admissible, which is the soundness requirement of bound-driven pruning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityEnvelope {
    negative_upper: f64,
    neutral_lower: f64,
    neutral_upper: f64,
    positive_lower: f64,
}

impl StabilityEnvelope {
    /// Derives the four band edges from the simulation parameters.
    pub fn new(params: &SimulationParameters) -> Self {
        Self {
            negative_upper: POPULATION_STABILITY_TOLERANCE - params.mu_minus,
            neutral_lower: -POPULATION_STABILITY_TOLERANCE - params.mu_minus,
            neutral_upper: POPULATION_STABILITY_TOLERANCE - params.mu_plus(),
            positive_lower: -POPULATION_STABILITY_TOLERANCE - params.mu_plus(),
        }
    }

    /// A site cannot be negative when even its lowest achievable received
    /// potential exceeds the (0/−) transition band.
    #[inline]
    pub fn forbids_negative(&self, potential_lower_bound: f64) -> bool {
        potential_lower_bound > self.negative_upper
    }

    /// A site cannot be positive when even its highest achievable received
    /// potential stays below the (+/0) transition band.
    #[inline]
    pub fn forbids_positive(&self, potential_upper_bound: f64) -> bool {
        potential_upper_bound < self.positive_lower
    }

    /// A site cannot be neutral when its highest achievable received
    /// potential stays below the neutral band.
    #[inline]
    pub fn upper_forbids_neutral(&self, potential_upper_bound: f64) -> bool {
        potential_upper_bound < self.neutral_lower
    }

    /// A site cannot be neutral when its lowest achievable received
    /// potential exceeds the neutral band.
    #[inline]
    pub fn lower_forbids_neutral(&self, potential_lower_bound: f64) -> bool {
        potential_lower_bound > self.neutral_upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_envelope() -> StabilityEnvelope {
        StabilityEnvelope::new(&SimulationParameters::default())
    }

    #[test]
    fn band_edges_follow_the_transition_levels() {
        let envelope = default_envelope();
        assert!((envelope.negative_upper - 0.32).abs() < 1e-5);
        assert!((envelope.neutral_lower - 0.32).abs() < 1e-5);
        assert!((envelope.neutral_upper - 0.91).abs() < 1e-5);
        assert!((envelope.positive_lower - 0.91).abs() < 1e-5);
    }

    #[test]
    fn zero_potential_admits_only_the_negative_state() {
        let envelope = default_envelope();
        assert!(!envelope.forbids_negative(0.0));
        assert!(envelope.upper_forbids_neutral(0.0));
        assert!(envelope.forbids_positive(0.0));
    }

    #[test]
    fn mid_band_potential_admits_the_neutral_state() {
        let envelope = default_envelope();
        assert!(!envelope.upper_forbids_neutral(0.5));
        assert!(!envelope.lower_forbids_neutral(0.5));
        assert!(envelope.forbids_negative(0.5));
        assert!(envelope.forbids_positive(0.5));
    }

    #[test]
    fn high_potential_admits_only_the_positive_state() {
        let envelope = default_envelope();
        assert!(!envelope.forbids_positive(1.0));
        assert!(envelope.lower_forbids_neutral(1.0));
        assert!(envelope.forbids_negative(1.0));
    }

    #[test]
    fn tolerance_widens_every_band_edge() {
        let envelope = default_envelope();
        // Exactly on the (0/−) transition level, both negative and neutral
        // remain admissible.
        assert!(!envelope.forbids_negative(0.32));
        assert!(!envelope.upper_forbids_neutral(0.32));
    }
}
