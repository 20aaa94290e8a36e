use crate::core::physics::parameters::SimulationParameters;
use serde::{Deserialize, Serialize};

/// Tuning parameters of the ground-state space engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundStateSpaceConfig {
    /// Clusters up to this many sites run the exact witness-partitioning
    /// search during bound analysis; larger clusters are filtered on
    /// witness cardinality alone. Raising the limit prunes more at a
    /// super-exponential cost in analysis time.
    pub max_cluster_size_for_witness_partitioning: usize,
    /// The physical parameters of the simulation.
    pub parameters: SimulationParameters,
}

impl Default for GroundStateSpaceConfig {
    fn default() -> Self {
        Self {
            max_cluster_size_for_witness_partitioning: 6,
            parameters: SimulationParameters::default(),
        }
    }
}
