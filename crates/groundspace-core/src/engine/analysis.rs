use super::charge::ChargeMultiset;
use super::cluster::Cluster;
use super::projection::{BoundDirection, PotentialBounds};
use super::witness::WitnessPartitioning;
use crate::core::layout::SiteIndex;
use crate::core::physics::stability::StabilityEnvelope;
use std::collections::BTreeMap;

/// Tests whether a candidate multiset of a frontier cluster can still
/// participate in a stable configuration.
///
/// The received-potential window at each internal site combines the
/// cluster's own tagged projection extremes for this multiset with the
/// aggregate bounds received from the rest of the frontier. A site enters a
/// witness set for every charge role the window does not refute; the
/// multiset survives if the witnesses cover the required charge counts
/// (and, for clusters up to `partition_limit` sites, if an exact witness
/// partition exists).
pub(crate) fn assess_multiset(
    cluster: &Cluster,
    multiset: ChargeMultiset,
    envelope: &StabilityEnvelope,
    partition_limit: usize,
) -> bool {
    assess_with(cluster, multiset, envelope, partition_limit, |site| {
        let received = cluster.received_bounds(site);
        let own = |direction| {
            cluster
                .projection(site)
                .extremal_for(multiset, direction)
                .unwrap()
                .volts
        };
        (
            own(BoundDirection::Lower) + received.lower,
            own(BoundDirection::Upper) + received.upper,
        )
    })
}

/// Tests one member of a candidate composition.
///
/// Identical to [`assess_multiset`] except that the member's self-received
/// potential window is taken from the intra-composition bounds computed for
/// this composition rather than from the member's own projection store.
pub(crate) fn assess_composition_member(
    cluster: &Cluster,
    multiset: ChargeMultiset,
    intra_bounds: &BTreeMap<SiteIndex, PotentialBounds>,
    envelope: &StabilityEnvelope,
    partition_limit: usize,
) -> bool {
    assess_with(cluster, multiset, envelope, partition_limit, |site| {
        let received = cluster.received_bounds(site);
        let intra = intra_bounds[&site];
        (intra.lower + received.lower, intra.upper + received.upper)
    })
}

fn assess_with<F>(
    cluster: &Cluster,
    multiset: ChargeMultiset,
    envelope: &StabilityEnvelope,
    partition_limit: usize,
    received_window: F,
) -> bool
where
    F: Fn(SiteIndex) -> (f64, f64),
{
    let mut witnesses = WitnessPartitioning::new(multiset, cluster.size());

    for &site in &cluster.sites {
        let (lower, upper) = received_window(site);

        if witnesses.required_negative() > 0 && !envelope.forbids_negative(lower) {
            witnesses.add_negative_witness(site);
        }
        if witnesses.required_positive() > 0 && !envelope.forbids_positive(upper) {
            witnesses.add_positive_witness(site);
        }
        if witnesses.required_neutral() > 0
            && !envelope.upper_forbids_neutral(upper)
            && !envelope.lower_forbids_neutral(lower)
        {
            witnesses.add_neutral_witness(site);
        }
    }

    if !witnesses.counts_satisfied() {
        return false;
    }

    // Beyond the partition limit the exact search becomes too expensive;
    // the cardinality condition alone is still a sound filter.
    if cluster.size() > partition_limit {
        return true;
    }

    witnesses.omit_free_witnesses();
    witnesses.has_valid_partition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::parameters::SimulationParameters;
    use crate::engine::charge::ChargeState;
    use crate::engine::projection::PotentialProjection;
    use std::collections::BTreeSet;

    const PARTITION_LIMIT: usize = 6;

    fn envelope() -> StabilityEnvelope {
        StabilityEnvelope::new(&SimulationParameters::default())
    }

    /// A single-site cluster whose self-projection is zero for each
    /// admitted singleton state, as leaf initialization produces.
    fn leaf(received: PotentialBounds) -> Cluster {
        let mut cluster = Cluster::new(0, BTreeSet::from([0]), 1);
        for state in [
            ChargeState::Negative,
            ChargeState::Neutral,
            ChargeState::Positive,
        ] {
            let multiset = ChargeMultiset::singleton(state);
            cluster.add_projection(0, PotentialProjection::new(0.0, multiset));
            cluster.charge_space.insert(multiset, Vec::new());
        }
        cluster.set_received_bound(0, BoundDirection::Lower, received.lower);
        cluster.set_received_bound(0, BoundDirection::Upper, received.upper);
        cluster
    }

    #[test]
    fn an_isolated_site_must_be_negative_under_default_parameters() {
        let cluster = leaf(PotentialBounds::new(0.0, 0.0));
        let negative = ChargeMultiset::singleton(ChargeState::Negative);
        let neutral = ChargeMultiset::singleton(ChargeState::Neutral);
        let positive = ChargeMultiset::singleton(ChargeState::Positive);
        let envelope = envelope();

        assert!(assess_multiset(&cluster, negative, &envelope, PARTITION_LIMIT));
        assert!(!assess_multiset(&cluster, neutral, &envelope, PARTITION_LIMIT));
        assert!(!assess_multiset(&cluster, positive, &envelope, PARTITION_LIMIT));
    }

    #[test]
    fn a_wide_received_window_admits_every_state() {
        let cluster = leaf(PotentialBounds::new(-0.5, 1.2));
        let envelope = envelope();
        for state in [
            ChargeState::Negative,
            ChargeState::Neutral,
            ChargeState::Positive,
        ] {
            assert!(assess_multiset(
                &cluster,
                ChargeMultiset::singleton(state),
                &envelope,
                PARTITION_LIMIT
            ));
        }
    }

    #[test]
    fn composition_members_use_the_supplied_intra_bounds() {
        let cluster = leaf(PotentialBounds::new(0.0, 0.0));
        let neutral = ChargeMultiset::singleton(ChargeState::Neutral);
        let envelope = envelope();

        // With an intra-composition contribution inside the neutral band,
        // the neutral state becomes admissible even though the cluster's
        // own zero self-projection would refute it.
        let intra = BTreeMap::from([(0, PotentialBounds::new(0.5, 0.5))]);
        assert!(assess_composition_member(
            &cluster,
            neutral,
            &intra,
            &envelope,
            PARTITION_LIMIT
        ));

        let refuting = BTreeMap::from([(0, PotentialBounds::new(0.0, 0.0))]);
        assert!(!assess_composition_member(
            &cluster,
            neutral,
            &refuting,
            &envelope,
            PARTITION_LIMIT
        ));
    }
}
