use crate::core::layout::{Layout, SiteIndex};
use crate::core::physics::potentials::screened_coulomb_potential;
use crate::core::physics::stability::StabilityEnvelope;
use crate::core::utils::math::binomial_coefficient;
use crate::engine::analysis::{assess_composition_member, assess_multiset};
use crate::engine::charge::{ChargeMultiset, ChargeState};
use crate::engine::cluster::{ClusterHierarchy, ClusterId, ClusterState, Composition};
use crate::engine::config::GroundStateSpaceConfig;
use crate::engine::hierarchy::build_cluster_hierarchy;
use crate::engine::projection::{BoundDirection, PotentialBounds, PotentialProjection};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace};

/// The outcome of a ground-state space run.
///
/// The hierarchy is returned with every cluster's pruned charge space in
/// place; downstream enumerative simulators descend from `top_cluster`
/// through the per-multiset composition lists to recover concrete charge
/// configurations. The pruning statistics compare the realized top-level
/// charge space against the unconstrained count of size-N three-state
/// multisets, `C(N + 2, 2)`.
#[derive(Debug)]
pub struct GroundStateSpaceResult {
    /// The full pruned cluster tree, owned by the result.
    pub hierarchy: ClusterHierarchy,
    /// Handle to the root cluster covering every site.
    pub top_cluster: ClusterId,
    /// Elapsed wall time of the run.
    pub runtime: Duration,
    /// How many of the possible top-level multisets were excluded.
    pub pruned_top_level_multisets: u64,
    /// The unconstrained top-level multiset count, `C(N + 2, 2)`.
    pub maximum_top_level_multisets: u64,
}

/// The number of distinct three-state charge multisets over `num_sites`
/// sites, `C(N + 2, 2) = (N + 1)(N + 2) / 2`.
pub fn maximum_top_level_multisets(num_sites: usize) -> u64 {
    binomial_coefficient(num_sites as u64 + 2, 2)
}

/// Runs the hierarchical ground-state space pruning on a layout.
///
/// The engine seeds singleton charge spaces from global extremal potential
/// bounds, then alternates a charge-space pruning loop (run to fixpoint)
/// with merge-up steps until the active clustering is the single root. The
/// call is infallible for validated parameters; an empty root charge space
/// is a legal outcome meaning no configuration is consistent with the
/// parameters under the engine's conservative bounds.
#[instrument(skip_all, name = "ground_state_space")]
pub fn run(layout: &Layout, config: &GroundStateSpaceConfig) -> GroundStateSpaceResult {
    let started = Instant::now();
    info!(num_sites = layout.num_sites(), "starting ground-state space construction");

    let mut engine = GroundStateSpace::initialize(layout, config);
    engine.prune_and_merge_to_root();

    let GroundStateSpace { hierarchy, .. } = engine;
    let top_cluster = hierarchy.root();
    let realized = hierarchy.cluster(top_cluster).charge_space.len() as u64;
    let maximum = maximum_top_level_multisets(layout.num_sites());
    let result = GroundStateSpaceResult {
        hierarchy,
        top_cluster,
        runtime: started.elapsed(),
        pruned_top_level_multisets: maximum - realized,
        maximum_top_level_multisets: maximum,
    };

    info!(
        realized,
        pruned = result.pruned_top_level_multisets,
        maximum = result.maximum_top_level_multisets,
        "ground-state space construction finished"
    );
    result
}

/// The engine state during a run: the cluster arena plus the active
/// clustering (the frontier), keyed by cluster uid so that every sweep over
/// it is deterministic.
struct GroundStateSpace<'a> {
    hierarchy: ClusterHierarchy,
    frontier: BTreeMap<u64, ClusterId>,
    envelope: StabilityEnvelope,
    config: &'a GroundStateSpaceConfig,
}

impl<'a> GroundStateSpace<'a> {
    /// Builds the hierarchy and seeds the singleton clusters: admissible
    /// charge states from the global extremal potential bounds, tagged
    /// projections onto every site, and the initial received-potential
    /// bounds as sums of the other singletons' extremal projections.
    #[instrument(skip_all, name = "engine_initialization")]
    fn initialize(layout: &Layout, config: &'a GroundStateSpaceConfig) -> Self {
        let params = &config.parameters;
        let envelope = StabilityEnvelope::new(params);
        let mut hierarchy = build_cluster_hierarchy(layout);

        let n = layout.num_sites();
        if n == 0 {
            // A site-less root holds exactly the empty multiset.
            let root = hierarchy.root();
            hierarchy
                .cluster_mut(root)
                .charge_space
                .insert(ChargeMultiset::EMPTY, Vec::new());
            let uid = hierarchy.cluster(root).uid;
            return Self {
                hierarchy,
                frontier: BTreeMap::from([(uid, root)]),
                envelope,
                config,
            };
        }

        let sites: Vec<SiteIndex> = layout.sites().collect();
        let potentials: Vec<Vec<f64>> = sites
            .par_iter()
            .map(|&i| {
                sites
                    .iter()
                    .map(|&j| screened_coulomb_potential(layout.distance(i, j), params))
                    .collect()
            })
            .collect();

        let mut leaves = vec![ClusterId::default(); n];
        for (id, cluster) in hierarchy.iter() {
            if cluster.is_leaf() {
                leaves[*cluster.sites.first().unwrap()] = id;
            }
        }

        let alphabet = ChargeState::alphabet(params.base);

        // Global extremal received potentials: every other site assumes the
        // most lowering (resp. raising) state of the alphabet.
        for &i in &sites {
            let mut lower = params.global_potential;
            let mut upper = params.global_potential;
            for &j in &sites {
                if i == j {
                    continue;
                }
                let v = potentials[i][j];
                lower += alphabet
                    .iter()
                    .map(|s| s.projected_potential(v))
                    .fold(f64::INFINITY, f64::min);
                upper += alphabet
                    .iter()
                    .map(|s| s.projected_potential(v))
                    .fold(f64::NEG_INFINITY, f64::max);
            }

            let leaf = hierarchy.cluster_mut(leaves[i]);
            for &state in alphabet {
                let admitted = match state {
                    ChargeState::Negative => !envelope.forbids_negative(lower),
                    ChargeState::Neutral => {
                        !envelope.upper_forbids_neutral(upper)
                            && !envelope.lower_forbids_neutral(lower)
                    }
                    ChargeState::Positive => !envelope.forbids_positive(upper),
                };
                if !admitted {
                    continue;
                }
                let multiset = ChargeMultiset::singleton(state);
                leaf.charge_space.insert(multiset, Vec::new());
                for &j in &sites {
                    leaf.add_projection(
                        j,
                        PotentialProjection::new(state.projected_potential(potentials[i][j]), multiset),
                    );
                }
            }
        }

        // Initial received bounds: the sum over all other singletons of
        // their extremal projections, plus the uniform external offset.
        for &i in &sites {
            for direction in BoundDirection::BOTH {
                let total: f64 = sites
                    .iter()
                    .filter(|&&j| j != i)
                    .map(|&j| {
                        hierarchy
                            .cluster(leaves[j])
                            .projection(i)
                            .extremal(direction)
                            .map_or(0.0, |p| p.volts)
                    })
                    .sum::<f64>()
                    + params.global_potential;
                hierarchy
                    .cluster_mut(leaves[i])
                    .set_received_bound(i, direction, total);
            }
        }

        let frontier = leaves
            .iter()
            .map(|&id| (hierarchy.cluster(id).uid, id))
            .collect();

        Self {
            hierarchy,
            frontier,
            envelope,
            config,
        }
    }

    /// The outer loop: prune the frontier charge spaces to fixpoint, then
    /// merge the smallest eligible parent, until only the root remains.
    fn prune_and_merge_to_root(&mut self) {
        loop {
            while !self.charge_space_pass(None) {}
            if self.frontier.len() == 1 {
                break;
            }
            self.merge_up();
        }
    }

    /// One pruning pass over the frontier. Returns `true` when the pass is
    /// a fixpoint, i.e. removed nothing.
    fn charge_space_pass(&mut self, skip: Option<ClusterId>) -> bool {
        let frontier: Vec<ClusterId> = self.frontier.values().copied().collect();
        let mut fixpoint = true;
        for id in frontier {
            if Some(id) == skip {
                continue;
            }
            fixpoint &= self.check_cluster(id);
        }
        fixpoint
    }

    /// Re-assesses every multiset in one cluster's charge space, removing
    /// the failing ones and propagating each removal through the projection
    /// stores. Returns `true` when nothing was removed.
    fn check_cluster(&mut self, id: ClusterId) -> bool {
        let cluster = self.hierarchy.cluster(id);
        // A one-entry space cannot shrink further without emptying the
        // search; it is re-examined only through later merges.
        if cluster.charge_space.len() == 1 {
            return true;
        }

        let candidates: Vec<ChargeMultiset> = cluster.charge_space.keys().copied().collect();
        let mut removed = Vec::new();
        for multiset in candidates {
            let survives = assess_multiset(
                self.hierarchy.cluster(id),
                multiset,
                &self.envelope,
                self.config.max_cluster_size_for_witness_partitioning,
            );
            if !survives {
                self.propagate_removal(id, multiset);
                removed.push(multiset);
            }
        }

        if removed.is_empty() {
            return true;
        }

        let cluster = self.hierarchy.cluster_mut(id);
        for multiset in &removed {
            cluster.charge_space.remove(multiset);
        }
        trace!(
            uid = self.hierarchy.cluster(id).uid,
            removed = removed.len(),
            remaining = self.hierarchy.cluster(id).charge_space.len(),
            "charge space entries pruned"
        );
        false
    }

    /// Withdraws a removed multiset from the source cluster's projections
    /// onto every other frontier cluster, adjusting the receivers' external
    /// potential bounds whenever the removed tag held an extremum.
    fn propagate_removal(&mut self, source: ClusterId, multiset: ChargeMultiset) {
        let receivers: Vec<(ClusterId, Vec<SiteIndex>)> = self
            .frontier
            .values()
            .filter(|&&c| c != source)
            .map(|&c| (c, self.hierarchy.cluster(c).sites.iter().copied().collect()))
            .collect();

        for (receiver, sites) in receivers {
            for site in sites {
                let store = self.hierarchy.cluster_mut(source).projection_mut(site);
                let extremals_before =
                    BoundDirection::BOTH.map(|direction| store.extremal(direction));
                store.remove_all(multiset);

                for (index, direction) in BoundDirection::BOTH.into_iter().enumerate() {
                    let Some(prior) = extremals_before[index] else {
                        continue;
                    };
                    if prior.source != multiset {
                        continue;
                    }
                    let Some(next) = self
                        .hierarchy
                        .cluster(source)
                        .projection(site)
                        .extremal(direction)
                    else {
                        continue;
                    };
                    self.hierarchy.cluster_mut(receiver).shift_received_bound(
                        site,
                        direction,
                        next.volts - prior.volts,
                    );
                }
            }
        }
    }

    /// One merge-up step: the frontier cluster pair whose parent covers the
    /// fewest sites is replaced by that parent, whose charge space is
    /// composed from the children's and whose projections are merged from
    /// theirs. A pruning pass over the rest of the frontier follows.
    fn merge_up(&mut self) {
        let parent = self.select_merge_parent();
        let children = self.hierarchy.cluster(parent).children.clone();

        for &child in &children {
            let uid = self.hierarchy.cluster(child).uid;
            self.frontier.remove(&uid);
        }

        self.isolate_children(parent, &children);
        self.compose_charge_space(parent, &children);
        self.merge_projections(parent, &children);
        self.record_internal_meets(parent);

        let merged = self.hierarchy.cluster(parent);
        debug!(
            uid = merged.uid,
            size = merged.size(),
            charge_space = merged.charge_space.len(),
            frontier = self.frontier.len() + 1,
            "merged cluster pair"
        );

        let uid = merged.uid;
        self.frontier.insert(uid, parent);

        // The parent was built from already-pruned children; only the rest
        // of the frontier needs a pass against its merged projections.
        self.charge_space_pass(Some(parent));
    }

    /// The parent to merge next: minimal in `(site count, uid)` over the
    /// parents of all frontier clusters. Both of its children are frontier
    /// members, since any incomplete subtree below it would offer a
    /// strictly smaller parent.
    fn select_merge_parent(&self) -> ClusterId {
        self.frontier
            .values()
            .map(|&c| {
                self.hierarchy
                    .cluster(c)
                    .parent
                    .expect("a multi-cluster frontier cannot contain the root")
            })
            .min_by_key(|&p| {
                let parent = self.hierarchy.cluster(p);
                (parent.size(), parent.uid)
            })
            .unwrap()
    }

    /// Rewrites each child's received bounds to exclude its sibling's
    /// projection, leaving what the pair receives from the rest of the
    /// frontier, and copies the result onto the parent's own sites.
    fn isolate_children(&mut self, parent: ClusterId, children: &[ClusterId]) {
        let mut isolated: Vec<(ClusterId, SiteIndex, BoundDirection, f64)> = Vec::new();

        for (index, &child) in children.iter().enumerate() {
            let sibling = children[1 - index];
            for &site in &self.hierarchy.cluster(child).sites {
                for direction in BoundDirection::BOTH {
                    let current = self.hierarchy.cluster(child).received_bounds(site).get(direction);
                    let sibling_share = self
                        .hierarchy
                        .cluster(sibling)
                        .projection(site)
                        .extremal(direction)
                        .map_or(0.0, |p| p.volts);
                    isolated.push((child, site, direction, current - sibling_share));
                }
            }
        }

        for (child, site, direction, value) in isolated {
            self.hierarchy
                .cluster_mut(child)
                .set_received_bound(site, direction, value);
            self.hierarchy
                .cluster_mut(parent)
                .set_received_bound(site, direction, value);
        }
    }

    /// Builds the parent's charge space as the verified Cartesian product
    /// of the children's charge spaces. Compositions that pass verification
    /// are grouped under their multiset sum.
    fn compose_charge_space(&mut self, parent: ClusterId, children: &[ClusterId]) {
        let left_multisets: Vec<ChargeMultiset> = self
            .hierarchy
            .cluster(children[0])
            .charge_space
            .keys()
            .copied()
            .collect();
        let right_multisets: Vec<ChargeMultiset> = self
            .hierarchy
            .cluster(children[1])
            .charge_space
            .keys()
            .copied()
            .collect();

        let mut space: BTreeMap<ChargeMultiset, Vec<Composition>> = BTreeMap::new();
        for (&left, &right) in left_multisets.iter().cartesian_product(&right_multisets) {
            let mut composition = vec![
                ClusterState::new(children[0], left),
                ClusterState::new(children[1], right),
            ];
            if self.verify_composition(&mut composition) {
                space.entry(left + right).or_default().push(composition);
            }
        }

        self.hierarchy.cluster_mut(parent).charge_space = space;
    }

    /// Verifies one candidate composition: computes each member's
    /// intra-composition potential window at its internal sites (summing
    /// the tagged extremal projections of every member, including its own
    /// self-projection), then re-runs the bound analysis on each member
    /// with those windows in place of its self-projection. The windows are
    /// retained on the composition for the internal-meet bookkeeping.
    fn verify_composition(&self, composition: &mut Composition) -> bool {
        for index in 0..composition.len() {
            let member_sites: Vec<SiteIndex> = self
                .hierarchy
                .cluster(composition[index].cluster)
                .sites
                .iter()
                .copied()
                .collect();

            let mut windows = BTreeMap::new();
            for site in member_sites {
                let mut window = PotentialBounds::default();
                for direction in BoundDirection::BOTH {
                    let total: f64 = composition
                        .iter()
                        .map(|member| {
                            self.hierarchy
                                .cluster(member.cluster)
                                .projection(site)
                                .extremal_for(member.multiset, direction)
                                .unwrap()
                                .volts
                        })
                        .sum();
                    window.set(direction, total);
                }
                windows.insert(site, window);
            }
            composition[index].intra_bounds = windows;
        }

        composition.iter().all(|member| {
            assess_composition_member(
                self.hierarchy.cluster(member.cluster),
                member.multiset,
                &member.intra_bounds,
                &self.envelope,
                self.config.max_cluster_size_for_witness_partitioning,
            )
        })
    }

    /// Installs the merged cluster's projections onto every other frontier
    /// cluster: one summed projection per composition of every multiset,
    /// tagged with the multiset. Each receiver's external bounds shift by
    /// the difference between the parent's extremal projection and its
    /// children's, so the contribution now logically comes from the parent.
    fn merge_projections(&mut self, parent: ClusterId, children: &[ClusterId]) {
        let recipe: Vec<(ChargeMultiset, Vec<Vec<(ClusterId, ChargeMultiset)>>)> = self
            .hierarchy
            .cluster(parent)
            .charge_space
            .iter()
            .map(|(&multiset, compositions)| {
                (
                    multiset,
                    compositions
                        .iter()
                        .map(|c| c.iter().map(|s| (s.cluster, s.multiset)).collect())
                        .collect(),
                )
            })
            .collect();

        let receivers: Vec<(ClusterId, Vec<SiteIndex>)> = self
            .frontier
            .values()
            .map(|&c| (c, self.hierarchy.cluster(c).sites.iter().copied().collect()))
            .collect();

        for (receiver, sites) in receivers {
            for site in sites {
                let mut additions = Vec::new();
                for direction in BoundDirection::BOTH {
                    for (multiset, compositions) in &recipe {
                        for composition in compositions {
                            let volts: f64 = composition
                                .iter()
                                .map(|&(member, member_multiset)| {
                                    self.hierarchy
                                        .cluster(member)
                                        .projection(site)
                                        .extremal_for(member_multiset, direction)
                                        .unwrap()
                                        .volts
                                })
                                .sum();
                            additions.push(PotentialProjection::new(volts, *multiset));
                        }
                    }
                }

                let child_extremals = BoundDirection::BOTH.map(|direction| {
                    children
                        .iter()
                        .map(|&child| {
                            self.hierarchy
                                .cluster(child)
                                .projection(site)
                                .extremal(direction)
                                .map_or(0.0, |p| p.volts)
                        })
                        .sum::<f64>()
                });

                let merged = self.hierarchy.cluster_mut(parent);
                for addition in additions {
                    merged.add_projection(site, addition);
                }

                for (index, direction) in BoundDirection::BOTH.into_iter().enumerate() {
                    let Some(extremal) = self
                        .hierarchy
                        .cluster(parent)
                        .projection(site)
                        .extremal(direction)
                    else {
                        continue;
                    };
                    self.hierarchy.cluster_mut(receiver).shift_received_bound(
                        site,
                        direction,
                        extremal.volts - child_extremals[index],
                    );
                }
            }
        }
    }

    /// Records the merged cluster's self-projections at its internal sites:
    /// for each multiset, the meet over its compositions of the
    /// intra-composition windows (minimum for the lower direction, maximum
    /// for the upper), stored as two tagged projections per site.
    fn record_internal_meets(&mut self, parent: ClusterId) {
        let cluster = self.hierarchy.cluster(parent);
        let mut meets: Vec<(SiteIndex, PotentialProjection)> = Vec::new();

        for (&multiset, compositions) in &cluster.charge_space {
            for &site in &cluster.sites {
                let mut lower = BoundDirection::Lower.top();
                let mut upper = BoundDirection::Upper.top();
                for composition in compositions {
                    for member in composition {
                        if let Some(window) = member.intra_bounds.get(&site) {
                            lower = BoundDirection::Lower.meet(lower, window.lower);
                            upper = BoundDirection::Upper.meet(upper, window.upper);
                        }
                    }
                }
                meets.push((site, PotentialProjection::new(lower, multiset)));
                meets.push((site, PotentialProjection::new(upper, multiset)));
            }
        }

        let cluster = self.hierarchy.cluster_mut(parent);
        for (site, projection) in meets {
            cluster.add_projection(site, projection);
        }
    }
}
