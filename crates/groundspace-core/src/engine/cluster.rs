use super::charge::ChargeMultiset;
use super::projection::{BoundDirection, PotentialBounds, PotentialProjection, ProjectionOrder};
use crate::core::layout::SiteIndex;
use slotmap::{new_key_type, SlotMap};
use std::collections::{BTreeMap, BTreeSet};

new_key_type! {
    /// Handle to one cluster inside a [`ClusterHierarchy`] arena.
    pub struct ClusterId;
}

/// One child's contribution to a composition: the chosen child cluster, the
/// child multiset it assumes, and the intra-composition potential bounds
/// recorded at the child's internal sites during composition verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterState {
    pub cluster: ClusterId,
    pub multiset: ChargeMultiset,
    pub intra_bounds: BTreeMap<SiteIndex, PotentialBounds>,
}

impl ClusterState {
    pub fn new(cluster: ClusterId, multiset: ChargeMultiset) -> Self {
        Self {
            cluster,
            multiset,
            intra_bounds: BTreeMap::new(),
        }
    }
}

/// One way to realize a composite cluster's multiset: an ordered choice of
/// one multiset per child, in child order.
pub type Composition = Vec<ClusterState>;

/// A node of the cluster hierarchy.
///
/// Leaves own exactly one site; composite clusters own the union of their
/// two children's sites. Every cluster carries its charge space, its
/// potential projections onto each site of the layout, and the aggregate
/// external potential bounds received at each of its own sites.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Dense identifier: leaves take their site index, composites are
    /// numbered on from the site count in construction order.
    pub uid: u64,
    /// Weak back-reference to the owning composite, if any.
    pub parent: Option<ClusterId>,
    /// Empty for leaves, exactly two entries for composites.
    pub children: Vec<ClusterId>,
    /// The site indices covered by this cluster's subtree.
    pub sites: BTreeSet<SiteIndex>,
    /// Candidate charge multisets, each with the compositions that realize
    /// it. Leaves carry empty composition lists.
    pub charge_space: BTreeMap<ChargeMultiset, Vec<Composition>>,
    projections: Vec<ProjectionOrder>,
    received_bounds: Vec<PotentialBounds>,
}

impl Cluster {
    pub(crate) fn new(uid: u64, sites: BTreeSet<SiteIndex>, num_layout_sites: usize) -> Self {
        Self {
            uid,
            parent: None,
            children: Vec::new(),
            sites,
            charge_space: BTreeMap::new(),
            projections: vec![ProjectionOrder::new(); num_layout_sites],
            received_bounds: vec![PotentialBounds::default(); num_layout_sites],
        }
    }

    /// The number of sites covered by this cluster.
    pub fn size(&self) -> usize {
        self.sites.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The projection store of this cluster onto the given site.
    pub fn projection(&self, site: SiteIndex) -> &ProjectionOrder {
        &self.projections[site]
    }

    pub(crate) fn projection_mut(&mut self, site: SiteIndex) -> &mut ProjectionOrder {
        &mut self.projections[site]
    }

    pub(crate) fn add_projection(&mut self, site: SiteIndex, projection: PotentialProjection) {
        self.projections[site].add(projection);
    }

    /// The aggregate external potential bounds received at one of this
    /// cluster's own sites.
    pub fn received_bounds(&self, site: SiteIndex) -> PotentialBounds {
        self.received_bounds[site]
    }

    pub(crate) fn set_received_bound(
        &mut self,
        site: SiteIndex,
        direction: BoundDirection,
        value: f64,
    ) {
        self.received_bounds[site].set(direction, value);
    }

    pub(crate) fn shift_received_bound(
        &mut self,
        site: SiteIndex,
        direction: BoundDirection,
        delta: f64,
    ) {
        self.received_bounds[site].shift(direction, delta);
    }
}

/// The binary cluster hierarchy over a layout: an arena of [`Cluster`]
/// nodes addressed by [`ClusterId`].
///
/// Parents own their children structurally; back-references are plain ids
/// resolved through the arena, so the tree is cycle-free. Node ids are
/// allocated in construction order and never removed, which makes every
/// iteration over them deterministic.
#[derive(Debug, Clone)]
pub struct ClusterHierarchy {
    clusters: SlotMap<ClusterId, Cluster>,
    root: ClusterId,
    num_sites: usize,
}

impl ClusterHierarchy {
    pub(crate) fn new(num_sites: usize) -> Self {
        Self {
            clusters: SlotMap::with_capacity_and_key(2 * num_sites.max(1)),
            root: ClusterId::default(),
            num_sites,
        }
    }

    pub(crate) fn insert(&mut self, cluster: Cluster) -> ClusterId {
        self.clusters.insert(cluster)
    }

    pub(crate) fn set_root(&mut self, root: ClusterId) {
        self.root = root;
    }

    /// The root cluster covering every site.
    pub fn root(&self) -> ClusterId {
        self.root
    }

    /// The number of sites in the underlying layout.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// The number of clusters in the hierarchy.
    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id]
    }

    pub(crate) fn cluster_mut(&mut self, id: ClusterId) -> &mut Cluster {
        &mut self.clusters[id]
    }

    /// Iterates over all clusters in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &Cluster)> {
        self.clusters.iter()
    }
}
