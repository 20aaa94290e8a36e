use super::cluster::{Cluster, ClusterHierarchy, ClusterId};
use crate::core::layout::Layout;
use itertools::Itertools;
use std::collections::BTreeSet;
use tracing::debug;

/// Builds the binary cluster hierarchy of a layout by complete-linkage
/// agglomerative clustering on pairwise Euclidean distance.
///
/// Singleton clusters are seeded in site order, then the two active clusters
/// at minimum linkage distance are merged repeatedly until one remains.
/// Distance ties break on the lexicographically smallest pair of cluster
/// uids, so the produced tree is fully determined by the layout.
///
/// Leaves take their site index as uid; composites are numbered on from the
/// site count in merge order. An empty layout yields a single site-less
/// root so that downstream code never faces a missing hierarchy.
pub fn build_cluster_hierarchy(layout: &Layout) -> ClusterHierarchy {
    let n = layout.num_sites();
    let mut hierarchy = ClusterHierarchy::new(n);

    if n == 0 {
        let root = hierarchy.insert(Cluster::new(0, BTreeSet::new(), 0));
        hierarchy.set_root(root);
        return hierarchy;
    }

    // Active clusters under consideration for the next merge, alongside the
    // complete-linkage distance matrix between them.
    let mut active: Vec<ClusterId> = layout
        .sites()
        .map(|i| hierarchy.insert(Cluster::new(i as u64, BTreeSet::from([i]), n)))
        .collect();
    let mut linkage: Vec<Vec<f64>> = layout
        .sites()
        .map(|i| layout.sites().map(|j| layout.distance(i, j)).collect())
        .collect();

    let mut next_uid = n as u64;

    while active.len() > 1 {
        let (a, b) = active
            .iter()
            .enumerate()
            .tuple_combinations()
            .min_by(|&((i, &ca), (j, &cb)), &((k, &cc), (l, &cd))| {
                linkage[i][j]
                    .total_cmp(&linkage[k][l])
                    .then_with(|| {
                        (hierarchy.cluster(ca).uid, hierarchy.cluster(cb).uid)
                            .cmp(&(hierarchy.cluster(cc).uid, hierarchy.cluster(cd).uid))
                    })
            })
            .map(|((i, _), (j, _))| (i, j))
            .unwrap();

        let (left, right) = (active[a], active[b]);
        let sites: BTreeSet<_> = hierarchy
            .cluster(left)
            .sites
            .union(&hierarchy.cluster(right).sites)
            .copied()
            .collect();

        let mut parent = Cluster::new(next_uid, sites, n);
        parent.children = vec![left, right];
        let parent_id = hierarchy.insert(parent);
        hierarchy.cluster_mut(left).parent = Some(parent_id);
        hierarchy.cluster_mut(right).parent = Some(parent_id);
        next_uid += 1;

        // Lance-Williams update for complete linkage: the distance from the
        // merged cluster to any other is the max of its parts' distances.
        // The merged cluster replaces slot `a`; slot `b` is dropped.
        for k in 0..active.len() {
            linkage[a][k] = linkage[a][k].max(linkage[b][k]);
            linkage[k][a] = linkage[a][k];
        }
        linkage.swap_remove(b);
        for row in &mut linkage {
            row.swap_remove(b);
        }
        active[a] = parent_id;
        active.swap_remove(b);
    }

    hierarchy.set_root(active[0]);
    debug!(
        num_sites = n,
        num_clusters = hierarchy.num_clusters(),
        "cluster hierarchy constructed"
    );
    hierarchy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::Layout;

    #[test]
    fn empty_layout_produces_a_site_less_root() {
        let hierarchy = build_cluster_hierarchy(&Layout::default());
        let root = hierarchy.cluster(hierarchy.root());
        assert!(root.sites.is_empty());
        assert!(root.is_leaf());
        assert_eq!(hierarchy.num_clusters(), 1);
    }

    #[test]
    fn single_site_layout_has_a_leaf_root() {
        let layout = Layout::from_nm_positions([(0.0, 0.0)]);
        let hierarchy = build_cluster_hierarchy(&layout);
        let root = hierarchy.cluster(hierarchy.root());
        assert!(root.is_leaf());
        assert_eq!(root.sites, BTreeSet::from([0]));
        assert_eq!(root.uid, 0);
    }

    #[test]
    fn nearest_pairs_merge_before_distant_ones() {
        // Two tight pairs far from each other.
        let layout =
            Layout::from_nm_positions([(0.0, 0.0), (1.0, 0.0), (20.0, 0.0), (21.0, 0.0)]);
        let hierarchy = build_cluster_hierarchy(&layout);
        let root = hierarchy.cluster(hierarchy.root());
        assert_eq!(root.children.len(), 2);

        let child_sites: Vec<_> = root
            .children
            .iter()
            .map(|&c| hierarchy.cluster(c).sites.clone())
            .collect();
        assert!(child_sites.contains(&BTreeSet::from([0, 1])));
        assert!(child_sites.contains(&BTreeSet::from([2, 3])));
    }

    #[test]
    fn every_composite_covers_exactly_its_children() {
        let layout = Layout::from_nm_positions([(0.0, 0.0), (2.0, 0.0), (5.0, 1.0), (9.0, 3.0)]);
        let hierarchy = build_cluster_hierarchy(&layout);
        for (id, cluster) in hierarchy.iter() {
            if cluster.is_leaf() {
                assert_eq!(cluster.size(), 1);
                continue;
            }
            assert_eq!(cluster.children.len(), 2);
            let union: BTreeSet<_> = cluster
                .children
                .iter()
                .flat_map(|&c| hierarchy.cluster(c).sites.iter().copied())
                .collect();
            assert_eq!(union, cluster.sites);
            for &child in &cluster.children {
                assert_eq!(hierarchy.cluster(child).parent, Some(id));
            }
        }
    }

    #[test]
    fn construction_is_deterministic_across_runs() {
        let positions = [(0.0, 0.0), (0.4, 0.1), (3.0, 2.0), (2.9, 2.2), (7.0, 0.0)];
        let layout = Layout::from_nm_positions(positions);
        let first = build_cluster_hierarchy(&layout);
        let second = build_cluster_hierarchy(&layout);
        let shape = |h: &ClusterHierarchy| {
            let mut nodes: Vec<_> = h
                .iter()
                .map(|(_, c)| (c.uid, c.sites.clone(), c.children.len()))
                .collect();
            nodes.sort();
            nodes
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn uids_number_leaves_then_composites() {
        let layout = Layout::from_nm_positions([(0.0, 0.0), (1.0, 0.0), (5.0, 0.0)]);
        let hierarchy = build_cluster_hierarchy(&layout);
        let mut uids: Vec<_> = hierarchy.iter().map(|(_, c)| c.uid).collect();
        uids.sort();
        assert_eq!(uids, vec![0, 1, 2, 3, 4]);
        assert_eq!(hierarchy.cluster(hierarchy.root()).uid, 4);
    }
}
