//! Bidirectional mapping between a dissimilarity threshold and the number of
//! above-threshold clusters it induces.

use super::{ClusterTree, NodeId};
use crate::error::{Error, Result};

/// Margin subtracted from a merge distance when inverting a cluster count, so
/// the resulting threshold sits strictly below that merge.
pub const CLUSTER_EPSILON: f64 = 0.001;

/// Counts the clusters at the given dissimilarity threshold.
///
/// A node is one cluster when its merge distance is at or below the threshold
/// or it is a leaf; otherwise its children are counted instead. The result is
/// a non-increasing step function of the threshold: 1 at `d_max`, and
/// `num_leaves` below `d_min`.
pub fn clusters_at_threshold(tree: &ClusterTree, threshold: f64) -> usize {
    count_below(tree, tree.root, threshold)
}

fn count_below(tree: &ClusterTree, node_id: NodeId, threshold: f64) -> usize {
    let node = &tree.nodes[node_id];
    if node.is_leaf() || node.distance.is_some_and(|d| d <= threshold) {
        return 1;
    }
    node.children
        .iter()
        .map(|&child| count_below(tree, child, threshold))
        .sum()
}

/// Inverts [`clusters_at_threshold`]: the threshold at which exactly `k`
/// clusters exist.
///
/// `k` is clamped to `[1, num_leaves]` before inversion; out-of-range
/// requests are recovered here, never propagated. For `k < 2` the root's own
/// merge distance is returned (the whole tree is one cluster). Otherwise the
/// `(k-1)`-th largest merge distance is the boundary below which `k` clusters
/// exist, and [`CLUSTER_EPSILON`] moves the threshold strictly below it,
/// floored at zero.
pub fn threshold_for_cluster_count(tree: &ClusterTree, k: usize) -> f64 {
    let k = match validate_cluster_count(tree, k) {
        Ok(k) => k,
        Err(err) => {
            let clamped = k.clamp(1, tree.num_leaves().max(1));
            log::debug!("{err}; clamping to {clamped}");
            clamped
        }
    };

    let root_distance = tree.root_node().distance.unwrap_or(0.0);
    if k < 2 {
        return root_distance;
    }

    let mut merges = tree.merge_distances();
    merges.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    // Fewer recorded merges than requested splits: only reachable on
    // non-binary trees; the tightest threshold we can offer is zero.
    match merges.get(k - 2) {
        Some(boundary) => (boundary - CLUSTER_EPSILON).max(0.0),
        None => 0.0,
    }
}

/// Checks a requested cluster count against `[1, num_leaves]`.
pub fn validate_cluster_count(tree: &ClusterTree, k: usize) -> Result<usize> {
    let num_leaves = tree.num_leaves().max(1);
    if k < 1 || k > num_leaves {
        return Err(Error::InvalidClusterCount {
            requested: k,
            num_leaves,
        });
    }
    Ok(k)
}

/// Checks a threshold against the tree's distance domain.
pub fn validate_threshold(tree: &ClusterTree, value: f64) -> Result<f64> {
    let Some((min, max)) = tree.distance_domain() else {
        return Ok(value);
    };
    if value < min || value > max || !value.is_finite() {
        return Err(Error::InvalidThreshold { value, min, max });
    }
    Ok(value)
}
