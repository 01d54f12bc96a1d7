// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Cluster Builder
// ─────────────────────────────────────────────────────────────────────
//! Proximity clustering with a centroid-stability constraint.
//!
//! Pipeline:
//!   1. Neighbour scan → candidate adjacency (points with at least
//!      `min_size - 1` neighbours)
//!   2. Breadth-first traversal from each unvisited candidate, ascending
//!   3. A dequeued node joins only if the centroid that would result keeps
//!      every member, the node included, within `radius`
//!   4. Clusters smaller than `min_size` are dropped
//!
//! Step 3 is stricter than transitive closure: a chain of pairwise-close
//! points stops growing once the joint centroid drifts too far. A node
//! that fails the check stays visited for the rest of the pass, so it
//! can neither seed nor join a later cluster in the same pass.

use std::collections::VecDeque;

use constellation_types::{
    Cluster, ClusterPartition, ClusterResult, KernelConfig, ParticleSnapshot, Point2,
};

use crate::index::SpatialIndex;

/// Mean position of `members`. Returns the origin for an empty set.
pub fn centroid(points: &[Point2], members: &[usize]) -> Point2 {
    if members.is_empty() {
        return Point2::ZERO;
    }
    let sum = members
        .iter()
        .fold(Point2::ZERO, |acc, &i| acc + points[i]);
    sum / members.len() as f64
}

/// Would adding `candidate` keep the cluster within `radius` of its
/// new centroid? `sum` is the running position sum of `members`.
fn admits(
    points: &[Point2],
    members: &[usize],
    sum: Point2,
    candidate: usize,
    radius: f64,
) -> bool {
    if members.is_empty() {
        return true;
    }
    let next = (sum + points[candidate]) / (members.len() + 1) as f64;
    members
        .iter()
        .chain(std::iter::once(&candidate))
        .all(|&i| points[i].distance(&next) <= radius)
}

/// Cluster `points` and return member indices per cluster.
///
/// Cluster order is seed order; member order is acceptance order.
/// Fewer than `min_size` points yields no clusters without scanning.
pub fn build_clusters(
    points: &[Point2],
    radius: f64,
    min_size: usize,
) -> ClusterResult<Vec<Vec<usize>>> {
    if points.len() < min_size {
        return Ok(Vec::new());
    }

    let index = SpatialIndex::new(points)?;
    let adjacency = index.candidate_adjacency(radius, min_size.saturating_sub(1));

    let n = points.len();
    let mut marked = vec![false; n];
    let mut clusters = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::with_capacity(n);

    for &seed in adjacency.keys() {
        if marked[seed] {
            continue;
        }

        let mut members: Vec<usize> = Vec::new();
        let mut sum = Point2::ZERO;
        marked[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            if !admits(points, &members, sum, current, radius) {
                continue;
            }
            members.push(current);
            sum = sum + points[current];

            // Non-candidates may join but never expand the traversal.
            if let Some(neighbors) = adjacency.get(&current) {
                for &j in neighbors {
                    if !marked[j] {
                        marked[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }

        if members.len() >= min_size {
            clusters.push(members);
        } else {
            log::debug!(
                "dropping cluster seeded at {seed}: {} < {min_size} members",
                members.len()
            );
        }
    }

    Ok(clusters)
}

/// Configured clustering pass over particle snapshots.
#[derive(Debug, Clone, Copy)]
pub struct ClusterBuilder {
    pub radius: f64,
    pub min_size: usize,
}

impl ClusterBuilder {
    pub fn new(radius: f64, min_size: usize) -> Self {
        Self { radius, min_size }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.cluster_radius, config.min_cluster_size)
    }

    /// Cluster a snapshot into a partition of particle ids.
    ///
    /// Snapshot order is the traversal order, so identical snapshots give
    /// identical partitions.
    pub fn build_partition(&self, snapshot: &[ParticleSnapshot]) -> ClusterResult<ClusterPartition> {
        let points: Vec<Point2> = snapshot.iter().map(|p| p.position).collect();
        let index_clusters = build_clusters(&points, self.radius, self.min_size)?;

        let mut clusters = Vec::with_capacity(index_clusters.len());
        let mut centroids = Vec::with_capacity(index_clusters.len());
        for members in &index_clusters {
            centroids.push(centroid(&points, members));
            clusters.push(Cluster::new(
                members.iter().map(|&i| snapshot[i].id).collect(),
            ));
        }

        log::debug!(
            "clustering pass: {} particles -> {} clusters",
            snapshot.len(),
            clusters.len()
        );
        Ok(ClusterPartition::new(clusters, centroids))
    }
}
