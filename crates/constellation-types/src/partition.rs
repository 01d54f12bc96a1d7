// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Cluster Partition Types
// ─────────────────────────────────────────────────────────────────────
//! Clusters and the partition produced by one clustering pass.
//!
//! A partition is recomputed from scratch on every pass and compared
//! structurally against the previous one. Member order is part of that
//! comparison, so it is preserved exactly as the builder accepted members.

use serde::{Deserialize, Serialize};

use crate::particle::{ParticleId, Point2};

/// Stable identity of a cluster across passes.
pub type ClusterId = u64;

/// Ordered member list of one cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub members: Vec<ParticleId>,
}

impl Cluster {
    pub fn new(members: Vec<ParticleId>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.members.contains(&id)
    }
}

impl From<Vec<ParticleId>> for Cluster {
    fn from(members: Vec<ParticleId>) -> Self {
        Self::new(members)
    }
}

/// Ordered clusters of one pass, with the centroid of each slot.
///
/// Centroids are carried for the host and for identity matching; they
/// do not take part in equality, which is defined on membership alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterPartition {
    pub clusters: Vec<Cluster>,
    pub centroids: Vec<Point2>,
}

impl ClusterPartition {
    pub fn new(clusters: Vec<Cluster>, centroids: Vec<Point2>) -> Self {
        Self {
            clusters,
            centroids,
        }
    }

    /// Build a partition from plain member lists, without centroids.
    pub fn from_members(members: Vec<Vec<ParticleId>>) -> Self {
        Self {
            clusters: members.into_iter().map(Cluster::new).collect(),
            centroids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    pub fn centroid(&self, index: usize) -> Option<Point2> {
        self.centroids.get(index).copied()
    }

    /// Whether `id` belongs to any cluster of this partition.
    pub fn contains(&self, id: ParticleId) -> bool {
        self.clusters.iter().any(|c| c.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }
}

impl PartialEq for ClusterPartition {
    fn eq(&self, other: &Self) -> bool {
        self.clusters == other.clusters
    }
}

impl Eq for ClusterPartition {}
