// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Cluster Diff Tracker
// ─────────────────────────────────────────────────────────────────────
//! Structural change detection between consecutive partitions.
//!
//! Equality is order-sensitive: same slot count, and every slot holds
//! the same members in the same order. The first difference names the
//! changed slot. When the slot counts differ, the changed slot is the
//! last index of the longer partition, which points at the cluster that
//! just appeared when the partition grows.

use serde::{Deserialize, Serialize};

use constellation_types::ClusterPartition;

/// Outcome of comparing two partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDiff {
    pub changed: bool,
    pub changed_slot: Option<usize>,
}

impl PartitionDiff {
    pub const UNCHANGED: PartitionDiff = PartitionDiff {
        changed: false,
        changed_slot: None,
    };

    fn at(slot: usize) -> Self {
        Self {
            changed: true,
            changed_slot: Some(slot),
        }
    }
}

/// Compare `previous` against `current`.
pub fn diff(previous: &ClusterPartition, current: &ClusterPartition) -> PartitionDiff {
    if previous.len() != current.len() {
        let longer = previous.len().max(current.len());
        return PartitionDiff::at(longer - 1);
    }

    for (slot, (old, new)) in previous.iter().zip(current.iter()).enumerate() {
        if old.members != new.members {
            return PartitionDiff::at(slot);
        }
    }

    PartitionDiff::UNCHANGED
}

/// Holds the partition of the last detected change.
#[derive(Debug, Clone, Default)]
pub struct ClusterDiffTracker {
    previous: ClusterPartition,
}

impl ClusterDiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` against the stored partition and store a copy
    /// of it when they differ.
    pub fn observe(&mut self, current: &ClusterPartition) -> PartitionDiff {
        let result = diff(&self.previous, current);
        if result.changed {
            self.previous = current.clone();
        }
        result
    }

    /// Partition of the last detected change.
    pub fn previous(&self) -> &ClusterPartition {
        &self.previous
    }
}
