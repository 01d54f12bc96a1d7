// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Trigger Rendezvous
// ─────────────────────────────────────────────────────────────────────
//! Two-flag join between "clusters changed" and "a category arrived".
//!
//! A cluster update waits for the next category assignment. A category
//! assignment that finds no pending update is dropped, not queued.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    ClusterUpdated,
    CategoryAssigned,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rendezvous {
    cluster_updated: bool,
    category_assigned: bool,
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `trigger`. Returns `true` when both flags are now set, in
    /// which case both are cleared.
    pub fn signal(&mut self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::ClusterUpdated => self.cluster_updated = true,
            Trigger::CategoryAssigned => self.category_assigned = true,
        }

        if self.cluster_updated && self.category_assigned {
            self.cluster_updated = false;
            self.category_assigned = false;
            return true;
        }

        self.category_assigned = false;
        false
    }

    /// Whether a cluster update is waiting for a category assignment.
    pub fn is_pending(&self) -> bool {
        self.cluster_updated
    }
}
