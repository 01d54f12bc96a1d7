// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Cluster History
// ─────────────────────────────────────────────────────────────────────
//! Dominant category per cluster slot, carried across passes.
//!
//! Slots are created on demand with an empty placeholder and are never
//! removed. A slot whose cluster has disappeared keeps its last value and
//! is still ordered by the global pass.

use serde::{Deserialize, Serialize};

use constellation_types::{Category, ClusterId};

/// Record of one cluster slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySlot {
    /// Empty until a dominant category has been derived for the slot.
    pub dominant: Category,
    pub cluster_id: Option<ClusterId>,
}

impl HistorySlot {
    pub fn is_placeholder(&self) -> bool {
        self.dominant.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterHistory {
    slots: Vec<HistorySlot>,
}

impl ClusterHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `slot`, growing the history with placeholders as needed.
    ///
    /// A `None` dominant category keeps the slot's previous value; a
    /// `None` id keeps the previous id.
    pub fn record(
        &mut self,
        slot: usize,
        dominant: Option<Category>,
        cluster_id: Option<ClusterId>,
    ) {
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, HistorySlot::default);
        }
        let entry = &mut self.slots[slot];
        if let Some(category) = dominant {
            entry.dominant = category;
        }
        if cluster_id.is_some() {
            entry.cluster_id = cluster_id;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&HistorySlot> {
        self.slots.get(slot)
    }

    /// Dominant category of `slot`, unless it is still a placeholder.
    pub fn dominant(&self, slot: usize) -> Option<&str> {
        self.slots
            .get(slot)
            .filter(|s| !s.is_placeholder())
            .map(|s| s.dominant.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySlot> {
        self.slots.iter()
    }
}
