// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Cluster Engine
// ─────────────────────────────────────────────────────────────────────
//! Controller that owns every piece of cross-pass state.
//!
//! Two host triggers drive the engine:
//! - **positions updated**: rebuild the partition and diff it against
//!   the last changed one. A change is announced to the sink and parked
//!   until a category arrives.
//! - **category assigned**: if a change is parked, order its members and
//!   record its dominant category (cluster pass). Then order every
//!   cluster slot and every unclustered particle (global pass).

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use constellation_spatial::ClusterBuilder;
use constellation_types::{
    Category, ClusterId, ClusterPartition, ClusterResult, KernelConfig, Offset, ParticleId,
    ParticleSnapshot, Subject,
};

use crate::classify::classify;
use crate::diff::{ClusterDiffTracker, PartitionDiff};
use crate::history::ClusterHistory;
use crate::identity::ClusterIdentities;
use crate::placement::{dominant_category, offset_for, PairTable, PlacementBatch};
use crate::rendezvous::{Rendezvous, Trigger};
use crate::sources::{
    CategoryLookup, CategorySource, ClusterChange, ClusterPlacement, NoRegions,
    ParticlePlacement, PlacementSink, PositionSource, RegionLookup,
};
use crate::tally::tally;

/// Summary of one engine call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub particles: usize,
    pub clusters: usize,
    pub diff: PartitionDiff,
    pub cluster_ids: Vec<ClusterId>,
    /// Whether the rendezvous fired and a changed cluster was ordered.
    pub cluster_pass: bool,
    pub dominant: Option<Category>,
    pub particle_placements: usize,
    pub cluster_placements: usize,
}

/// Single-owner clustering and ordering engine.
pub struct ClusterEngine {
    config: KernelConfig,
    builder: ClusterBuilder,
    pairs: PairTable,
    tracker: ClusterDiffTracker,
    history: ClusterHistory,
    identities: ClusterIdentities,
    rendezvous: Rendezvous,
    pending: Option<ClusterChange>,
    snapshot: Vec<ParticleSnapshot>,
    current: ClusterPartition,
    current_ids: Vec<ClusterId>,
    regions: Box<dyn RegionLookup + Send + Sync>,
}

impl ClusterEngine {
    /// Create an engine with no region lookup.
    pub fn new(config: KernelConfig) -> ClusterResult<Self> {
        Self::with_regions(config, Box::new(NoRegions))
    }

    /// Create an engine that tags cluster placements with regions.
    pub fn with_regions(
        config: KernelConfig,
        regions: Box<dyn RegionLookup + Send + Sync>,
    ) -> ClusterResult<Self> {
        config.validate()?;
        Ok(Self {
            builder: ClusterBuilder::from_config(&config),
            pairs: PairTable::from_config(&config),
            config,
            tracker: ClusterDiffTracker::new(),
            history: ClusterHistory::new(),
            identities: ClusterIdentities::new(),
            rendezvous: Rendezvous::new(),
            pending: None,
            snapshot: Vec::new(),
            current: ClusterPartition::default(),
            current_ids: Vec::new(),
            regions,
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn history(&self) -> &ClusterHistory {
        &self.history
    }

    /// Partition of the last detected change.
    pub fn previous_partition(&self) -> &ClusterPartition {
        self.tracker.previous()
    }

    /// Partition of the latest positions update.
    pub fn current_partition(&self) -> &ClusterPartition {
        &self.current
    }

    pub fn current_ids(&self) -> &[ClusterId] {
        &self.current_ids
    }

    /// Change waiting for a category assignment.
    pub fn pending_change(&self) -> Option<&ClusterChange> {
        self.pending.as_ref()
    }

    /// Rebuild clusters from the latest positions.
    ///
    /// # Errors
    /// `ClusterError::Numerical` for a non-finite position; no state is
    /// touched in that case.
    pub fn on_positions_updated(
        &mut self,
        positions: &dyn PositionSource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<PassReport> {
        let snapshot = positions.current_positions();
        let partition = self.builder.build_partition(&snapshot)?;
        let ids = self
            .identities
            .assign(&partition.centroids, self.config.identity_threshold());
        let diff = self.tracker.observe(&partition);

        let report = PassReport {
            particles: snapshot.len(),
            clusters: partition.len(),
            diff,
            cluster_ids: ids.clone(),
            ..Default::default()
        };

        if let (true, Some(slot)) = (diff.changed, diff.changed_slot) {
            let change = ClusterChange {
                slot,
                cluster_id: ids.get(slot).copied(),
                members: partition
                    .slot(slot)
                    .map(|c| c.members.clone())
                    .unwrap_or_default(),
            };
            log::info!(
                "cluster slot {slot} changed ({} clusters, {} members)",
                partition.len(),
                change.members.len()
            );
            sink.cluster_changed(&change);
            self.pending = Some(change);
            self.rendezvous.signal(Trigger::ClusterUpdated);
        }

        self.snapshot = snapshot;
        self.current = partition;
        self.current_ids = ids;
        Ok(report)
    }

    /// React to a particle's category becoming known.
    ///
    /// Runs the cluster pass when a change is pending, then the global
    /// pass over the latest snapshot.
    pub fn on_category_assigned(
        &mut self,
        categories: &dyn CategorySource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<PassReport> {
        let mut report = PassReport {
            particles: self.snapshot.len(),
            clusters: self.current.len(),
            cluster_ids: self.current_ids.clone(),
            ..Default::default()
        };

        if self.rendezvous.signal(Trigger::CategoryAssigned) {
            if let Some(change) = self.pending.take() {
                let (placed, dominant) = self.cluster_pass(&change, categories, sink)?;
                report.cluster_pass = true;
                report.particle_placements += placed;
                report.dominant = dominant;
            }
        }

        let (particles, clusters) = self.global_pass(categories, sink)?;
        report.particle_placements += particles;
        report.cluster_placements = clusters;

        log::debug!(
            "category pass: cluster_pass={} particles={} clusters={}",
            report.cluster_pass,
            report.particle_placements,
            report.cluster_placements
        );
        Ok(report)
    }

    /// Order the members of one changed cluster and record its dominant
    /// category.
    fn cluster_pass(
        &mut self,
        change: &ClusterChange,
        categories: &dyn CategorySource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<(usize, Option<Category>)> {
        let counts = tally(&change.members, categories);
        let classification = classify(&counts);
        let dominant = dominant_category(&classification, &self.pairs);

        let mut targets = Vec::with_capacity(change.members.len());
        let mut offsets = Vec::with_capacity(change.members.len());
        for &id in &change.members {
            if let CategoryLookup::Assigned(category) = categories.category_of(id) {
                if let Some(offset) = offset_for(Subject::Particle, &classification, &category) {
                    targets.push(id);
                    offsets.push(offset);
                }
            }
        }

        let placed = self.apply_cluster_placement(
            change.slot,
            change.cluster_id,
            &targets,
            &offsets,
            dominant.clone(),
            sink,
        )?;
        Ok((placed, dominant))
    }

    /// Deliver member offsets for cluster `slot` and record its dominant
    /// category.
    ///
    /// Nothing is delivered or recorded unless `targets` and `offsets`
    /// line up.
    ///
    /// # Errors
    /// `ClusterError::PlacementMismatch` when the lengths differ.
    pub fn apply_cluster_placement(
        &mut self,
        slot: usize,
        cluster_id: Option<ClusterId>,
        targets: &[ParticleId],
        offsets: &[Offset],
        dominant: Option<Category>,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<usize> {
        let batch = PlacementBatch::zip(targets, offsets)?;
        let placements: Vec<ParticlePlacement> = batch
            .into_iter()
            .map(|(particle, offset)| ParticlePlacement { particle, offset })
            .collect();

        if !placements.is_empty() {
            sink.place_particles(&placements);
        }
        self.history.record(slot, dominant, cluster_id);
        Ok(placements.len())
    }

    /// Order every history slot and every unclustered particle by the
    /// category counts of the whole snapshot.
    fn global_pass(
        &self,
        categories: &dyn CategorySource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<(usize, usize)> {
        let all: Vec<ParticleId> = self.snapshot.iter().map(|p| p.id).collect();
        let classification = classify(&tally(&all, categories));
        if classification.is_empty() {
            return Ok((0, 0));
        }

        let previous = self.tracker.previous();

        let mut cluster_placements = Vec::new();
        for (slot, entry) in self.history.iter().enumerate() {
            let Some(offset) = offset_for(Subject::Cluster, &classification, &entry.dominant)
            else {
                continue;
            };
            let centroid = previous.centroid(slot);
            cluster_placements.push(ClusterPlacement {
                slot,
                cluster_id: entry.cluster_id,
                offset,
                centroid,
                region: centroid.and_then(|c| self.regions.region_for(c)),
            });
        }
        if !cluster_placements.is_empty() {
            sink.place_clusters(&cluster_placements);
        }

        let mut targets = Vec::new();
        let mut offsets = Vec::new();
        for &id in all.iter().filter(|&&id| !previous.contains(id)) {
            if let CategoryLookup::Assigned(category) = categories.category_of(id) {
                if let Some(offset) = offset_for(Subject::Unclustered, &classification, &category)
                {
                    targets.push(id);
                    offsets.push(offset);
                }
            }
        }
        let placements: Vec<ParticlePlacement> = PlacementBatch::zip(&targets, &offsets)?
            .into_iter()
            .map(|(particle, offset)| ParticlePlacement { particle, offset })
            .collect();
        if !placements.is_empty() {
            sink.place_particles(&placements);
        }

        Ok((placements.len(), cluster_placements.len()))
    }
}

/// Engine shared between host callbacks; one pass runs at a time.
#[derive(Clone)]
pub struct SharedClusterEngine {
    inner: Arc<Mutex<ClusterEngine>>,
}

impl SharedClusterEngine {
    pub fn new(engine: ClusterEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn on_positions_updated(
        &self,
        positions: &dyn PositionSource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<PassReport> {
        self.inner.lock().on_positions_updated(positions, sink)
    }

    pub fn on_category_assigned(
        &self,
        categories: &dyn CategorySource,
        sink: &mut dyn PlacementSink,
    ) -> ClusterResult<PassReport> {
        self.inner.lock().on_category_assigned(categories, sink)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut ClusterEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ExternalRegionLookup, ParticleRegistry, RecordingSink, RegionTag};
    use constellation_types::{ClusterError, Point2};

    fn config() -> KernelConfig {
        KernelConfig {
            cluster_radius: 10.0,
            ..Default::default()
        }
    }

    /// Three particles around (0, 0), three around (100, 0), one loner.
    fn registry() -> ParticleRegistry {
        let mut reg = ParticleRegistry::new();
        reg.upsert(1, 0.0, 0.0);
        reg.upsert(2, 1.0, 0.0);
        reg.upsert(3, 0.0, 1.0);
        reg.upsert(4, 100.0, 0.0);
        reg.upsert(5, 101.0, 0.0);
        reg.upsert(6, 100.0, 1.0);
        reg.upsert(7, 500.0, 500.0);
        reg
    }

    // ── Positions trigger ─────────────────────────────────────────

    #[test]
    fn test_first_update_announces_change() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let report = engine.on_positions_updated(&registry(), &mut sink).unwrap();

        assert_eq!(report.particles, 7);
        assert_eq!(report.clusters, 2);
        assert!(report.diff.changed);
        assert_eq!(report.diff.changed_slot, Some(1));
        assert_eq!(report.cluster_ids, vec![1, 2]);
        assert_eq!(sink.changes.len(), 1);
        assert_eq!(sink.changes[0].members, vec![4, 5, 6]);
        assert_eq!(sink.changes[0].cluster_id, Some(2));
        assert!(engine.pending_change().is_some());
    }

    #[test]
    fn test_unchanged_rebuild_is_silent() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let reg = registry();
        engine.on_positions_updated(&reg, &mut sink).unwrap();
        sink.clear();

        let report = engine.on_positions_updated(&reg, &mut sink).unwrap();
        assert!(!report.diff.changed);
        assert!(sink.changes.is_empty());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_non_finite_position_leaves_state() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = registry();
        engine.on_positions_updated(&reg, &mut sink).unwrap();

        reg.upsert(8, f64::NAN, 0.0);
        let err = engine.on_positions_updated(&reg, &mut sink).unwrap_err();
        assert!(matches!(err, ClusterError::Numerical(_)));
        assert_eq!(engine.previous_partition().len(), 2);
        assert_eq!(engine.current_partition().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = KernelConfig {
            cluster_radius: -1.0,
            ..Default::default()
        };
        assert!(ClusterEngine::new(cfg).is_err());
    }

    // ── Rendezvous ────────────────────────────────────────────────

    #[test]
    fn test_category_before_change_runs_global_only() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = registry();
        reg.assign(7, "Positive");

        let report = engine.on_category_assigned(&reg, &mut sink).unwrap();
        assert!(!report.cluster_pass);
        assert!(engine.history().is_empty());
        // Empty snapshot: nothing to order.
        assert!(sink.particles.is_empty());
    }

    #[test]
    fn test_cluster_pass_fires_once() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = registry();
        engine.on_positions_updated(&reg, &mut sink).unwrap();

        for id in [4, 5, 6] {
            reg.assign(id, "Neutral");
        }
        let first = engine.on_category_assigned(&reg, &mut sink).unwrap();
        assert!(first.cluster_pass);
        assert_eq!(first.dominant.as_deref(), Some("Neutral"));
        assert_eq!(engine.history().dominant(1), Some("Neutral"));
        assert!(engine.history().get(0).unwrap().is_placeholder());

        let second = engine.on_category_assigned(&reg, &mut sink).unwrap();
        assert!(!second.cluster_pass);
        assert!(engine.pending_change().is_none());
    }

    #[test]
    fn test_all_equal_members_neutral() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = registry();
        engine.on_positions_updated(&reg, &mut sink).unwrap();
        for id in [4, 5, 6] {
            reg.assign(id, "Positive");
        }
        engine.on_category_assigned(&reg, &mut sink).unwrap();
        for id in [4, 5, 6] {
            assert_eq!(sink.particle_offset(id), Some(Offset::Neutral));
        }
    }

    // ── Placement guards ──────────────────────────────────────────

    #[test]
    fn test_mismatch_leaves_state_untouched() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        engine.on_positions_updated(&registry(), &mut sink).unwrap();
        sink.clear();
        let before = engine.previous_partition().clone();

        let err = engine
            .apply_cluster_placement(
                0,
                Some(1),
                &[1, 2, 3],
                &[Offset::High, Offset::Low],
                Some("Positive".into()),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(err, ClusterError::PlacementMismatch { .. }));
        assert!(engine.history().is_empty());
        assert_eq!(engine.previous_partition(), &before);
        assert!(sink.particles.is_empty());
    }

    // ── Global pass ───────────────────────────────────────────────

    #[test]
    fn test_end_to_end_ordering() {
        let regions = ExternalRegionLookup::new(|p: Point2| {
            Some(RegionTag {
                region: if p.x < 50.0 { "West" } else { "East" }.to_string(),
                sub_region: None,
            })
        });
        let mut engine = ClusterEngine::with_regions(config(), Box::new(regions)).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = registry();

        // Positions arrive: slot 1 (4, 5, 6) is announced.
        engine.on_positions_updated(&reg, &mut sink).unwrap();
        reg.assign(4, "Negative");
        reg.assign(5, "Negative");
        reg.assign(6, "Positive");
        reg.assign(7, "Positive");
        let report = engine.on_category_assigned(&reg, &mut sink).unwrap();

        // Members: Positive ×1 (lower) → High, Negative ×2 → Neutral.
        assert!(report.cluster_pass);
        assert_eq!(sink.particle_offset(6), Some(Offset::High));
        assert_eq!(sink.particle_offset(4), Some(Offset::Neutral));
        assert_eq!(report.dominant.as_deref(), Some("Negative"));

        // Global: Negative ×2, Positive ×2 → tied, everything Neutral.
        assert_eq!(sink.cluster_offset(1), Some(Offset::Neutral));
        assert_eq!(sink.particle_offset(7), Some(Offset::Neutral));
        assert_eq!(report.cluster_placements, 1);
        let placed = sink.clusters.last().unwrap();
        assert_eq!(placed.region.as_ref().map(|r| r.region.as_str()), Some("East"));
        assert_eq!(placed.cluster_id, Some(2));

        // Loner moves into the first group; slot 0 grows and is announced.
        sink.clear();
        reg.upsert(7, 1.0, 1.0);
        reg.assign(1, "Neutral");
        reg.assign(2, "Neutral");
        reg.assign(3, "Neutral");
        let report = engine.on_positions_updated(&reg, &mut sink).unwrap();
        assert_eq!(report.diff.changed_slot, Some(0));
        assert_eq!(sink.changes[0].members.len(), 4);

        let report = engine.on_category_assigned(&reg, &mut sink).unwrap();
        assert!(report.cluster_pass);
        // Neutral ×3, Positive ×1 inside slot 0.
        assert_eq!(engine.history().dominant(0), Some("Neutral"));
        assert_eq!(sink.particle_offset(7), Some(Offset::High));
        // Global: Positive ×2, Negative ×2, Neutral ×3 → MinGroupTied.
        assert_eq!(sink.cluster_offset(0), Some(Offset::Neutral));
        assert_eq!(sink.cluster_offset(1), Some(Offset::Low));
    }

    #[test]
    fn test_unclustered_ordering() {
        let mut engine = ClusterEngine::new(config()).unwrap();
        let mut sink = RecordingSink::new();
        let mut reg = ParticleRegistry::new();
        // Three isolated particles: no clusters at all.
        reg.upsert(1, 0.0, 0.0);
        reg.upsert(2, 100.0, 0.0);
        reg.upsert(3, 200.0, 0.0);
        reg.upsert(4, 300.0, 0.0);
        engine.on_positions_updated(&reg, &mut sink).unwrap();

        reg.assign(1, "Negative");
        reg.assign(2, "Positive");
        reg.assign(3, "Positive");
        reg.assign(4, "Neutral");
        let report = engine.on_category_assigned(&reg, &mut sink).unwrap();
        assert!(!report.cluster_pass);
        assert_eq!(report.particle_placements, 4);
        // Negative ×1, Neutral ×1, Positive ×2 → MinGroupTied.
        assert_eq!(sink.particle_offset(1), Some(Offset::High));
        assert_eq!(sink.particle_offset(4), Some(Offset::High));
        assert_eq!(sink.particle_offset(2), Some(Offset::Neutral));
    }

    #[test]
    fn test_shared_engine_serializes_calls() {
        let shared = SharedClusterEngine::new(ClusterEngine::new(config()).unwrap());
        let mut sink = RecordingSink::new();
        let clone = shared.clone();
        clone.on_positions_updated(&registry(), &mut sink).unwrap();
        assert_eq!(shared.with(|e| e.current_partition().len()), 2);
    }

    #[test]
    fn test_report_serializes() {
        let report = PassReport {
            particles: 3,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"particles\":3"));
    }
}
