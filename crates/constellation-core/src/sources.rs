// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Host Collaborator Interfaces
// ─────────────────────────────────────────────────────────────────────
//! Traits the host implements to feed the kernel and receive placements.
//!
//! The in-memory implementations serve tests, benches, and hosts that
//! keep their particle registry on the Rust side. Closure adapters let a
//! host delegate a lookup without writing a trait impl.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use constellation_types::{Category, ClusterId, Offset, ParticleId, ParticleSnapshot, Point2};

/// Result of asking the host for a particle's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLookup {
    /// The id is unknown to the host registry.
    Missing,
    /// The particle exists but its category has not arrived yet.
    Unassigned,
    Assigned(Category),
}

/// Synchronous snapshot of particle positions.
pub trait PositionSource {
    fn current_positions(&self) -> Vec<ParticleSnapshot>;
}

/// Synchronous category lookup.
pub trait CategorySource {
    fn category_of(&self, id: ParticleId) -> CategoryLookup;
}

/// Region and optional sub-region a ground-plane point falls in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTag {
    pub region: String,
    pub sub_region: Option<String>,
}

/// Opaque geographic lookup, consulted only when placing whole clusters.
pub trait RegionLookup {
    fn region_for(&self, point: Point2) -> Option<RegionTag>;
}

/// Region lookup that knows no regions.
pub struct NoRegions;

impl RegionLookup for NoRegions {
    fn region_for(&self, _point: Point2) -> Option<RegionTag> {
        None
    }
}

type RegionFn = Box<dyn Fn(Point2) -> Option<RegionTag> + Send + Sync>;

/// Region lookup that calls a host-supplied function.
pub struct ExternalRegionLookup {
    region_fn: RegionFn,
}

impl ExternalRegionLookup {
    pub fn new(region_fn: impl Fn(Point2) -> Option<RegionTag> + Send + Sync + 'static) -> Self {
        Self {
            region_fn: Box::new(region_fn),
        }
    }
}

impl RegionLookup for ExternalRegionLookup {
    fn region_for(&self, point: Point2) -> Option<RegionTag> {
        (self.region_fn)(point)
    }
}

/// Offset for one particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticlePlacement {
    pub particle: ParticleId,
    pub offset: Offset,
}

/// Offset for one cluster slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPlacement {
    pub slot: usize,
    pub cluster_id: Option<ClusterId>,
    pub offset: Offset,
    pub centroid: Option<Point2>,
    pub region: Option<RegionTag>,
}

/// Structural change notification carrying the changed cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterChange {
    pub slot: usize,
    pub cluster_id: Option<ClusterId>,
    /// Members of the changed slot in the new partition; empty when the
    /// slot no longer exists.
    pub members: Vec<ParticleId>,
}

/// Receiver of placements and change notifications.
///
/// The sink turns symbolic offsets into coordinates and owns every
/// visual side effect.
pub trait PlacementSink {
    fn place_particles(&mut self, placements: &[ParticlePlacement]);

    fn place_clusters(&mut self, placements: &[ClusterPlacement]);

    fn cluster_changed(&mut self, _change: &ClusterChange) {}
}

/// In-memory particle registry: positions plus late-arriving categories.
///
/// Snapshot order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct ParticleRegistry {
    order: Vec<ParticleId>,
    positions: HashMap<ParticleId, Point2>,
    categories: HashMap<ParticleId, Category>,
}

impl ParticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a particle or move an existing one.
    pub fn upsert(&mut self, id: ParticleId, x: f64, z: f64) {
        if self.positions.insert(id, Point2::new(x, z)).is_none() {
            self.order.push(id);
        }
    }

    /// Assign a category. Returns `false` if the id is unknown or the
    /// particle already has one.
    pub fn assign(&mut self, id: ParticleId, category: &str) -> bool {
        if !self.positions.contains_key(&id) || self.categories.contains_key(&id) {
            return false;
        }
        self.categories.insert(id, category.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PositionSource for ParticleRegistry {
    fn current_positions(&self) -> Vec<ParticleSnapshot> {
        self.order
            .iter()
            .filter_map(|id| {
                self.positions.get(id).map(|&position| ParticleSnapshot {
                    id: *id,
                    position,
                })
            })
            .collect()
    }
}

impl CategorySource for ParticleRegistry {
    fn category_of(&self, id: ParticleId) -> CategoryLookup {
        if !self.positions.contains_key(&id) {
            return CategoryLookup::Missing;
        }
        match self.categories.get(&id) {
            Some(c) => CategoryLookup::Assigned(c.clone()),
            None => CategoryLookup::Unassigned,
        }
    }
}

/// Sink that records everything it receives, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub particles: Vec<ParticlePlacement>,
    pub clusters: Vec<ClusterPlacement>,
    pub changes: Vec<ClusterChange>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent offset delivered for `id`.
    pub fn particle_offset(&self, id: ParticleId) -> Option<Offset> {
        self.particles
            .iter()
            .rev()
            .find(|p| p.particle == id)
            .map(|p| p.offset)
    }

    /// Most recent offset delivered for cluster `slot`.
    pub fn cluster_offset(&self, slot: usize) -> Option<Offset> {
        self.clusters
            .iter()
            .rev()
            .find(|c| c.slot == slot)
            .map(|c| c.offset)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.clusters.clear();
        self.changes.clear();
    }
}

impl PlacementSink for RecordingSink {
    fn place_particles(&mut self, placements: &[ParticlePlacement]) {
        self.particles.extend_from_slice(placements);
    }

    fn place_clusters(&mut self, placements: &[ClusterPlacement]) {
        self.clusters.extend_from_slice(placements);
    }

    fn cluster_changed(&mut self, change: &ClusterChange) {
        self.changes.push(change.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_snapshot_in_insertion_order() {
        let mut reg = ParticleRegistry::new();
        reg.upsert(5, 1.0, 1.0);
        reg.upsert(2, 2.0, 2.0);
        reg.upsert(5, 3.0, 3.0);
        let snap = reg.current_positions();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, 5);
        assert_eq!(snap[0].position, Point2::new(3.0, 3.0));
        assert_eq!(snap[1].id, 2);
    }

    #[test]
    fn test_registry_category_lifecycle() {
        let mut reg = ParticleRegistry::new();
        reg.upsert(1, 0.0, 0.0);
        assert_eq!(reg.category_of(1), CategoryLookup::Unassigned);
        assert_eq!(reg.category_of(9), CategoryLookup::Missing);
        assert!(reg.assign(1, "Positive"));
        assert_eq!(reg.category_of(1), CategoryLookup::Assigned("Positive".into()));
    }

    #[test]
    fn test_registry_assigns_once() {
        let mut reg = ParticleRegistry::new();
        reg.upsert(1, 0.0, 0.0);
        assert!(reg.assign(1, "Positive"));
        assert!(!reg.assign(1, "Negative"));
        assert!(!reg.assign(2, "Negative"));
        assert_eq!(reg.category_of(1), CategoryLookup::Assigned("Positive".into()));
    }

    #[test]
    fn test_external_region_lookup() {
        let lookup = ExternalRegionLookup::new(|p| {
            if p.x < 0.0 {
                Some(RegionTag {
                    region: "West".into(),
                    sub_region: None,
                })
            } else {
                None
            }
        });
        assert_eq!(
            lookup.region_for(Point2::new(-1.0, 0.0)).map(|r| r.region),
            Some("West".to_string())
        );
        assert!(lookup.region_for(Point2::new(1.0, 0.0)).is_none());
        assert!(NoRegions.region_for(Point2::ZERO).is_none());
    }

    #[test]
    fn test_recording_sink_latest_offset() {
        let mut sink = RecordingSink::new();
        sink.place_particles(&[ParticlePlacement {
            particle: 1,
            offset: Offset::High,
        }]);
        sink.place_particles(&[ParticlePlacement {
            particle: 1,
            offset: Offset::Low,
        }]);
        assert_eq!(sink.particle_offset(1), Some(Offset::Low));
        assert_eq!(sink.particle_offset(2), None);
    }
}
