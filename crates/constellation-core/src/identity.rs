// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Stable Cluster Identity
// ─────────────────────────────────────────────────────────────────────
//! Carries cluster identity across passes by centroid proximity.
//!
//! Slot indices shift whenever the partition is rebuilt in a different
//! order. Each cluster is therefore matched against every cluster seen so
//! far: the first known centroid within the threshold that no other
//! cluster of the same pass has claimed lends its id. Unmatched clusters
//! get a fresh id. Known entries are kept for the life of the engine.

use constellation_types::{ClusterId, Point2};

#[derive(Debug, Clone)]
pub struct ClusterIdentities {
    next_id: ClusterId,
    known: Vec<(ClusterId, Point2)>,
}

impl Default for ClusterIdentities {
    fn default() -> Self {
        Self {
            next_id: 1,
            known: Vec::new(),
        }
    }
}

impl ClusterIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an id to each centroid, in order.
    ///
    /// Matched entries move to their new centroid.
    pub fn assign(&mut self, centroids: &[Point2], threshold: f64) -> Vec<ClusterId> {
        let mut claimed = vec![false; self.known.len()];
        let mut ids = Vec::with_capacity(centroids.len());

        for &centroid in centroids {
            let matched = self
                .known
                .iter()
                .enumerate()
                .find(|(k, (_, p))| !claimed[*k] && p.distance(&centroid) <= threshold)
                .map(|(k, _)| k);

            let id = match matched {
                Some(k) => {
                    claimed[k] = true;
                    self.known[k].1 = centroid;
                    self.known[k].0
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.known.push((id, centroid));
                    claimed.push(true);
                    log::debug!("new cluster id {id} at ({:.1}, {:.1})", centroid.x, centroid.z);
                    id
                }
            };
            ids.push(id);
        }
        ids
    }

    /// Number of ids ever issued.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
