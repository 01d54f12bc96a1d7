// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Spatial Index
// ─────────────────────────────────────────────────────────────────────
//! All-pairs neighbour index over a ground-plane point set.
//!
//! Particle counts in a live scene stay in the hundreds, so the index is
//! a flat O(n²) scan rather than a tree. Distance ties at exactly the
//! radius count as neighbours.

use std::collections::BTreeMap;

use constellation_types::{ClusterError, ClusterResult, Point2};

/// Candidate adjacency: point index → neighbour indices, ascending keys.
pub type Adjacency = BTreeMap<usize, Vec<usize>>;

/// Neighbour queries over a borrowed point slice.
pub struct SpatialIndex<'a> {
    points: &'a [Point2],
}

impl<'a> SpatialIndex<'a> {
    /// Index `points`. Fails if any coordinate is NaN or infinite.
    pub fn new(points: &'a [Point2]) -> ClusterResult<Self> {
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(ClusterError::Numerical(format!(
                "point {i} has non-finite coordinates ({}, {})",
                points[i].x, points[i].z
            )));
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Point2 {
        self.points[index]
    }

    pub fn points(&self) -> &'a [Point2] {
        self.points
    }

    /// Indices `j != i` with `distance(i, j) <= radius`, ascending.
    pub fn neighbors_within(&self, i: usize, radius: f64) -> Vec<usize> {
        let origin = self.points[i];
        self.points
            .iter()
            .enumerate()
            .filter(|&(j, p)| j != i && origin.distance(p) <= radius)
            .map(|(j, _)| j)
            .collect()
    }

    /// Neighbour lists of every point that has at least `min_neighbors`
    /// neighbours. Points below the threshold are left out entirely.
    pub fn candidate_adjacency(&self, radius: f64, min_neighbors: usize) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for i in 0..self.points.len() {
            let neighbors = self.neighbors_within(i, radius);
            if neighbors.len() >= min_neighbors {
                adjacency.insert(i, neighbors);
            }
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, step: f64) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f64 * step, 0.0)).collect()
    }

    #[test]
    fn test_neighbors_exclude_self() {
        let pts = line(3, 1.0);
        let idx = SpatialIndex::new(&pts).unwrap();
        assert_eq!(idx.neighbors_within(1, 1.0), vec![0, 2]);
        assert_eq!(idx.neighbors_within(0, 1.0), vec![1]);
    }

    #[test]
    fn test_radius_inclusive() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)];
        let idx = SpatialIndex::new(&pts).unwrap();
        assert_eq!(idx.neighbors_within(0, 5.0), vec![1]);
        assert!(idx.neighbors_within(0, 4.999).is_empty());
    }

    #[test]
    fn test_candidate_adjacency_filters_sparse_points() {
        // 0,1,2 packed together; 3 far away
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(100.0, 100.0),
        ];
        let idx = SpatialIndex::new(&pts).unwrap();
        let adj = idx.candidate_adjacency(2.0, 2);
        assert_eq!(adj.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(adj[&0], vec![1, 2]);
    }

    #[test]
    fn test_rejects_nan() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(f64::NAN, 1.0)];
        assert!(matches!(
            SpatialIndex::new(&pts),
            Err(ClusterError::Numerical(_))
        ));
    }

    #[test]
    fn test_empty_index() {
        let pts: Vec<Point2> = Vec::new();
        let idx = SpatialIndex::new(&pts).unwrap();
        assert!(idx.is_empty());
        assert!(idx.candidate_adjacency(1.0, 0).is_empty());
    }
}
