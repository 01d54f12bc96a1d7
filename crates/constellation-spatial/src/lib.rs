// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Spatial Clustering
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Ground-plane proximity clustering.
//!
//! Architecture:
//!   - SpatialIndex: all-pairs neighbour queries within a radius
//!   - ClusterBuilder: breadth-first grouping under a centroid constraint

pub mod builder;
pub mod index;

pub use builder::{build_clusters, centroid, ClusterBuilder};
pub use index::{Adjacency, SpatialIndex};
