// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Clustering & Ordering Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Cluster diffing, emotion tally, tie classification, and the placement
//! rules that turn category frequencies into vertical offsets.
//!
//! # Invariants
//!
//! 1. **Unchanged partitions are inert**: when a rebuilt partition equals
//!    the last changed one, no change is announced and the history is not
//!    written.
//!
//! 2. **Placement is all-or-nothing per call**: offsets that do not line
//!    up with their targets abort the call before anything reaches the
//!    sink or the history.
//!
//! 3. **History slots never shrink**: a vanished cluster's slot keeps its
//!    last dominant category and keeps being ordered.
//!
//! 4. **Categories without a pending change are dropped**: a category
//!    assignment only orders a cluster's members when a change is waiting
//!    for it. The global pass runs either way.

pub mod classify;
pub mod diff;
pub mod engine;
pub mod history;
pub mod identity;
pub mod placement;
pub mod rendezvous;
pub mod sources;
pub mod tally;

pub use classify::{classify, Classification};
pub use diff::{diff, ClusterDiffTracker, PartitionDiff};
pub use engine::{ClusterEngine, PassReport, SharedClusterEngine};
pub use history::{ClusterHistory, HistorySlot};
pub use identity::ClusterIdentities;
pub use placement::{dominant_category, offset_for, PairTable, PlacementBatch};
pub use rendezvous::{Rendezvous, Trigger};
pub use sources::{
    CategoryLookup, CategorySource, ClusterChange, ClusterPlacement, ExternalRegionLookup,
    NoRegions, ParticlePlacement, ParticleRegistry, PlacementSink, PositionSource,
    RecordingSink, RegionLookup, RegionTag,
};
pub use tally::{tally, EmotionCounts};
