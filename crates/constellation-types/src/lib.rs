// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Data model, configuration, and error hierarchy shared by the
//! Constellation clustering and emotion-ordering kernel.

pub mod config;
pub mod error;
pub mod particle;
pub mod partition;
pub mod placement;

pub use config::{KernelConfig, PairRule};
pub use error::{ClusterError, ClusterResult};
pub use particle::{Category, ParticleId, ParticleSnapshot, Point2};
pub use partition::{Cluster, ClusterId, ClusterPartition};
pub use placement::{Offset, Subject, TiePattern};
