// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Particle Types
// ─────────────────────────────────────────────────────────────────────
//! Identity, position, and category of a particle as seen by the kernel.
//!
//! Particles are owned by the host registry. The kernel only keeps ids
//! and reads positions and categories through snapshots.

use std::ops::{Add, Div, Sub};

use serde::{Deserialize, Serialize};

/// Stable particle identity assigned by the host.
pub type ParticleId = u32;

/// Categorical attribute ("emotion") attached to a particle.
pub type Category = String;

/// Position on the ground plane.
///
/// The host works in 3D; only the horizontal `x`/`z` plane takes part in
/// clustering, the vertical axis is what the kernel computes offsets for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub z: f64,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, z: 0.0 };

    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Div<f64> for Point2 {
    type Output = Point2;

    fn div(self, rhs: f64) -> Point2 {
        Point2::new(self.x / rhs, self.z / rhs)
    }
}

/// A particle's id and ground-plane position at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: ParticleId,
    pub position: Point2,
}

impl ParticleSnapshot {
    pub fn new(id: ParticleId, x: f64, z: f64) -> Self {
        Self {
            id,
            position: Point2::new(x, z),
        }
    }
}
