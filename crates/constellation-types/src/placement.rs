// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Placement Symbols
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic vertical offset produced by the placement rules.
///
/// The host maps each symbol to a concrete coordinate delta; the kernel
/// never sees world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Offset {
    High,
    Neutral,
    Low,
}

impl Offset {
    /// Direction multiplier: `+1` for high, `0` for neutral, `-1` for low.
    #[inline]
    pub fn direction(self) -> f64 {
        match self {
            Offset::High => 1.0,
            Offset::Neutral => 0.0,
            Offset::Low => -1.0,
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Offset::High => "high",
            Offset::Neutral => "neutral",
            Offset::Low => "low",
        };
        f.write_str(s)
    }
}

/// How count ties are distributed over a sorted frequency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TiePattern {
    /// Every category has the same count (or only one category exists).
    AllEqual,
    /// The lowest count is shared by more than one category.
    MinGroupTied,
    /// The highest count is shared by more than one category.
    MaxGroupTied,
    /// All counts are pairwise distinct.
    NoneEqual,
}

/// What is being placed.
///
/// The same tie pattern places subjects differently depending on the
/// call site: members inside a cluster, whole clusters relative to each
/// other, or particles that belong to no cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Particle,
    Cluster,
    Unclustered,
}
