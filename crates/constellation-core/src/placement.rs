// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Placement Rules
// ─────────────────────────────────────────────────────────────────────
//! Maps a classification to symbolic vertical offsets.
//!
//! One rule table serves three call sites. The direction is inverted
//! between them: inside a cluster the minority category rises, while
//! whole clusters whose dominant category is the majority sink.
//!
//! | Pattern      | Particle              | Cluster               | Unclustered            |
//! |--------------|-----------------------|-----------------------|------------------------|
//! | AllEqual     | Neutral               | Neutral               | Neutral                |
//! | MinGroupTied | max Neutral, else Low | max Neutral, else Low | max Neutral, else High |
//! | MaxGroupTied | min Low, else Neutral | min Neutral, else Low | min Neutral, else Low  |
//! | NoneEqual    | min High, max Low, middle Neutral (two categories: lower High, higher Neutral) |

use constellation_types::config::default_pair_rules;
use constellation_types::{
    Category, ClusterError, ClusterResult, KernelConfig, Offset, PairRule, Subject, TiePattern,
};

use crate::classify::Classification;

/// Offset for a subject whose category is `category`.
///
/// Returns `None` for an empty classification or for a category that
/// does not appear in it (unassigned, or a stale placeholder).
pub fn offset_for(
    subject: Subject,
    classification: &Classification,
    category: &str,
) -> Option<Offset> {
    let pattern = classification.pattern?;
    let rank = classification.rank_of(category)?;
    let last = classification.len() - 1;
    let is_min = rank == 0;
    let is_max = rank == last;

    let offset = match pattern {
        TiePattern::AllEqual => Offset::Neutral,
        TiePattern::MinGroupTied => match (subject, is_max) {
            (_, true) => Offset::Neutral,
            (Subject::Unclustered, false) => Offset::High,
            (_, false) => Offset::Low,
        },
        TiePattern::MaxGroupTied => match (subject, is_min) {
            (Subject::Particle, true) => Offset::Low,
            (Subject::Particle, false) => Offset::Neutral,
            (_, true) => Offset::Neutral,
            (_, false) => Offset::Low,
        },
        TiePattern::NoneEqual => {
            if is_min {
                Offset::High
            } else if is_max && last >= 2 {
                Offset::Low
            } else {
                Offset::Neutral
            }
        }
    };
    Some(offset)
}

/// Closed unordered lookup naming the dominant category of two tied
/// leaders.
#[derive(Debug, Clone)]
pub struct PairTable {
    rules: Vec<PairRule>,
}

impl Default for PairTable {
    fn default() -> Self {
        Self::new(default_pair_rules())
    }
}

impl PairTable {
    pub fn new(rules: Vec<PairRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.pair_rules.clone())
    }

    /// Resolved label for the unordered pair `(a, b)`.
    pub fn resolve(&self, a: &str, b: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.matches(a, b))
            .map(|r| r.resolved.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The single category representing a cluster in inter-cluster ordering.
///
/// Two tied leaders go through `pairs`; every other case takes the
/// highest-count category. An unknown pair yields `None`.
pub fn dominant_category(classification: &Classification, pairs: &PairTable) -> Option<Category> {
    let pattern = classification.pattern?;
    let n = classification.len();
    let highest = classification.highest()?;

    if n < 3 || pattern != TiePattern::MaxGroupTied {
        return Some(highest.to_string());
    }

    let second = &classification.sorted_categories[n - 2];
    match pairs.resolve(second, highest) {
        Some(resolved) => Some(resolved.to_string()),
        None => {
            log::warn!("no pair rule for ({second}, {highest}), dominant category left unset");
            None
        }
    }
}

/// Targets paired one-to-one with their offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementBatch<T> {
    entries: Vec<(T, Offset)>,
}

impl<T: Clone> PlacementBatch<T> {
    /// Pair `targets[i]` with `offsets[i]`.
    ///
    /// # Errors
    /// `ClusterError::PlacementMismatch` when the lengths differ.
    pub fn zip(targets: &[T], offsets: &[Offset]) -> ClusterResult<Self> {
        if targets.len() != offsets.len() {
            log::error!(
                "placement aborted: {} offsets for {} targets",
                offsets.len(),
                targets.len()
            );
            return Err(ClusterError::PlacementMismatch {
                offsets: offsets.len(),
                targets: targets.len(),
            });
        }
        Ok(Self {
            entries: targets.iter().cloned().zip(offsets.iter().copied()).collect(),
        })
    }
}

impl<T> PlacementBatch<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(T, Offset)> {
        self.entries.iter()
    }
}

impl<T> IntoIterator for PlacementBatch<T> {
    type Item = (T, Offset);
    type IntoIter = std::vec::IntoIter<(T, Offset)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
