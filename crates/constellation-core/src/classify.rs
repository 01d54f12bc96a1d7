// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Tie Classifier
// ─────────────────────────────────────────────────────────────────────
//! Sorts category counts and names how their ties are distributed.
//!
//! Decision order:
//!   - no categories          → empty result
//!   - one category           → AllEqual
//!   - two categories         → AllEqual when tied, else NoneEqual
//!   - three or more          → grouped by count value:
//!       single group         → AllEqual
//!       lowest group > 1     → MinGroupTied
//!       highest group > 1    → MaxGroupTied
//!       otherwise            → NoneEqual

use serde::{Deserialize, Serialize};

use constellation_types::{Category, TiePattern};

use crate::tally::EmotionCounts;

/// Sorted counts, sorted categories, and their tie pattern.
///
/// `pattern` is `None` only for empty counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub sorted_counts: Vec<usize>,
    pub sorted_categories: Vec<Category>,
    pub pattern: Option<TiePattern>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.sorted_categories.len()
    }

    /// Position of `category` in ascending-count order.
    pub fn rank_of(&self, category: &str) -> Option<usize> {
        self.sorted_categories.iter().position(|c| c == category)
    }

    /// Category with the lowest count.
    pub fn lowest(&self) -> Option<&str> {
        self.sorted_categories.first().map(String::as_str)
    }

    /// Category with the highest count (last on ties).
    pub fn highest(&self) -> Option<&str> {
        self.sorted_categories.last().map(String::as_str)
    }
}

/// Run lengths of equal values in an ascending slice.
fn group_sizes(sorted: &[usize]) -> Vec<usize> {
    let mut sizes: Vec<usize> = Vec::new();
    let mut prev: Option<usize> = None;
    for &v in sorted {
        match (prev, sizes.last_mut()) {
            (Some(p), Some(run)) if p == v => *run += 1,
            _ => sizes.push(1),
        }
        prev = Some(v);
    }
    sizes
}

fn pattern_of(sorted_counts: &[usize]) -> Option<TiePattern> {
    match sorted_counts.len() {
        0 => None,
        1 => Some(TiePattern::AllEqual),
        2 => {
            if sorted_counts[0] == sorted_counts[1] {
                Some(TiePattern::AllEqual)
            } else {
                Some(TiePattern::NoneEqual)
            }
        }
        _ => {
            let groups = group_sizes(sorted_counts);
            let pattern = if groups.len() == 1 {
                TiePattern::AllEqual
            } else if groups[0] > 1 {
                TiePattern::MinGroupTied
            } else if groups[groups.len() - 1] > 1 {
                TiePattern::MaxGroupTied
            } else {
                TiePattern::NoneEqual
            };
            Some(pattern)
        }
    }
}

/// Sort `counts` ascending (stable) and classify the tie pattern.
pub fn classify(counts: &EmotionCounts) -> Classification {
    let mut pairs: Vec<(&str, usize)> = counts.iter().collect();
    pairs.sort_by_key(|&(_, n)| n);

    let sorted_counts: Vec<usize> = pairs.iter().map(|&(_, n)| n).collect();
    let sorted_categories: Vec<Category> = pairs.iter().map(|&(c, _)| c.to_string()).collect();
    let pattern = pattern_of(&sorted_counts);

    log::debug!(
        "classify: counts={sorted_counts:?} categories={sorted_categories:?} pattern={pattern:?}"
    );

    Classification {
        sorted_counts,
        sorted_categories,
        pattern,
    }
}
