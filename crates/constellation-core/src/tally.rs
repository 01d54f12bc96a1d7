// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Emotion Tally
// ─────────────────────────────────────────────────────────────────────
//! Category counts over an arbitrary particle subset.
//!
//! Counts keep the order in which categories were first observed. That
//! order is the tie-break of the classifier's stable sort, so it is part
//! of the observable output.

use serde::{Deserialize, Serialize};

use constellation_types::{Category, ParticleId};

use crate::sources::{CategoryLookup, CategorySource};

/// Insertion-ordered category → count mapping.
///
/// Every stored count is at least 1; only observed categories are keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCounts {
    entries: Vec<(Category, usize)>,
}

impl EmotionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter of `category`, adding it on first sight.
    pub fn add(&mut self, category: &str) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((category.to_string(), 1)),
        }
    }

    pub fn get(&self, category: &str) -> usize {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map_or(0, |(_, n)| *n)
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-observed order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), *n))
    }
}

impl<'a> FromIterator<&'a str> for EmotionCounts {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counts = EmotionCounts::new();
        for c in iter {
            counts.add(c);
        }
        counts
    }
}

/// Count the categories of `ids`.
///
/// Unassigned particles are skipped silently. Ids the source does not
/// know are skipped with a warning: particle lists may run slightly ahead
/// of or behind the registry.
pub fn tally(ids: &[ParticleId], source: &dyn CategorySource) -> EmotionCounts {
    let mut counts = EmotionCounts::new();
    for &id in ids {
        match source.category_of(id) {
            CategoryLookup::Assigned(category) => counts.add(&category),
            CategoryLookup::Unassigned => {}
            CategoryLookup::Missing => {
                log::warn!("tally: unknown particle id {id}, skipping");
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ParticleRegistry;

    fn registry(cats: &[(u32, Option<&str>)]) -> ParticleRegistry {
        let mut reg = ParticleRegistry::new();
        for &(id, cat) in cats {
            reg.upsert(id, 0.0, 0.0);
            if let Some(c) = cat {
                reg.assign(id, c);
            }
        }
        reg
    }

    #[test]
    fn test_counts_in_first_seen_order() {
        let reg = registry(&[
            (1, Some("Neutral")),
            (2, Some("Positive")),
            (3, Some("Neutral")),
        ]);
        let counts = tally(&[1, 2, 3], &reg);
        let entries: Vec<_> = counts.iter().collect();
        assert_eq!(entries, vec![("Neutral", 2), ("Positive", 1)]);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_unassigned_skipped() {
        let reg = registry(&[(1, Some("Negative")), (2, None)]);
        let counts = tally(&[1, 2], &reg);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("Negative"), 1);
    }

    #[test]
    fn test_unknown_id_skipped() {
        let reg = registry(&[(1, Some("Negative"))]);
        let counts = tally(&[1, 42], &reg);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_empty_subset() {
        let reg = registry(&[(1, Some("Negative"))]);
        assert!(tally(&[], &reg).is_empty());
    }

    #[test]
    fn test_from_iterator() {
        let counts: EmotionCounts = ["A", "B", "A"].into_iter().collect();
        assert_eq!(counts.get("A"), 2);
        assert_eq!(counts.get("C"), 0);
    }
}
