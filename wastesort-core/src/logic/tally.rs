//! Tally Store - per-category counts for the lifetime of the process
//!
//! One instance per process, owned by the pipeline and shared with the
//! request handlers. Not persisted.

use parking_lot::Mutex;
use serde::Serialize;

use super::labels::ClassLabel;
use super::router::{route, Disposition};

/// Running counts, keyed by first-seen order
#[derive(Debug, Default)]
pub struct TallyStore {
    counts: Mutex<Vec<(ClassLabel, u64)>>,
}

impl TallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified item
    pub fn increment(&self, label: ClassLabel) {
        let mut counts = self.counts.lock();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    /// Point-in-time copy, taken under the same lock as `increment`
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            entries: self.counts.lock().clone(),
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().iter().map(|(_, c)| c).sum()
    }
}

/// Immutable view of the tally at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    entries: Vec<(ClassLabel, u64)>,
}

impl TallySnapshot {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, label: ClassLabel) -> u64 {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, u64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Serializable summary for JSON consumers
    pub fn summary(&self) -> TallySummary {
        TallySummary {
            total: self.total(),
            categories: self
                .iter()
                .map(|(label, count)| CategoryCount {
                    label,
                    count,
                    disposition: route(label),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TallySummary {
    pub total: u64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub label: ClassLabel,
    pub count: u64,
    pub disposition: Disposition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_empty() {
        let store = TallyStore::new();
        let snap = store.snapshot();
        assert!(snap.is_empty());
        assert_eq!(snap.total(), 0);
        assert_eq!(snap.get(ClassLabel::Paper), 0);
    }

    #[test]
    fn test_counts_match_calls_and_keep_first_seen_order() {
        let store = TallyStore::new();
        let calls = [
            ClassLabel::Trash,
            ClassLabel::Metal,
            ClassLabel::Trash,
            ClassLabel::Paper,
            ClassLabel::Metal,
            ClassLabel::Trash,
        ];
        for label in calls {
            store.increment(label);
        }

        let snap = store.snapshot();
        assert_eq!(snap.total(), calls.len() as u64);
        assert_eq!(store.total(), calls.len() as u64);

        let order: Vec<_> = snap.iter().collect();
        assert_eq!(
            order,
            vec![
                (ClassLabel::Trash, 3),
                (ClassLabel::Metal, 2),
                (ClassLabel::Paper, 1),
            ]
        );
        assert_eq!(snap.max_count(), 3);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_increments() {
        let store = TallyStore::new();
        store.increment(ClassLabel::Cardboard);
        let before = store.snapshot();
        store.increment(ClassLabel::Cardboard);

        assert_eq!(before.get(ClassLabel::Cardboard), 1);
        assert_eq!(store.snapshot().get(ClassLabel::Cardboard), 2);
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let store = Arc::new(TallyStore::new());

        std::thread::scope(|s| {
            for t in 0..8 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    let label = ClassLabel::ALL[t % ClassLabel::COUNT];
                    for _ in 0..250 {
                        store.increment(label);
                    }
                });
            }
        });

        let snap = store.snapshot();
        assert_eq!(snap.total(), 8 * 250);
        assert_eq!(snap.len(), 8);
    }

    #[test]
    fn test_summary_carries_dispositions() {
        let store = TallyStore::new();
        store.increment(ClassLabel::Cardboard);
        store.increment(ClassLabel::Shoes);

        let summary = store.snapshot().summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.categories[0].disposition, Disposition::Recyclable);
        assert_eq!(summary.categories[1].disposition, Disposition::NonRecyclable);
    }
}
