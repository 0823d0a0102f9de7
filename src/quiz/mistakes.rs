use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-word miss counter for a whole session.
///
/// Iteration order is the order words were first missed, which is what
/// breaks ties in [`MistakeTracker::top`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MistakeTracker {
    counts: IndexMap<String, u32>,
}

impl MistakeTracker {
    /// Record one miss for `word` and return its new count.
    pub fn record(&mut self, word: &str) -> u32 {
        let count = self.counts.entry(word.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// The `limit` most-missed words, highest count first.
    pub fn top(&self, limit: usize) -> Vec<(String, u32)> {
        let mut entries: Vec<(&String, &u32)> = self.counts.iter().collect();
        // sort_by is stable, so equal counts keep first-missed-first order
        entries.sort_by(|a, b| b.1.cmp(a.1));
        entries
            .into_iter()
            .take(limit)
            .map(|(word, count)| (word.clone(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_monotonic() {
        let mut tracker = MistakeTracker::default();
        assert!(tracker.top(5).is_empty());
        assert_eq!(tracker.record("cat"), 1);
        assert_eq!(tracker.record("cat"), 2);
        assert_eq!(tracker.top(5), vec![("cat".to_string(), 2)]);
    }

    #[test]
    fn test_top_orders_by_count_then_first_miss() {
        let mut tracker = MistakeTracker::default();
        tracker.record("b");
        tracker.record("a");
        tracker.record("c");
        tracker.record("c");
        tracker.record("a");

        let top = tracker.top(5);
        assert_eq!(
            top,
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_truncates() {
        let mut tracker = MistakeTracker::default();
        for word in ["one", "two", "three", "four", "five", "six", "seven"] {
            tracker.record(word);
        }
        let top = tracker.top(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].0, "one");
        assert_eq!(top[4].0, "five");
    }
}
