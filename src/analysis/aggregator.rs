//! Per-function string aggregation and ranking.
//!
//! A [`StringAggregator`] lives for exactly one function: it is created
//! empty when scanning starts and consumed by [`rank`] once the body has
//! been exhausted.

use super::sanitize::sanitize;
use super::Limits;
use crate::models::StringEntry;

/// What [`StringAggregator::offer`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// New distinct string stored.
    Added,
    /// Existing entry's count incremented.
    Counted,
    /// Shorter than the minimum after sanitizing.
    TooShort,
    /// New distinct string dropped because the set is full.
    Full,
}

/// Bounded multiset of sanitized strings, in first-seen order.
#[derive(Debug, Clone)]
pub struct StringAggregator {
    entries: Vec<StringEntry>,
    capacity: usize,
    min_len: usize,
    max_len: usize,
}

impl StringAggregator {
    /// Create an empty aggregator bounded by `limits`.
    pub fn new(limits: &Limits) -> Self {
        Self {
            entries: Vec::with_capacity(limits.max_strings),
            capacity: limits.max_strings,
            min_len: limits.min_string_len,
            max_len: limits.max_content_len(),
        }
    }

    /// Sanitize a decoded string and count it.
    pub fn offer(&mut self, candidate: &str) -> Offer {
        let mut content = sanitize(candidate);

        // Sanitized text is ASCII, so byte truncation is char-safe.
        if content.len() > self.max_len {
            content.truncate(self.max_len);
            let kept = content.trim_end_matches(' ').len();
            content.truncate(kept);
        }

        if content.len() < self.min_len {
            return Offer::TooShort;
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.content == content) {
            entry.occurrences = entry.occurrences.saturating_add(1);
            return Offer::Counted;
        }

        if self.is_full() {
            return Offer::Full;
        }

        self.entries.push(StringEntry::new(content));
        Offer::Added
    }

    /// Whether no further distinct string can be stored.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    #[allow(dead_code)] // Inspection helper
    pub fn entries(&self) -> &[StringEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<StringEntry> {
        self.entries
    }
}

/// Order entries by ascending occurrence count. The sort is stable, so equal
/// counts keep first-seen order.
pub fn rank(mut entries: Vec<StringEntry>) -> Vec<StringEntry> {
    entries.sort_by(|a, b| a.occurrences.cmp(&b.occurrences));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> StringAggregator {
        StringAggregator::new(&Limits::default())
    }

    fn entry(content: &str, occurrences: u32) -> StringEntry {
        StringEntry {
            content: content.to_string(),
            occurrences,
        }
    }

    #[test]
    fn test_duplicate_is_counted() {
        let mut agg = aggregator();

        assert_eq!(agg.offer("Hello World!!"), Offer::Added);
        assert_eq!(agg.offer("Hello World!!"), Offer::Counted);

        assert_eq!(agg.entries(), &[entry("Hello World!!", 2)]);
    }

    #[test]
    fn test_dedup_after_sanitizing() {
        let mut agg = aggregator();

        agg.offer("  usage: %s\n");
        agg.offer("usage: %s");
        agg.offer("\tusage: %s\r\n");

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.entries()[0], entry("usage: %s", 3));
    }

    #[test]
    fn test_short_strings_rejected() {
        let mut agg = aggregator();

        assert_eq!(agg.offer("foo"), Offer::TooShort);
        assert_eq!(agg.offer("  ab\n\n"), Offer::TooShort);
        assert_eq!(agg.offer("\u{1}\u{2}\u{3}\u{4}\u{5}"), Offer::TooShort);
        assert!(agg.is_empty());

        assert_eq!(agg.offer("abcd"), Offer::Added);
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_capacity_drops_new_strings_only() {
        let mut agg = aggregator();

        for i in 0..10 {
            assert_eq!(agg.offer(&format!("string {}", i)), Offer::Added);
        }
        assert!(agg.is_full());

        assert_eq!(agg.offer("string 10"), Offer::Full);
        assert_eq!(agg.offer("string 10"), Offer::Full);
        assert_eq!(agg.offer("string 3"), Offer::Counted);

        assert_eq!(agg.len(), 10);
        assert!(agg.entries().iter().all(|e| e.content != "string 10"));
        assert_eq!(agg.entries()[3].occurrences, 2);
    }

    #[test]
    fn test_long_strings_truncated_before_compare() {
        let limits = Limits::default();
        let mut agg = StringAggregator::new(&limits);
        let long = "x".repeat(100);
        let also_long = format!("{}{}", "x".repeat(limits.max_content_len()), "y".repeat(10));

        agg.offer(&long);
        agg.offer(&also_long);

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.entries()[0].content.len(), limits.max_content_len());
        assert_eq!(agg.entries()[0].occurrences, 2);
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_space() {
        let limits = Limits::default();
        let mut agg = StringAggregator::new(&limits);
        let text = format!("{} tail", "a".repeat(limits.max_content_len() - 1));

        agg.offer(&text);

        let content = &agg.entries()[0].content;
        assert!(!content.ends_with(' '));
        assert_eq!(content.len(), limits.max_content_len() - 1);
    }

    #[test]
    fn test_rank_ascending() {
        let ranked = rank(vec![entry("three", 3), entry("one", 1), entry("two", 2)]);
        let order: Vec<_> = ranked.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(order, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_rank_is_stable() {
        let ranked = rank(vec![
            entry("first", 2),
            entry("second", 1),
            entry("third", 2),
            entry("fourth", 1),
            entry("fifth", 2),
        ]);
        let order: Vec<_> = ranked.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(order, vec!["second", "fourth", "first", "third", "fifth"]);
    }

    #[test]
    fn test_rank_extreme_counts() {
        let ranked = rank(vec![entry("max", u32::MAX), entry("min", 1)]);
        assert_eq!(ranked[0].content, "min");
        assert_eq!(ranked[1].content, "max");
    }
}
