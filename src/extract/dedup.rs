//! Exact-text duplicate filtering.

use std::collections::HashSet;

use crate::model::content_hash;

/// Remembers the content hashes seen during one run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the exact text was seen before; otherwise records it.
    pub fn is_duplicate(&mut self, text: &str) -> bool {
        !self.seen.insert(content_hash(text))
    }

    /// Forget everything seen so far.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Number of distinct texts seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_occurrence_is_duplicate() {
        let mut dedup = Deduplicator::new();
        assert!(!dedup.is_duplicate("Chapter 3"));
        assert!(dedup.is_duplicate("Chapter 3"));
        assert!(dedup.is_duplicate("Chapter 3"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_exact_match_only() {
        let mut dedup = Deduplicator::new();
        assert!(!dedup.is_duplicate("Chapter 3"));
        assert!(!dedup.is_duplicate("Chapter 3 "));
        assert!(!dedup.is_duplicate("chapter 3"));
    }

    #[test]
    fn test_repeat_after_interleaving() {
        let mut dedup = Deduplicator::new();
        let seen: Vec<bool> = ["Roots", "Leaves", "Roots", "Stems", "Leaves"]
            .iter()
            .map(|text| dedup.is_duplicate(text))
            .collect();
        assert_eq!(seen, vec![false, false, true, false, true]);
        assert_eq!(dedup.len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut dedup = Deduplicator::new();
        dedup.is_duplicate("text");
        dedup.reset();
        assert!(dedup.is_empty());
        assert!(!dedup.is_duplicate("text"));
    }
}
