//! Operation-count summaries.

use rustc_hash::FxHashMap;

/// A summary of how often each operation name occurs in a circuit.
///
/// Computed on demand via [`Circuit::count_ops`](crate::Circuit::count_ops).
/// Displays as `{name: count, ...}` ordered by descending count, then name,
/// so the printed form is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpCounts {
    counts: FxHashMap<String, usize>,
}

impl OpCounts {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of an operation name.
    pub fn record(&mut self, name: &str) {
        if let Some(count) = self.counts.get_mut(name) {
            *count += 1;
        } else {
            self.counts.insert(name.to_string(), 1);
        }
    }

    /// Get the count for an operation name (0 if absent).
    pub fn get(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Check whether an operation name occurs at all.
    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    /// Number of distinct operation names.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if the summary is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of operations across all names.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate over (name, count) pairs in display order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter()
    }
}

impl std::fmt::Display for OpCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, count)) in self.iter_sorted().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {count}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let mut counts = OpCounts::new();
        counts.record("h");
        counts.record("cx");
        counts.record("cx");

        assert_eq!(counts.get("h"), 1);
        assert_eq!(counts.get("cx"), 2);
        assert_eq!(counts.get("swap"), 0);
        assert!(counts.contains("h"));
        assert!(!counts.contains("swap"));
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_display_order() {
        let mut counts = OpCounts::new();
        counts.record("measure");
        counts.record("cx");
        counts.record("cx");
        counts.record("h");

        // cx has the highest count; h and measure tie and sort by name.
        assert_eq!(counts.to_string(), "{cx: 2, h: 1, measure: 1}");
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(OpCounts::new().to_string(), "{}");
    }
}
