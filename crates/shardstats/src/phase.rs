//! Search phases and per-phase counters.

use std::time::Duration;

use serde::Serialize;

/// A distinct stage of search execution, tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Query execution against the shard.
    Query,
    /// Fetching source documents for matched hits.
    Fetch,
    /// Continuation of a scrolled search context.
    Scroll,
    /// Suggestion (did-you-mean / completion) execution.
    Suggest,
}

impl SearchPhase {
    /// Every phase, in wire and rendering order.
    pub const ALL: [Self; 4] = [Self::Query, Self::Fetch, Self::Scroll, Self::Suggest];

    /// The phase's wire/rendering label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Fetch => "fetch",
            Self::Scroll => "scroll",
            Self::Suggest => "suggest",
        }
    }
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one search phase on one scope.
///
/// `count` and `time_in_millis` are cumulative and only grow across
/// merges; `current` is a snapshot of in-flight operations at sampling
/// time, not a cumulative figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    /// Completed operations.
    pub count: u64,
    /// Cumulative elapsed time across completed operations.
    pub time_in_millis: u64,
    /// In-flight operations at sampling time.
    pub current: u64,
}

impl PhaseStats {
    /// Build from explicit counter values.
    #[must_use]
    pub const fn new(count: u64, time_in_millis: u64, current: u64) -> Self {
        Self {
            count,
            time_in_millis,
            current,
        }
    }

    /// Cumulative elapsed time as a [`Duration`].
    #[must_use]
    pub const fn time(&self) -> Duration {
        Duration::from_millis(self.time_in_millis)
    }

    /// Pointwise saturating sum of all three counters.
    pub(crate) fn add(&mut self, other: &Self) {
        self.count = self.count.saturating_add(other.count);
        self.time_in_millis = self.time_in_millis.saturating_add(other.time_in_millis);
        self.current = self.current.saturating_add(other.current);
    }

    /// Sum `count` and `time_in_millis` only, leaving `current` alone.
    ///
    /// Used when the other side's in-flight snapshot has no meaning
    /// anymore (its shard is closing).
    pub(crate) fn add_counts(&mut self, other: &Self) {
        self.count = self.count.saturating_add(other.count);
        self.time_in_millis = self.time_in_millis.saturating_add(other.time_in_millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_labels() {
        assert_eq!(SearchPhase::Query.as_str(), "query");
        assert_eq!(SearchPhase::Suggest.to_string(), "suggest");
        assert_eq!(SearchPhase::ALL.len(), 4);
    }

    #[test]
    fn add_sums_all_counters() {
        let mut a = PhaseStats::new(3, 120, 1);
        a.add(&PhaseStats::new(2, 30, 4));
        assert_eq!(a, PhaseStats::new(5, 150, 5));
    }

    #[test]
    fn add_counts_drops_current() {
        let mut a = PhaseStats::new(3, 120, 1);
        a.add_counts(&PhaseStats::new(2, 30, 4));
        assert_eq!(a, PhaseStats::new(5, 150, 1));
    }

    #[test]
    fn add_saturates_instead_of_wrapping() {
        let mut a = PhaseStats::new(u64::MAX - 1, 0, 0);
        a.add(&PhaseStats::new(5, 0, 0));
        assert_eq!(a.count, u64::MAX);
    }

    #[test]
    fn time_is_millis() {
        let p = PhaseStats::new(0, 1500, 0);
        assert_eq!(p.time(), Duration::from_millis(1500));
    }
}
