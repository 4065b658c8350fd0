//! Counter bundle for one scope (the shard total or one named group).

use std::collections::BTreeMap;

use serde::Serialize;
use shardstats_wire::{Decode, Encode, WireReader, WireWriter};
use tracing::warn;

use crate::phase::{PhaseStats, SearchPhase};

/// Warn once when a cumulative counter gets within 10% of `u64::MAX`.
const COUNTER_WARN_THRESHOLD: u64 = u64::MAX - (u64::MAX / 10);

/// Saturating counter bump with a breadcrumb when saturation nears.
pub(crate) fn saturating_increment(counter: &mut u64, delta: u64, counter_name: &str) {
    let before = *counter;
    *counter = counter.saturating_add(delta);
    if before < COUNTER_WARN_THRESHOLD && *counter >= COUNTER_WARN_THRESHOLD {
        warn!(
            target: "shardstats.counter",
            counter = counter_name,
            value = *counter,
            "counter approaching saturation"
        );
    }
}

/// Index-prefix query usage: how often prefix queries hit the
/// precomputed prefix index versus running unaccelerated, overall and
/// broken down per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefixUsage {
    /// Prefix queries served by the prefix index.
    pub index_count: u64,
    /// Prefix queries that ran unaccelerated.
    pub non_index_count: u64,
    /// Per-field accelerated counts.
    pub index_fields: BTreeMap<String, u64>,
    /// Per-field unaccelerated counts.
    pub non_index_fields: BTreeMap<String, u64>,
}

impl PrefixUsage {
    /// Union-merge `other` into `self`.
    ///
    /// Iterates `other`'s keys only; fields present only in `self` are
    /// left untouched.
    fn add(&mut self, other: &Self) {
        saturating_increment(&mut self.index_count, other.index_count, "index_prefix_total");
        saturating_increment(
            &mut self.non_index_count,
            other.non_index_count,
            "non_index_prefix_total",
        );
        for (field, n) in &other.index_fields {
            let slot = self.index_fields.entry(field.clone()).or_insert(0);
            *slot = slot.saturating_add(*n);
        }
        for (field, n) in &other.non_index_fields {
            let slot = self.non_index_fields.entry(field.clone()).or_insert(0);
            *slot = slot.saturating_add(*n);
        }
    }
}

/// Search-activity counters for one scope.
///
/// Holds the four phase counter bundles, index-prefix usage, and a
/// percentage map derived from the usage maps. The percentage map is a
/// projection: it is recomputed after construction and after every
/// merge, never set directly.
///
/// Not thread-safe: callers must serialize merge calls against one
/// instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    query: PhaseStats,
    fetch: PhaseStats,
    scroll: PhaseStats,
    suggest: PhaseStats,
    prefix: PrefixUsage,
    // Derived from `prefix` maps, kept consistent by recompute_percentages.
    index_prefix_percentages: BTreeMap<String, f32>,
}

impl Stats {
    /// Build from explicit counter values.
    ///
    /// The percentage map is not an input; it is derived from
    /// `prefix` immediately.
    #[must_use]
    pub fn new(
        query: PhaseStats,
        fetch: PhaseStats,
        scroll: PhaseStats,
        suggest: PhaseStats,
        prefix: PrefixUsage,
    ) -> Self {
        let mut stats = Self {
            query,
            fetch,
            scroll,
            suggest,
            prefix,
            index_prefix_percentages: BTreeMap::new(),
        };
        stats.recompute_percentages();
        stats
    }

    /// Counters for one phase.
    #[must_use]
    pub const fn phase(&self, phase: SearchPhase) -> &PhaseStats {
        match phase {
            SearchPhase::Query => &self.query,
            SearchPhase::Fetch => &self.fetch,
            SearchPhase::Scroll => &self.scroll,
            SearchPhase::Suggest => &self.suggest,
        }
    }

    /// Index-prefix usage counters and per-field maps.
    #[must_use]
    pub const fn prefix(&self) -> &PrefixUsage {
        &self.prefix
    }

    /// Per-field percentage of prefix queries served by the prefix
    /// index, always consistent with [`prefix`](Self::prefix).
    #[must_use]
    pub const fn index_prefix_percentages(&self) -> &BTreeMap<String, f32> {
        &self.index_prefix_percentages
    }

    /// Pointwise merge of every counter, union-merge of the usage maps,
    /// then a fresh percentage projection.
    pub fn add(&mut self, other: &Self) {
        self.query.add(&other.query);
        self.fetch.add(&other.fetch);
        self.scroll.add(&other.scroll);
        self.suggest.add(&other.suggest);
        self.prefix.add(&other.prefix);
        self.recompute_percentages();
    }

    /// Merge a closing shard's counters.
    ///
    /// `current` snapshots for query/fetch/suggest are dropped: once the
    /// shard is gone they describe nothing. Scroll is the exception —
    /// an open scroll at close time is folded into `scroll.count`,
    /// because scroll contexts outlive the shard's serving lifecycle.
    pub fn add_for_closing_shard(&mut self, other: &Self) {
        self.query.add_counts(&other.query);
        self.fetch.add_counts(&other.fetch);
        self.scroll.add_counts(&other.scroll);
        saturating_increment(&mut self.scroll.count, other.scroll.current, "scroll_total");
        self.suggest.add_counts(&other.suggest);
        self.prefix.add(&other.prefix);
        self.recompute_percentages();
    }

    fn recompute_percentages(&mut self) {
        for (field, &idx) in &self.prefix.index_fields {
            let non_idx = self.prefix.non_index_fields.get(field).copied().unwrap_or(0);
            let total = idx.saturating_add(non_idx);
            let pct = if total == 0 {
                0.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                {
                    idx as f32 * 100.0 / total as f32
                }
            };
            self.index_prefix_percentages.insert(field.clone(), pct);
        }
    }
}

impl Encode for Stats {
    fn encode(&self, w: &mut WireWriter) {
        for phase in SearchPhase::ALL {
            let p = self.phase(phase);
            w.write_var_u64(p.count);
            w.write_var_u64(p.time_in_millis);
            w.write_var_u64(p.current);
        }
        w.write_var_u64(self.prefix.index_count);
        w.write_var_u64(self.prefix.non_index_count);
        w.write_map(&self.prefix.index_fields, |w, v| w.write_var_u64(*v));
        w.write_map(&self.prefix.non_index_fields, |w, v| w.write_var_u64(*v));
        w.write_map(&self.index_prefix_percentages, |w, v| w.write_f32(*v));
    }
}

impl Decode for Stats {
    fn decode(r: &mut WireReader<'_>) -> shardstats_wire::Result<Self> {
        fn read_phase(r: &mut WireReader<'_>) -> shardstats_wire::Result<PhaseStats> {
            Ok(PhaseStats::new(
                r.read_var_u64()?,
                r.read_var_u64()?,
                r.read_var_u64()?,
            ))
        }
        let query = read_phase(r)?;
        let fetch = read_phase(r)?;
        let scroll = read_phase(r)?;
        let suggest = read_phase(r)?;
        let index_count = r.read_var_u64()?;
        let non_index_count = r.read_var_u64()?;
        let index_fields = r.read_map(WireReader::read_var_u64)?;
        let non_index_fields = r.read_map(WireReader::read_var_u64)?;
        // The percentage map travels with the payload; the sender derived
        // it from the maps above, so it is taken as-is rather than
        // recomputed here.
        let index_prefix_percentages = r.read_map(WireReader::read_f32)?;
        Ok(Self {
            query,
            fetch,
            scroll,
            suggest,
            prefix: PrefixUsage {
                index_count,
                non_index_count,
                index_fields,
                non_index_fields,
            },
            index_prefix_percentages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(fields: &[(&str, u64, u64)]) -> PrefixUsage {
        let mut index_fields = BTreeMap::new();
        let mut non_index_fields = BTreeMap::new();
        let mut index_count = 0u64;
        let mut non_index_count = 0u64;
        for &(field, idx, non_idx) in fields {
            index_fields.insert(field.to_owned(), idx);
            non_index_fields.insert(field.to_owned(), non_idx);
            index_count += idx;
            non_index_count += non_idx;
        }
        PrefixUsage {
            index_count,
            non_index_count,
            index_fields,
            non_index_fields,
        }
    }

    #[test]
    fn default_is_all_zero() {
        let stats = Stats::default();
        for phase in SearchPhase::ALL {
            assert_eq!(*stats.phase(phase), PhaseStats::default());
        }
        assert_eq!(stats.prefix().index_count, 0);
        assert!(stats.index_prefix_percentages().is_empty());
    }

    #[test]
    fn add_sums_every_phase_pointwise() {
        let mut a = Stats::new(
            PhaseStats::new(3, 100, 1),
            PhaseStats::new(4, 200, 2),
            PhaseStats::new(5, 300, 3),
            PhaseStats::new(6, 400, 4),
            PrefixUsage::default(),
        );
        let b = a.clone();
        a.add(&b);
        assert_eq!(*a.phase(SearchPhase::Query), PhaseStats::new(6, 200, 2));
        assert_eq!(*a.phase(SearchPhase::Fetch), PhaseStats::new(8, 400, 4));
        assert_eq!(*a.phase(SearchPhase::Scroll), PhaseStats::new(10, 600, 6));
        assert_eq!(*a.phase(SearchPhase::Suggest), PhaseStats::new(12, 800, 8));
    }

    #[test]
    fn percentages_derived_at_construction() {
        let stats = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            usage(&[("title", 3, 1), ("body", 0, 0)]),
        );
        let pct = stats.index_prefix_percentages();
        assert_eq!(pct.get("title"), Some(&75.0));
        // Zero denominator renders as 0, not NaN.
        assert_eq!(pct.get("body"), Some(&0.0));
    }

    #[test]
    fn add_merges_usage_maps_and_refreshes_percentages() {
        let mut a = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            usage(&[("title", 1, 3)]),
        );
        assert_eq!(a.index_prefix_percentages().get("title"), Some(&25.0));

        let b = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            usage(&[("title", 3, 1), ("body", 2, 0)]),
        );
        a.add(&b);

        assert_eq!(a.prefix().index_fields.get("title"), Some(&4));
        assert_eq!(a.prefix().non_index_fields.get("title"), Some(&4));
        assert_eq!(a.index_prefix_percentages().get("title"), Some(&50.0));
        assert_eq!(a.index_prefix_percentages().get("body"), Some(&100.0));
        assert_eq!(a.prefix().index_count, 6);
        assert_eq!(a.prefix().non_index_count, 4);
    }

    #[test]
    fn add_leaves_fields_unique_to_self_untouched() {
        let mut a = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            usage(&[("only_in_a", 2, 2)]),
        );
        a.add(&Stats::default());
        assert_eq!(a.prefix().index_fields.get("only_in_a"), Some(&2));
        assert_eq!(a.index_prefix_percentages().get("only_in_a"), Some(&50.0));
    }

    #[test]
    fn closing_shard_folds_scroll_current_into_count() {
        let mut base = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::new(10, 0, 0),
            PhaseStats::default(),
            PrefixUsage::default(),
        );
        let closing = Stats::new(
            PhaseStats::new(0, 0, 1),
            PhaseStats::default(),
            PhaseStats::new(5, 0, 2),
            PhaseStats::new(0, 0, 3),
            PrefixUsage::default(),
        );
        base.add_for_closing_shard(&closing);

        // 10 + 5 completed + 2 still open on the closing shard.
        assert_eq!(base.phase(SearchPhase::Scroll).count, 17);
        assert_eq!(base.phase(SearchPhase::Scroll).current, 0);
        // query/suggest `current` from the closing shard is dropped.
        assert_eq!(base.phase(SearchPhase::Query).current, 0);
        assert_eq!(base.phase(SearchPhase::Suggest).current, 0);
    }

    #[test]
    fn closing_shard_still_merges_usage_maps() {
        let mut base = Stats::default();
        let closing = Stats::new(
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            PhaseStats::default(),
            usage(&[("title", 1, 1)]),
        );
        base.add_for_closing_shard(&closing);
        assert_eq!(base.index_prefix_percentages().get("title"), Some(&50.0));
    }

    #[test]
    fn wire_round_trip() {
        let stats = Stats::new(
            PhaseStats::new(1, 2, 3),
            PhaseStats::new(4, 5, 6),
            PhaseStats::new(7, 8, 9),
            PhaseStats::new(10, 11, 12),
            usage(&[("title", 3, 1)]),
        );
        let bytes = shardstats_wire::to_bytes(&stats);
        let decoded: Stats = shardstats_wire::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, stats);
    }

    #[test]
    fn wire_truncation_is_an_error() {
        let bytes = shardstats_wire::to_bytes(&Stats::default());
        let result: shardstats_wire::Result<Stats> =
            shardstats_wire::from_bytes(&bytes[..bytes.len() - 1]);
        assert!(result.is_err());
    }
}
