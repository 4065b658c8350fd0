//! Top-level aggregate: shard total, open contexts, named group breakdowns.

use std::collections::BTreeMap;

use serde::Serialize;
use shardstats_wire::{Decode, Encode, WireReader, WireWriter};

use crate::stats::{saturating_increment, Stats};

/// Aggregated search activity for an index or shard.
///
/// Holds one mandatory total [`Stats`], the number of currently open
/// search contexts, and an optional mapping from group name to that
/// group's [`Stats`]. The group mapping is a deliberate tri-state:
/// absent, present-but-empty, and populated are distinct, and absence is
/// preserved through merges (rendering skips the groups section for the
/// first two).
///
/// Not thread-safe: callers must serialize merge calls against one
/// instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    total: Stats,
    open_contexts: u64,
    group_stats: Option<BTreeMap<String, Stats>>,
}

impl SearchStats {
    /// Build from parts. Stored as-is; nothing is derived at this level.
    #[must_use]
    pub const fn new(
        total: Stats,
        open_contexts: u64,
        group_stats: Option<BTreeMap<String, Stats>>,
    ) -> Self {
        Self {
            total,
            open_contexts,
            group_stats,
        }
    }

    /// The total across all groups.
    #[must_use]
    pub const fn total(&self) -> &Stats {
        &self.total
    }

    /// Currently open search contexts.
    #[must_use]
    pub const fn open_contexts(&self) -> u64 {
        self.open_contexts
    }

    /// Per-group breakdowns, if any were ever recorded.
    #[must_use]
    pub fn group_stats(&self) -> Option<&BTreeMap<String, Stats>> {
        self.group_stats.as_ref()
    }

    /// Full merge: totals, open contexts, and group breakdowns.
    ///
    /// `None` is a no-op. Groups present only in `other` are merged into
    /// zero-initialized entries; a group mapping is created on `self`
    /// only when `other` actually carries non-empty groups.
    pub fn add(&mut self, other: Option<&Self>) {
        let Some(other) = other else { return };
        self.total.add(&other.total);
        saturating_increment(&mut self.open_contexts, other.open_contexts, "open_contexts");
        if let Some(other_groups) = other.group_stats.as_ref().filter(|g| !g.is_empty()) {
            let groups = self.group_stats.get_or_insert_with(BTreeMap::new);
            for (name, stats) in other_groups {
                groups.entry(name.clone()).or_default().add(stats);
            }
        }
    }

    /// Merge only the totals, ignoring open contexts and groups.
    ///
    /// `None` is a no-op.
    pub fn add_totals(&mut self, other: Option<&Self>) {
        let Some(other) = other else { return };
        self.total.add(&other.total);
    }

    /// Merge only the totals of a shard that is closing, reconciling its
    /// in-flight counters via [`Stats::add_for_closing_shard`].
    ///
    /// `None` is a no-op.
    pub fn add_totals_for_closing_shard(&mut self, other: Option<&Self>) {
        let Some(other) = other else { return };
        self.total.add_for_closing_shard(&other.total);
    }
}

impl Encode for SearchStats {
    fn encode(&self, w: &mut WireWriter) {
        self.total.encode(w);
        w.write_var_u64(self.open_contexts);
        match &self.group_stats {
            // An empty mapping encodes like an absent one; only the
            // in-memory representation keeps the distinction.
            Some(groups) if !groups.is_empty() => {
                w.write_bool(true);
                w.write_map(groups, |w, stats| stats.encode(w));
            }
            _ => w.write_bool(false),
        }
    }
}

impl Decode for SearchStats {
    fn decode(r: &mut WireReader<'_>) -> shardstats_wire::Result<Self> {
        let total = Stats::decode(r)?;
        let open_contexts = r.read_var_u64()?;
        let group_stats = if r.read_bool()? {
            Some(r.read_map(Stats::decode)?)
        } else {
            None
        };
        Ok(Self {
            total,
            open_contexts,
            group_stats,
        })
    }
}
