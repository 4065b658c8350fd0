//! Per-shard search-activity statistics.
//!
//! This crate provides:
//! - [`Stats`] — the counter bundle for one scope: four search phases
//!   ([`SearchPhase`]) with count/time/in-flight counters, plus
//!   index-prefix query usage ([`PrefixUsage`]) and its derived per-field
//!   percentage map
//! - [`SearchStats`] — the top-level aggregate: one total [`Stats`], an
//!   open-context counter, and optional named group breakdowns
//! - additive merges (`add`, `add_totals`, `add_totals_for_closing_shard`)
//!   for folding per-shard samples into index- or cluster-wide totals
//! - a binary wire codec (via [`shardstats_wire`]) and an ordered JSON
//!   rendering with optional human-readable durations
//!
//! The types are plain values with no internal synchronization; callers
//! own an aggregate exclusively for the duration of a merge sequence.

#![forbid(unsafe_code)]

pub mod phase;
pub mod render;
pub mod search_stats;
pub mod stats;

pub use phase::{PhaseStats, SearchPhase};
pub use render::format_millis;
pub use search_stats::SearchStats;
pub use stats::{PrefixUsage, Stats};

// Re-export the wire traits so payloads can be moved without a direct
// dependency on the wire crate.
pub use shardstats_wire::{self as wire, Decode, Encode};
