//! Structured-document rendering.
//!
//! Field names and their order are a fixed external contract; the tests
//! pin both. Time fields render as a dual pair when human-readable
//! output is requested: `<phase>_time` (formatted duration) immediately
//! before `<phase>_time_in_millis`.

use serde_json::{Map, Value};

use crate::phase::SearchPhase;
use crate::search_stats::SearchStats;
use crate::stats::Stats;

const SEARCH: &str = "search";
const OPEN_CONTEXTS: &str = "open_contexts";
const GROUPS: &str = "groups";
const INDEX_PREFIX_TOTAL: &str = "index_prefix_total";
const NON_INDEX_PREFIX_TOTAL: &str = "non_index_prefix_total";
const INDEX_PREFIX_COUNT: &str = "index_prefix_count";
const NON_INDEX_PREFIX_COUNT: &str = "non_index_prefix_count";
const INDEX_PREFIX_PERCENTAGE: &str = "index_prefix_percentage";

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// Format a millisecond duration with its largest fitting unit and one
/// decimal place: `"1.5s"`, `"2.3m"`, `"250ms"`, `"0s"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_millis(millis: u64) -> String {
    if millis == 0 {
        return "0s".to_owned();
    }
    let scaled = |unit: u64, suffix: &str| {
        format!("{:.1}{suffix}", millis as f64 / unit as f64)
    };
    if millis >= MILLIS_PER_DAY {
        scaled(MILLIS_PER_DAY, "d")
    } else if millis >= MILLIS_PER_HOUR {
        scaled(MILLIS_PER_HOUR, "h")
    } else if millis >= MILLIS_PER_MINUTE {
        scaled(MILLIS_PER_MINUTE, "m")
    } else if millis >= MILLIS_PER_SECOND {
        scaled(MILLIS_PER_SECOND, "s")
    } else {
        format!("{millis}ms")
    }
}

fn counts_to_value(map: &std::collections::BTreeMap<String, u64>) -> Value {
    Value::Object(
        map.iter()
            .map(|(field, count)| (field.clone(), Value::from(*count)))
            .collect(),
    )
}

fn percentages_to_value(map: &std::collections::BTreeMap<String, f32>) -> Value {
    Value::Object(
        map.iter()
            .map(|(field, pct)| (field.clone(), Value::from(*pct)))
            .collect(),
    )
}

impl Stats {
    /// Render this scope's counters as an ordered JSON object.
    ///
    /// With `human` set, each time field appears twice: a formatted
    /// `<phase>_time` followed by the raw `<phase>_time_in_millis`.
    #[must_use]
    pub fn to_document(&self, human: bool) -> Map<String, Value> {
        let mut doc = Map::new();
        for phase in SearchPhase::ALL {
            let p = self.phase(phase);
            doc.insert(format!("{phase}_total"), Value::from(p.count));
            if human {
                doc.insert(
                    format!("{phase}_time"),
                    Value::from(format_millis(p.time_in_millis)),
                );
            }
            doc.insert(
                format!("{phase}_time_in_millis"),
                Value::from(p.time_in_millis),
            );
            doc.insert(format!("{phase}_current"), Value::from(p.current));
        }

        let prefix = self.prefix();
        doc.insert(INDEX_PREFIX_TOTAL.to_owned(), Value::from(prefix.index_count));
        doc.insert(
            NON_INDEX_PREFIX_TOTAL.to_owned(),
            Value::from(prefix.non_index_count),
        );
        doc.insert(
            INDEX_PREFIX_COUNT.to_owned(),
            counts_to_value(&prefix.index_fields),
        );
        doc.insert(
            NON_INDEX_PREFIX_COUNT.to_owned(),
            counts_to_value(&prefix.non_index_fields),
        );
        doc.insert(
            INDEX_PREFIX_PERCENTAGE.to_owned(),
            percentages_to_value(self.index_prefix_percentages()),
        );
        doc
    }
}

impl SearchStats {
    /// Render the aggregate as an ordered JSON object: `open_contexts`,
    /// the total's fields inlined, then a `groups` object — the latter
    /// only when groups are present and non-empty.
    #[must_use]
    pub fn to_document(&self, human: bool) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert(OPEN_CONTEXTS.to_owned(), Value::from(self.open_contexts()));
        doc.extend(self.total().to_document(human));
        if let Some(groups) = self.group_stats().filter(|g| !g.is_empty()) {
            let rendered: Map<String, Value> = groups
                .iter()
                .map(|(name, stats)| (name.clone(), Value::Object(stats.to_document(human))))
                .collect();
            doc.insert(GROUPS.to_owned(), Value::Object(rendered));
        }
        doc
    }
}

impl std::fmt::Display for SearchStats {
    /// Pretty-printed JSON with human-readable times, under a top-level
    /// `"search"` key.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut root = Map::new();
        root.insert(SEARCH.to_owned(), Value::Object(self.to_document(true)));
        let text =
            serde_json::to_string_pretty(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}
