//! Aggregation: fold a batch of completed traces into per-key summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::trace::Trace;

/// count/min/max/avg over one key's `total_time` samples (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl Summary {
    /// `None` for an empty slice.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in samples {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(Self {
            count: samples.len() as u64,
            min,
            max,
            avg: sum / samples.len() as f64,
        })
    }

    /// Field name/value pairs in wire order.
    pub fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("count", self.count as f64),
            ("min", self.min),
            ("max", self.max),
            ("avg", self.avg),
        ]
    }
}

/// key -> summary. Ordered so rendered payloads are deterministic.
pub type Stats = BTreeMap<String, Summary>;

/// Group by key and summarize. In-flight traces (no `total_time`) are skipped.
pub fn summarize(traces: &[Trace]) -> Stats {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in traces {
        if let Some(total) = t.total_time {
            groups.entry(t.key.as_str()).or_default().push(total);
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, mut samples)| {
            // Summation order must not depend on arrival order.
            samples.sort_by(f64::total_cmp);
            Summary::from_samples(&samples).map(|s| (key.to_string(), s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn done(key: &str, ms: i64) -> Trace {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut t = Trace::started(key, start);
        t.stamp_end(start + Duration::milliseconds(ms));
        t
    }

    #[test]
    fn two_samples_same_key() {
        let stats = summarize(&[done("mod.fn", 100), done("mod.fn", 300)]);
        let s = stats["mod.fn"];
        assert_eq!(s.count, 2);
        assert_eq!(s.min, 100.0);
        assert_eq!(s.max, 300.0);
        assert_eq!(s.avg, 200.0);
    }

    #[test]
    fn single_sample_collapses() {
        let s = summarize(&[done("k", 42)])["k"];
        assert_eq!(s.count, 1);
        assert_eq!(s.min, 42.0);
        assert_eq!(s.max, 42.0);
        assert_eq!(s.avg, 42.0);
    }

    #[test]
    fn order_independent() {
        let mut batch = vec![
            done("a", 1),
            done("b", 7),
            done("a", 13),
            done("a", 2),
            done("b", 5),
            done("c", 9),
        ];
        let forward = summarize(&batch);
        batch.reverse();
        assert_eq!(summarize(&batch), forward);
        batch.swap(0, 3);
        batch.swap(1, 5);
        assert_eq!(summarize(&batch), forward);
    }

    #[test]
    fn in_flight_traces_are_ignored() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let stats = summarize(&[Trace::started("pending", start), done("k", 5)]);
        assert!(!stats.contains_key("pending"));
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_stats() {
        assert!(summarize(&[]).is_empty());
        assert!(Summary::from_samples(&[]).is_none());
    }
}
