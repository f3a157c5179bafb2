//! Summary statistics over a collection of entries
//!
//! A `SummaryStats` is a read-only snapshot: it is recomputed from scratch for
//! every collection and never updated in place. An empty collection has no
//! summary at all (`None`), which is different from a summary of zero entries.
//!
//! Durations are kept in seconds, the unit the trace reports. Conversion to
//! milliseconds happens only through [`secs_to_millis`].

use crate::entry::{LogEntry, TimeOfDay};
use serde::Serialize;
use std::collections::HashMap;

/// Rows shown by default in ranked tables
pub const DEFAULT_TOP_N: usize = 10;

/// Convert seconds to milliseconds for presentation
pub fn secs_to_millis(secs: f64) -> f64 {
    secs * 1000.0
}

/// A distinct value and how many entries carried it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedValue {
    pub value: String,
    pub count: u64,
}

/// Occurrence counts ranked by descending count
///
/// Ties keep first-encountered order. Truncated views are slices of the one
/// canonical ranking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    ranked: Vec<RankedValue>,
}

impl FrequencyTable {
    /// Count values, in encounter order
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut counted: Vec<(&'a str, u64)> = Vec::new();

        for value in values {
            match positions.get(value) {
                Some(&pos) => counted[pos].1 += 1,
                None => {
                    positions.insert(value, counted.len());
                    counted.push((value, 1));
                }
            }
        }

        // Stable sort keeps first-encountered order among equal counts.
        counted.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            ranked: counted
                .into_iter()
                .map(|(value, count)| RankedValue {
                    value: value.to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Full ranking
    pub fn ranked(&self) -> &[RankedValue] {
        &self.ranked
    }

    /// First `n` rows of the ranking
    pub fn top(&self, n: usize) -> &[RankedValue] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// First [`DEFAULT_TOP_N`] rows of the ranking
    pub fn top_default(&self) -> &[RankedValue] {
        self.top(DEFAULT_TOP_N)
    }

    /// Number of distinct values, regardless of truncation
    pub fn unique_count(&self) -> usize {
        self.ranked.len()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.ranked.iter().map(|r| r.count).sum()
    }

    pub fn count_of(&self, value: &str) -> Option<u64> {
        self.ranked.iter().find(|r| r.value == value).map(|r| r.count)
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Distribution of operation durations, in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64, // P50
    pub p95: f64,
    pub p99: f64,
}

impl DurationStats {
    fn from_durations(durations: &[f64]) -> Self {
        let mut sorted = durations.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = if sorted.is_empty() {
            0.0
        } else {
            sorted.iter().sum::<f64>() / sorted.len() as f64
        };

        Self {
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            mean,
            median: calculate_percentile(&sorted, 50.0),
            p95: calculate_percentile(&sorted, 95.0),
            p99: calculate_percentile(&sorted, 99.0),
        }
    }

    pub fn min_ms(&self) -> f64 {
        secs_to_millis(self.min)
    }

    pub fn max_ms(&self) -> f64 {
        secs_to_millis(self.max)
    }

    pub fn mean_ms(&self) -> f64 {
        secs_to_millis(self.mean)
    }
}

/// Linear-interpolated percentile of sorted data
fn calculate_percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}

/// Snapshot of a non-empty entry collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_entries: usize,
    pub min_time: TimeOfDay,
    pub max_time: TimeOfDay,
    /// `max_time - min_time`, in seconds
    pub duration_seconds: f64,
    pub operations: FrequencyTable,
    /// Entries without a descriptor are not counted
    pub file_descriptors: FrequencyTable,
    /// Entries without a path are not counted
    pub paths: FrequencyTable,
    pub processes: FrequencyTable,
    pub durations: DurationStats,
}

/// Summarize a collection, or `None` when it is empty
pub fn summary_stats<'a, I>(entries: I) -> Option<SummaryStats>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let entries: Vec<&'a LogEntry> = entries.into_iter().collect();
    let min_time = entries.iter().map(|e| e.timestamp).min()?;
    let max_time = entries.iter().map(|e| e.timestamp).max()?;
    let durations: Vec<f64> = entries.iter().map(|e| e.duration).collect();

    Some(SummaryStats {
        total_entries: entries.len(),
        min_time,
        max_time,
        duration_seconds: max_time.seconds_since(min_time),
        operations: FrequencyTable::from_values(entries.iter().map(|e| e.operation.as_str())),
        file_descriptors: FrequencyTable::from_values(
            entries.iter().filter_map(|e| e.file_descriptor.as_deref()),
        ),
        paths: FrequencyTable::from_values(entries.iter().filter_map(|e| e.path.as_deref())),
        processes: FrequencyTable::from_values(entries.iter().map(|e| e.process.as_str())),
        durations: DurationStats::from_durations(&durations),
    })
}
