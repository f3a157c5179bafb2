//! JSON output format for analysis results
//!
//! `--format json` emits one document holding whichever sections were asked
//! for. An empty collection serializes its summary as `null`.

use crate::binning::{BinPoint, TimeBins};
use crate::descriptor::{DescriptorActivity, PathActivity};
use crate::entry::LogEntry;
use crate::stats::{RankedValue, SummaryStats};
use serde::{Deserialize, Serialize};

/// Line accounting for the parsed input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonInput {
    pub total_lines: usize,
    pub dropped_lines: usize,
    /// Entries left after filtering
    pub entries: usize,
}

/// Ranked table trimmed to the requested size
#[derive(Debug, Clone, Serialize)]
pub struct JsonTable<'a> {
    pub unique: usize,
    pub top: &'a [RankedValue],
}

/// Summary section
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary<'a> {
    pub total_entries: usize,
    pub min_time: String,
    pub max_time: String,
    pub duration_seconds: f64,
    pub latency_ms: JsonLatency,
    pub operations: JsonTable<'a>,
    pub file_descriptors: JsonTable<'a>,
    pub paths: JsonTable<'a>,
    pub processes: JsonTable<'a>,
}

/// Duration distribution converted to milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonLatency {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Time-bin section
#[derive(Debug, Clone, Serialize)]
pub struct JsonBins {
    pub width_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub points: Vec<BinPoint>,
}

/// One `(process, descriptor)` group
#[derive(Debug, Clone, Serialize)]
pub struct JsonDescriptor<'a> {
    pub process: &'a str,
    pub file_descriptor: &'a str,
    pub paths: &'a [PathActivity],
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    pub input: JsonInput,
    pub summary: Option<JsonSummary<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<JsonBins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptors: Option<Vec<JsonDescriptor<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<&'a LogEntry>>,
}

impl<'a> JsonOutput<'a> {
    /// Create output with the input accounting and the summary section
    pub fn new(input: JsonInput, summary: Option<&'a SummaryStats>, top_n: usize) -> Self {
        Self {
            input,
            summary: summary.map(|s| JsonSummary::from_stats(s, top_n)),
            bins: None,
            descriptors: None,
            entries: None,
        }
    }

    pub fn with_bins(mut self, bins: &TimeBins<'_>) -> Self {
        self.bins = Some(JsonBins {
            width_secs: bins.width(),
            origin: bins.origin().map(|o| o.to_string()),
            points: bins.series(),
        });
        self
    }

    pub fn with_descriptors(mut self, activity: &'a DescriptorActivity) -> Self {
        self.descriptors = Some(
            activity
                .iter()
                .map(|(key, paths)| JsonDescriptor {
                    process: &key.process,
                    file_descriptor: &key.file_descriptor,
                    paths,
                })
                .collect(),
        );
        self
    }

    pub fn with_entries(mut self, entries: Vec<&'a LogEntry>) -> Self {
        self.entries = Some(entries);
        self
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> JsonSummary<'a> {
    fn from_stats(stats: &'a SummaryStats, top_n: usize) -> Self {
        let d = &stats.durations;
        Self {
            total_entries: stats.total_entries,
            min_time: stats.min_time.to_string(),
            max_time: stats.max_time.to_string(),
            duration_seconds: stats.duration_seconds,
            latency_ms: JsonLatency {
                min: d.min_ms(),
                max: d.max_ms(),
                mean: d.mean_ms(),
                median: crate::stats::secs_to_millis(d.median),
                p95: crate::stats::secs_to_millis(d.p95),
                p99: crate::stats::secs_to_millis(d.p99),
            },
            operations: JsonTable {
                unique: stats.operations.unique_count(),
                top: stats.operations.top(top_n),
            },
            file_descriptors: JsonTable {
                unique: stats.file_descriptors.unique_count(),
                top: stats.file_descriptors.top(top_n),
            },
            paths: JsonTable {
                unique: stats.paths.unique_count(),
                top: stats.paths.top(top_n),
            },
            processes: JsonTable {
                unique: stats.processes.unique_count(),
                top: stats.processes.top(top_n),
            },
        }
    }
}
