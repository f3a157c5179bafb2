//! Fixed-width time bins anchored at the earliest timestamp
//!
//! Bins are sparse: only intervals holding at least one entry exist. Each bin
//! is keyed by its integer index from the origin, and its start is always
//! recomputed as `origin + index * width` so identical timestamps land in the
//! same bin no matter how many bins precede them.
//!
//! Widths are quantized to whole nanoseconds and offsets are measured in
//! nanoseconds, so bin assignment is exact integer division.

use crate::entry::{LogEntry, TimeOfDay};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinningError {
    #[error("Invalid bin width: {0} (must be a finite number of seconds > 0)")]
    InvalidWidth(f64),

    #[error("Bin width {0} s is below the 1 ns binning resolution")]
    BelowResolution(f64),
}

const NANOS_PER_SECOND: f64 = 1e9;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Entries grouped into fixed-width time bins
#[derive(Debug, Clone)]
pub struct TimeBins<'a> {
    origin: Option<TimeOfDay>,
    width_nanos: u64,
    bins: BTreeMap<u64, Vec<&'a LogEntry>>,
}

/// A borrowed view of one non-empty bin
#[derive(Debug, Clone, Copy)]
pub struct TimeBin<'b, 'a> {
    pub index: u64,
    /// Bin start in seconds since midnight
    pub start: f64,
    pub entries: &'b [&'a LogEntry],
}

/// One point of a chart series
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BinPoint {
    /// Bin start in seconds since midnight
    pub start: f64,
    pub count: usize,
    pub total_duration_secs: f64,
}

/// Group entries into bins of `width` seconds starting at the earliest timestamp
///
/// # Errors
///
/// Returns `BinningError::InvalidWidth` for zero, negative or non-finite
/// widths, and `BinningError::BelowResolution` for widths that round to less
/// than one nanosecond.
pub fn bin_by_time<'a, I>(entries: I, width: f64) -> Result<TimeBins<'a>, BinningError>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let width_nanos = quantize_width(width)?;

    let entries: Vec<&'a LogEntry> = entries.into_iter().collect();
    let origin = entries.iter().map(|e| e.timestamp).min();

    let mut bins: BTreeMap<u64, Vec<&'a LogEntry>> = BTreeMap::new();
    if let Some(origin) = origin {
        for entry in entries {
            let offset = offset_nanos(entry.timestamp, origin);
            bins.entry(offset / width_nanos).or_default().push(entry);
        }
        tracing::trace!(origin = %origin, width, bins = bins.len(), "binned entries");
    }

    Ok(TimeBins {
        origin,
        width_nanos,
        bins,
    })
}

fn quantize_width(width: f64) -> Result<u64, BinningError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(BinningError::InvalidWidth(width));
    }
    let nanos = (width * NANOS_PER_SECOND).round();
    if nanos < 1.0 {
        return Err(BinningError::BelowResolution(width));
    }
    // Saturates for absurdly wide bins, which then hold everything in bin 0.
    Ok(nanos as u64)
}

/// Nanoseconds from `origin` to `timestamp`; zero if `timestamp` precedes it
fn offset_nanos(timestamp: TimeOfDay, origin: TimeOfDay) -> u64 {
    u64::from(timestamp.as_millis().saturating_sub(origin.as_millis())) * NANOS_PER_MILLI
}

impl<'a> TimeBins<'a> {
    /// Earliest timestamp in the binned set, `None` when empty
    pub fn origin(&self) -> Option<TimeOfDay> {
        self.origin
    }

    /// Bin width in seconds, after quantization
    pub fn width(&self) -> f64 {
        self.width_nanos as f64 / NANOS_PER_SECOND
    }

    pub fn width_nanos(&self) -> u64 {
        self.width_nanos
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Offset of bin `index` from the origin, in nanoseconds
    pub fn start_offset_nanos(&self, index: u64) -> u128 {
        u128::from(index) * u128::from(self.width_nanos)
    }

    /// Offset of bin `index` from the origin, in seconds
    pub fn start_offset(&self, index: u64) -> f64 {
        self.start_offset_nanos(index) as f64 / NANOS_PER_SECOND
    }

    /// Offset of `timestamp` from the origin in nanoseconds, `None` when empty
    pub fn offset_of(&self, timestamp: TimeOfDay) -> Option<u64> {
        self.origin.map(|origin| offset_nanos(timestamp, origin))
    }

    /// Start of bin `index` in seconds since midnight
    pub fn start_of(&self, index: u64) -> f64 {
        let origin = self.origin.map_or(0.0, |o| o.as_secs_f64());
        origin + self.start_offset(index)
    }

    /// Entries in bin `index`, if that bin is non-empty
    pub fn get(&self, index: u64) -> Option<&[&'a LogEntry]> {
        self.bins.get(&index).map(Vec::as_slice)
    }

    /// Non-empty bins in time order
    pub fn iter(&self) -> impl Iterator<Item = TimeBin<'_, 'a>> + '_ {
        self.bins.iter().map(move |(&index, entries)| TimeBin {
            index,
            start: self.start_of(index),
            entries,
        })
    }

    /// Per-bin counts and summed durations, in time order
    pub fn series(&self) -> Vec<BinPoint> {
        self.iter()
            .map(|bin| BinPoint {
                start: bin.start,
                count: bin.entries.len(),
                total_duration_secs: bin.entries.iter().map(|e| e.duration).sum(),
            })
            .collect()
    }

    /// Total number of binned entries
    pub fn entry_count(&self) -> usize {
        self.bins.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(millis: u32) -> LogEntry {
        LogEntry {
            timestamp: TimeOfDay::from_millis(millis).unwrap(),
            operation: "read".to_string(),
            file_descriptor: None,
            bytes: None,
            device: None,
            path: None,
            duration: 0.001,
            process: "p".to_string(),
        }
    }

    const T0: u32 = 12 * 3_600_000;

    #[test]
    fn test_two_bins_one_second_width() {
        let entries = vec![entry_at(T0), entry_at(T0 + 50), entry_at(T0 + 1200)];
        let bins = bin_by_time(&entries, 1.0).unwrap();

        assert_eq!(bins.len(), 2);
        assert_eq!(bins.get(0).unwrap().len(), 2);
        assert_eq!(bins.get(1).unwrap().len(), 1);
        assert_eq!(bins.start_of(0), 43_200.0);
        assert_eq!(bins.start_of(1), 43_201.0);
    }

    #[test]
    fn test_empty_input_gives_empty_bins() {
        let entries: Vec<LogEntry> = Vec::new();
        let bins = bin_by_time(&entries, 1.0).unwrap();
        assert!(bins.is_empty());
        assert!(bins.origin().is_none());
        assert!(bins.series().is_empty());
    }

    #[test]
    fn test_invalid_widths_rejected() {
        let entries = vec![entry_at(T0)];
        for width in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-12] {
            assert!(bin_by_time(&entries, width).is_err(), "width {}", width);
        }
    }

    #[test]
    fn test_sub_nanosecond_width_is_resolution_error() {
        let entries = vec![entry_at(T0)];
        assert_eq!(
            bin_by_time(&entries, 1e-10).unwrap_err(),
            BinningError::BelowResolution(1e-10)
        );
        assert_eq!(
            bin_by_time(&entries, 0.0).unwrap_err(),
            BinningError::InvalidWidth(0.0)
        );
        let err = BinningError::BelowResolution(1e-10).to_string();
        assert!(err.contains("resolution"), "{}", err);
        assert!(bin_by_time(&entries, 1e-9).is_ok());
    }

    #[test]
    fn test_sparse_bins_skip_gaps() {
        let entries = vec![entry_at(T0), entry_at(T0 + 5_000)];
        let bins = bin_by_time(&entries, 1.0).unwrap();
        let indices: Vec<u64> = bins.iter().map(|b| b.index).collect();
        assert_eq!(indices, [0, 5]);
    }

    #[test]
    fn test_origin_is_minimum_not_first() {
        let entries = vec![entry_at(T0 + 900), entry_at(T0), entry_at(T0 + 1000)];
        let bins = bin_by_time(&entries, 0.5).unwrap();
        assert_eq!(bins.origin(), Some(TimeOfDay::from_millis(T0).unwrap()));
        assert_eq!(bins.get(0).unwrap().len(), 1);
        assert_eq!(bins.get(1).unwrap().len(), 1);
        assert_eq!(bins.get(2).unwrap().len(), 1);
    }

    #[test]
    fn test_fractional_width_boundaries() {
        let entries: Vec<LogEntry> = (0..10).map(|i| entry_at(T0 + i * 100)).collect();
        let bins = bin_by_time(&entries, 0.1).unwrap();
        assert_eq!(bins.len(), 10);
        for bin in bins.iter() {
            assert_eq!(bin.entries.len(), 1);
            let offset = u128::from(bins.offset_of(bin.entries[0].timestamp).unwrap());
            let start = bins.start_offset_nanos(bin.index);
            assert!(start <= offset);
            assert!(offset < start + u128::from(bins.width_nanos()));
        }
    }

    #[test]
    fn test_identical_timestamps_share_bin() {
        let entries = vec![entry_at(T0), entry_at(T0 + 700), entry_at(T0 + 700)];
        let bins = bin_by_time(&entries, 0.1).unwrap();
        assert_eq!(bins.get(7).unwrap().len(), 2);
    }

    #[test]
    fn test_width_quantized_to_nanos() {
        let entries = vec![entry_at(T0)];
        let bins = bin_by_time(&entries, 0.1).unwrap();
        assert_eq!(bins.width_nanos(), 100_000_000);
        assert_eq!(bins.width(), 0.1);
    }

    #[test]
    fn test_series_totals() {
        let entries = vec![entry_at(T0), entry_at(T0 + 10), entry_at(T0 + 2500)];
        let bins = bin_by_time(&entries, 1.0).unwrap();
        let series = bins.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].count, 2);
        assert!((series[0].total_duration_secs - 0.002).abs() < 1e-12);
        assert_eq!(series[1].start, 43_202.0);
        assert_eq!(bins.entry_count(), 3);
    }
}
