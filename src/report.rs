//! Plain-text rendering of summaries, bins and descriptor activity
//!
//! Tables follow the strace `-c` layout: fixed-width numeric columns, a
//! dashed rule, then the value column.

use crate::binning::TimeBins;
use crate::descriptor::DescriptorActivity;
use crate::entry::{LogEntry, TimeOfDay};
use crate::stats::{secs_to_millis, FrequencyTable, SummaryStats};
use std::fmt;

const RULE: &str = "--------- ------ ----------------";

/// Render a summary, or the no-data notice when there is none
pub fn render_summary(stats: Option<&SummaryStats>, top_n: usize) -> String {
    match stats {
        Some(stats) => SummaryReport { stats, top_n }.to_string(),
        None => "No entries to summarize.\n".to_string(),
    }
}

struct SummaryReport<'a> {
    stats: &'a SummaryStats,
    top_n: usize,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        let d = &stats.durations;
        writeln!(f, "Entries:    {}", stats.total_entries)?;
        writeln!(
            f,
            "Time range: {} - {} ({:.3} s)",
            stats.min_time, stats.max_time, stats.duration_seconds
        )?;
        writeln!(
            f,
            "Latency:    min {:.3} ms  max {:.3} ms  avg {:.3} ms  p50 {:.3} ms  p95 {:.3} ms  p99 {:.3} ms",
            d.min_ms(),
            d.max_ms(),
            d.mean_ms(),
            secs_to_millis(d.median),
            secs_to_millis(d.p95),
            secs_to_millis(d.p99),
        )?;

        write_table(f, "Operations", "operation", &stats.operations, self.top_n)?;
        write_table(f, "File descriptors", "fd", &stats.file_descriptors, self.top_n)?;
        write_table(f, "Paths", "path", &stats.paths, self.top_n)?;
        write_table(f, "Processes", "process", &stats.processes, self.top_n)
    }
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    column: &str,
    table: &FrequencyTable,
    top_n: usize,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{} ({} unique)", title, table.unique_count())?;
    if table.is_empty() {
        return writeln!(f, "  (none)");
    }

    let total = table.total();
    writeln!(f, "    count      % {}", column)?;
    writeln!(f, "{}", RULE)?;
    for row in table.top(top_n) {
        let percent = if total > 0 {
            row.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        writeln!(f, "{:>9} {:>6.2} {}", row.count, percent, row.value)?;
    }
    let hidden = table.unique_count().saturating_sub(top_n);
    if hidden > 0 {
        writeln!(f, "{:>9} {:>6} ... {} more", "", "", hidden)?;
    }
    writeln!(f, "{}", RULE)?;
    writeln!(f, "{:>9} 100.00 total", total)
}

/// Format seconds since midnight as a clock time, falling back to raw seconds
fn format_clock(secs: f64) -> String {
    let millis = (secs * 1000.0).round();
    if millis >= 0.0 && millis <= f64::from(u32::MAX) {
        if let Some(t) = TimeOfDay::from_millis(millis as u32) {
            return t.to_string();
        }
    }
    format!("{:.3}s", secs)
}

/// Render the bin series, one line per non-empty bin
pub fn render_bins(bins: &TimeBins<'_>) -> String {
    BinsReport(bins).to_string()
}

struct BinsReport<'b, 'a>(&'b TimeBins<'a>);

impl fmt::Display for BinsReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bins = self.0;
        writeln!(f, "Time bins ({} s wide, {} non-empty)", bins.width(), bins.len())?;
        writeln!(f, "       start     count   total ms")?;
        writeln!(f, "------------ --------- ----------")?;
        for point in bins.series() {
            writeln!(
                f,
                "{:>12} {:>9} {:>10.3}",
                format_clock(point.start),
                point.count,
                secs_to_millis(point.total_duration_secs)
            )?;
        }
        Ok(())
    }
}

/// Render paths per `(process, descriptor)`
pub fn render_descriptors(activity: &DescriptorActivity) -> String {
    if activity.is_empty() {
        return "No descriptor activity.\n".to_string();
    }
    DescriptorReport(activity).to_string()
}

struct DescriptorReport<'a>(&'a DescriptorActivity);

impl fmt::Display for DescriptorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, paths) in self.0 {
            writeln!(f, "{} fd {}", key.process, key.file_descriptor)?;
            for path in paths {
                writeln!(
                    f,
                    "  {:>7}  {} - {}  {}",
                    path.count, path.first_seen, path.last_seen, path.path
                )?;
            }
        }
        Ok(())
    }
}

/// Render entries one per line, in collection order
pub fn render_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    entries
        .into_iter()
        .map(|entry| format!("{}\n", EntryLine(entry)))
        .collect()
}

struct EntryLine<'a>(&'a LogEntry);

impl fmt::Display for EntryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.0;
        write!(f, "{} {:<12}", entry.timestamp, entry.operation)?;
        if let Some(fd) = &entry.file_descriptor {
            write!(f, " F={}", fd)?;
        }
        if let Some(bytes) = &entry.bytes {
            write!(f, " B={}", bytes)?;
        }
        if let Some(device) = &entry.device {
            write!(f, " D={}", device)?;
        }
        if let Some(path) = &entry.path {
            write!(f, " {}", path)?;
        }
        write!(f, " {:.6} {}", entry.duration, entry.process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::bin_by_time;
    use crate::descriptor::map_descriptor_paths;
    use crate::ingest::parse_content;
    use crate::stats::summary_stats;

    const SAMPLE: &str = "\
12:00:00.100 open F=3 /tmp/a 0.001 p.1
12:00:00.200 read F=3 B=0x10 /tmp/a 0.002 p.1
12:00:01.300 close F=3 /tmp/a 0.003 p.1
";

    #[test]
    fn test_render_no_data() {
        assert_eq!(render_summary(None, 10), "No entries to summarize.\n");
    }

    #[test]
    fn test_render_summary_sections() {
        let entries = parse_content(SAMPLE);
        let stats = summary_stats(&entries);
        let text = render_summary(stats.as_ref(), 10);
        assert!(text.contains("Entries:    3"));
        assert!(text.contains("12:00:00.100 - 12:00:01.300"));
        assert!(text.contains("avg 2.000 ms"));
        assert!(text.contains("Operations (3 unique)"));
        assert!(text.contains("/tmp/a"));
        assert!(text.contains("total"));
    }

    #[test]
    fn test_render_summary_truncates() {
        let entries = parse_content(SAMPLE);
        let stats = summary_stats(&entries);
        let text = render_summary(stats.as_ref(), 1);
        assert!(text.contains("... 2 more"));
    }

    #[test]
    fn test_render_bins() {
        let entries = parse_content(SAMPLE);
        let bins = bin_by_time(&entries, 1.0).unwrap();
        let text = render_bins(&bins);
        assert!(text.contains("12:00:00.100"));
        assert!(text.contains("12:00:01.100"));
    }

    #[test]
    fn test_render_descriptors() {
        let entries = parse_content(SAMPLE);
        let text = render_descriptors(&map_descriptor_paths(&entries));
        assert!(text.contains("p.1 fd 3"));
        assert!(text.contains("12:00:00.100 - 12:00:01.300  /tmp/a"));
    }

    #[test]
    fn test_render_table_layout() {
        let entries = parse_content(SAMPLE);
        let stats = summary_stats(&entries);
        let text = render_summary(stats.as_ref(), 10);
        let table: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("File descriptors"))
            .take(6)
            .collect();
        assert_eq!(
            table,
            [
                "File descriptors (1 unique)",
                "    count      % fd",
                RULE,
                "        3 100.00 3",
                RULE,
                "        3 100.00 total",
            ]
        );
    }

    #[test]
    fn test_render_entries() {
        let entries = parse_content(SAMPLE);
        let text = render_entries(&entries);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("B=0x10"));
    }
}
