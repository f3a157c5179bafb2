//! Whole-file ingestion of fs_usage traces
//!
//! Splits raw content into lines, runs each through [`parse_line`], and keeps
//! the entries in original line order. Rejected lines are dropped silently.
//!
//! Large inputs are processed in bounded chunks of lines so a host can report
//! progress between chunks. Chunks never split a line and the collected output
//! is identical for every chunk size.
//!
//! # Example
//!
//! ```
//! use fs_usage_analyzer::ingest::ChunkedParser;
//!
//! let content = "12:00:00.000 open /a 0.1 p\nnoise\n12:00:01.000 close 0.1 p\n";
//! let mut kept = 0;
//! for chunk in ChunkedParser::new(content, 1) {
//!     kept += chunk.entries.len();
//! }
//! assert_eq!(kept, 2);
//! ```

use crate::entry::LogEntry;
use crate::parser::parse_line;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lines per chunk when the caller does not choose one
pub const DEFAULT_CHUNK_LINES: usize = 10_000;

/// Errors reading trace input (reported once per call, never per line)
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Position reached after a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub lines_processed: usize,
    pub entries_kept: usize,
    pub bytes_processed: usize,
    pub total_bytes: usize,
}

impl Progress {
    /// Fraction of input bytes consumed, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            self.bytes_processed as f64 / self.total_bytes as f64
        }
    }
}

/// Entries parsed from one chunk of lines
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChunk {
    pub entries: Vec<LogEntry>,
    /// Lines examined in this chunk, including rejected ones
    pub lines: usize,
    /// Byte offset just past the last line of this chunk
    pub end_offset: usize,
}

/// Outcome of a full parse, with aggregate line accounting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseReport {
    pub entries: Vec<LogEntry>,
    pub total_lines: usize,
    pub dropped_lines: usize,
}

/// Iterator over bounded line chunks of a trace
#[derive(Debug, Clone)]
pub struct ChunkedParser<'a> {
    content: &'a str,
    offset: usize,
    chunk_lines: usize,
}

impl<'a> ChunkedParser<'a> {
    /// Create a parser yielding at most `chunk_lines` lines per chunk (minimum 1)
    pub fn new(content: &'a str, chunk_lines: usize) -> Self {
        Self {
            content,
            offset: 0,
            chunk_lines: chunk_lines.max(1),
        }
    }
}

impl Iterator for ChunkedParser<'_> {
    type Item = ParsedChunk;

    fn next(&mut self) -> Option<ParsedChunk> {
        if self.offset >= self.content.len() {
            return None;
        }

        let mut entries = Vec::new();
        let mut lines = 0;
        while lines < self.chunk_lines && self.offset < self.content.len() {
            let remaining = &self.content[self.offset..];
            let (line, consumed) = match remaining.find('\n') {
                Some(end) => (&remaining[..end], end + 1),
                None => (remaining, remaining.len()),
            };
            self.offset += consumed;
            lines += 1;
            if let Some(entry) = parse_line(line) {
                entries.push(entry);
            }
        }

        Some(ParsedChunk {
            entries,
            lines,
            end_offset: self.offset,
        })
    }
}

/// Parse a whole trace, keeping accepted entries in line order
pub fn parse_content(content: &str) -> Vec<LogEntry> {
    parse_content_with_report(content, DEFAULT_CHUNK_LINES).entries
}

/// Parse a whole trace and count dropped lines
pub fn parse_content_with_report(content: &str, chunk_lines: usize) -> ParseReport {
    let mut report = ParseReport::default();
    parse_chunks(content, chunk_lines, &mut report, |_| {});
    report
}

/// Parse a whole trace, calling `on_progress` after every chunk
pub fn parse_content_with_progress<F>(
    content: &str,
    chunk_lines: usize,
    on_progress: F,
) -> Vec<LogEntry>
where
    F: FnMut(&Progress),
{
    let mut report = ParseReport::default();
    parse_chunks(content, chunk_lines, &mut report, on_progress);
    report.entries
}

fn parse_chunks<F>(content: &str, chunk_lines: usize, report: &mut ParseReport, mut on_progress: F)
where
    F: FnMut(&Progress),
{
    for chunk in ChunkedParser::new(content, chunk_lines) {
        report.total_lines += chunk.lines;
        report.dropped_lines += chunk.lines - chunk.entries.len();
        report.entries.extend(chunk.entries);

        let progress = Progress {
            lines_processed: report.total_lines,
            entries_kept: report.entries.len(),
            bytes_processed: chunk.end_offset,
            total_bytes: content.len(),
        };
        tracing::debug!(
            lines = progress.lines_processed,
            kept = progress.entries_kept,
            bytes = progress.bytes_processed,
            "parsed chunk"
        );
        on_progress(&progress);
    }

    tracing::debug!(
        total_lines = report.total_lines,
        dropped_lines = report.dropped_lines,
        "parse complete"
    );
}

/// Decode raw bytes as UTF-8 and parse them
pub fn parse_bytes(bytes: &[u8], chunk_lines: usize) -> Result<ParseReport> {
    let content = std::str::from_utf8(bytes).map_err(|e| IngestError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    Ok(parse_content_with_report(content, chunk_lines))
}

/// Read and parse a trace file
pub fn parse_file(path: impl AsRef<Path>, chunk_lines: usize) -> Result<ParseReport> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&bytes, chunk_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
12:00:00.100000 open F=3 /tmp/a 0.000010 p.1
this line is noise
12:00:00.200000 read F=3 B=0x10 0.000020 p.1

12:00:01.300000 close F=3 0.000005 p.1
";

    #[test]
    fn test_parse_content_keeps_order_and_drops_noise() {
        let entries = parse_content(SAMPLE);
        let ops: Vec<_> = entries.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, ["open", "read", "close"]);
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_content("").is_empty());
        let report = parse_content_with_report("", 10);
        assert_eq!(report.total_lines, 0);
        assert_eq!(report.dropped_lines, 0);
    }

    #[test]
    fn test_report_counts_dropped_lines() {
        let report = parse_content_with_report(SAMPLE, 2);
        assert_eq!(report.total_lines, 5);
        assert_eq!(report.dropped_lines, 2);
        assert_eq!(report.entries.len(), 3);
    }

    #[test]
    fn test_chunk_size_does_not_change_output() {
        let reference = parse_content(SAMPLE);
        for chunk_lines in [0, 1, 2, 3, 7, 1000] {
            let report = parse_content_with_report(SAMPLE, chunk_lines);
            assert_eq!(report.entries, reference, "chunk_lines = {}", chunk_lines);
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "12:00:00.100 open /tmp/a 0.1 p\r\n12:00:00.200 close 0.1 p\r\n";
        let entries = parse_content(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path.as_deref(), Some("/tmp/a"));
        assert_eq!(entries[1].process, "p");
    }

    #[test]
    fn test_last_line_without_newline() {
        let entries = parse_content("12:00:00.100 open /tmp/a 0.1 p");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_progress_callback_reaches_end() {
        let mut seen = Vec::new();
        let entries = parse_content_with_progress(SAMPLE, 2, |p| seen.push(*p));
        assert_eq!(entries.len(), 3);
        assert_eq!(seen.len(), 3);
        let last = seen.last().unwrap();
        assert_eq!(last.bytes_processed, SAMPLE.len());
        assert_eq!(last.lines_processed, 5);
        assert_eq!(last.fraction(), 1.0);
        assert!(seen.windows(2).all(|w| w[0].bytes_processed < w[1].bytes_processed));
    }

    #[test]
    fn test_chunks_respect_line_bound() {
        let chunks: Vec<_> = ChunkedParser::new(SAMPLE, 2).collect();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.lines <= 2));
    }

    #[test]
    fn test_invalid_utf8_reported_once() {
        let bytes = b"12:00:00.100 open /tmp/a 0.1 p\n\xff\xfe\n";
        let err = parse_bytes(bytes, 10).unwrap_err();
        match err {
            IngestError::InvalidUtf8 { offset } => assert_eq!(offset, 31),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file("/nonexistent/trace.log", 10).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/trace.log"));
    }
}
