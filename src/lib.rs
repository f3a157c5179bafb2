//! fs-usage-analyzer - parse and summarize fs_usage filesystem activity traces
//!
//! This library turns the text output of a filesystem-activity monitor into
//! structured entries, then filters, time-bins and ranks them. Every stage is
//! a pure function of its input collection; nothing is cached between calls.
//!
//! ```
//! use fs_usage_analyzer::{binning, filter, ingest, stats};
//!
//! let content = "\
//! 12:00:00.100000 open F=3 /Users/x/file.txt 0.000050 Finder.88
//! 12:00:01.200000 close F=3 0.000010 Finder.88
//! ";
//! let entries = ingest::parse_content(content);
//! let fd3 = filter::filter_by_file_descriptor(&entries, "3");
//! let bins = binning::bin_by_time(fd3.iter().copied(), 1.0).unwrap();
//! let summary = stats::summary_stats(fd3.iter().copied()).unwrap();
//!
//! assert_eq!(bins.len(), 2);
//! assert_eq!(summary.total_entries, 2);
//! ```

pub mod binning;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod descriptor;
pub mod entry;
pub mod filter;
pub mod ingest;
pub mod json_output;
pub mod parser;
pub mod report;
pub mod stats;

pub use entry::{LogEntry, TimeOfDay};
pub use parser::parse_line;
