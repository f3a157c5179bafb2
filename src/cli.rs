//! CLI argument parsing for fs-usage-analyzer

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "fs-usage-analyzer")]
#[command(version)]
#[command(about = "Parse, filter, time-bin and summarize fs_usage traces", long_about = None)]
pub struct Cli {
    /// fs_usage trace file to analyze
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// TOML config file (flags override its values)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Time bin width in seconds (fractional allowed, e.g. 0.1)
    #[arg(short = 'w', long = "bin-width", value_name = "SECS")]
    pub bin_width: Option<f64>,

    /// Keep only entries with this exact file descriptor
    #[arg(long = "fd", value_name = "FD")]
    pub fd: Option<String>,

    /// Keep only entries whose path contains this substring
    #[arg(long = "path", value_name = "SUBSTRING", conflicts_with = "path_regex")]
    pub path: Option<String>,

    /// Keep only entries whose path matches this regex
    #[arg(long = "path-regex", value_name = "REGEX")]
    pub path_regex: Option<String>,

    /// Match path filters case-sensitively
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Rows to show in ranked tables
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Lines parsed per chunk
    #[arg(long = "chunk-lines", value_name = "N")]
    pub chunk_lines: Option<usize>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show the time-bin series
    #[arg(long = "bins")]
    pub bins: bool,

    /// Show paths per (process, descriptor)
    #[arg(long = "descriptors")]
    pub descriptors: bool,

    /// Show every (filtered) entry
    #[arg(long = "entries")]
    pub entries: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
