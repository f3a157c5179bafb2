//! Entry filtering by file descriptor and path
//!
//! Supports:
//! - Exact descriptor match: `--fd 3` (string equality, "07" != "7")
//! - Path substring: `--path Library` (case-insensitive unless asked otherwise)
//! - Path regex: `--path-regex '\.sqlite(-wal)?$'`
//!
//! Filters are predicates with no state. A `FilterSet` is always applied to
//! the full, unfiltered collection; changing one parameter means building a
//! new set and re-applying it, never narrowing a previous result.

use crate::entry::LogEntry;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// How a path filter decides a match
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Substring test; `needle` is pre-lowercased when case-insensitive
    Substring { needle: String, case_sensitive: bool },
    Regex(Regex),
}

impl PathMatcher {
    /// Match paths containing `needle`
    pub fn substring(needle: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };
        Self::Substring {
            needle,
            case_sensitive,
        }
    }

    /// Match paths against a regular expression
    pub fn regex(pattern: &str, case_sensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .with_context(|| format!("Invalid path regex: {}", pattern))?;
        Ok(Self::Regex(regex))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Substring {
                needle,
                case_sensitive: true,
            } => path.contains(needle.as_str()),
            Self::Substring {
                needle,
                case_sensitive: false,
            } => path.to_lowercase().contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(path),
        }
    }
}

/// Descriptor and path predicates combined with logical AND
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub file_descriptor: Option<String>,
    pub path: Option<PathMatcher>,
}

impl FilterSet {
    /// A filter set that keeps every entry
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_file_descriptor(mut self, fd: impl Into<String>) -> Self {
        self.file_descriptor = Some(fd.into());
        self
    }

    pub fn with_path(mut self, matcher: PathMatcher) -> Self {
        self.path = Some(matcher);
        self
    }

    /// True when no predicate is active
    pub fn is_empty(&self) -> bool {
        self.file_descriptor.is_none() && self.path.is_none()
    }

    /// Check whether an entry passes every active predicate
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(fd) = &self.file_descriptor {
            if entry.file_descriptor.as_deref() != Some(fd.as_str()) {
                return false;
            }
        }
        match (&self.path, entry.path.as_deref()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(matcher), Some(path)) => matcher.matches(path),
        }
    }

    /// Keep the entries that pass, in their original order
    pub fn apply<'a, I>(&self, entries: I) -> Vec<&'a LogEntry>
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Keep entries whose descriptor equals `fd` exactly
pub fn filter_by_file_descriptor<'a, I>(entries: I, fd: &str) -> Vec<&'a LogEntry>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    FilterSet::all().with_file_descriptor(fd).apply(entries)
}

/// Keep entries with a path containing `needle`
pub fn filter_by_path<'a, I>(entries: I, needle: &str, case_sensitive: bool) -> Vec<&'a LogEntry>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    FilterSet::all()
        .with_path(PathMatcher::substring(needle, case_sensitive))
        .apply(entries)
}
