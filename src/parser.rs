//! Line grammar for fs_usage trace output
//!
//! A line looks like:
//!
//! ```text
//! 12:00:00.123456  open  F=3  (R_____)  /Users/x/my file.txt  0.000050  Finder.1234
//! ```
//!
//! Fields are pulled out by a fixed sequence of extractors, each working on
//! what the previous one left behind:
//!
//! 1. timestamp (`HH:MM:SS.f+`, fraction truncated to milliseconds)
//! 2. operation (next whitespace-delimited token)
//! 3. trailing `<decimal> <token>` pair, anchored at end of line
//! 4. `F=`, `B=`, `D=` tokens anywhere before the trailing pair
//! 5. path, from the first `/` up to the trailing pair
//!
//! Parsing never fails loudly: a line without a timestamp or operation is
//! rejected with `None`, and a line without the trailing pair is still
//! accepted with a zero duration and an `unknown` process.

use crate::entry::{LogEntry, TimeOfDay, UNKNOWN_PROCESS};

/// Parse one trace line into a `LogEntry`, or `None` if it is not a record
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (timestamp_token, rest) = next_token(line);
    let timestamp = parse_timestamp(timestamp_token)?;

    let (operation, rest) = next_token(rest);
    if operation.is_empty() {
        return None;
    }

    let (body, path_region, duration, process) = match trailing_pair(rest) {
        Some(pair) => {
            let body = &rest[..pair.start];
            (body, body, pair.duration, pair.process.to_string())
        }
        // Without the pair, a standalone decimal (e.g. before fs_usage's `W`
        // wait marker) still ends the path.
        None => (rest, path_before_duration(rest), 0.0, UNKNOWN_PROCESS.to_string()),
    };

    let fields = scan_fields(body);

    Some(LogEntry {
        timestamp,
        operation: operation.to_string(),
        file_descriptor: fields.file_descriptor.map(str::to_string),
        bytes: fields.bytes.map(str::to_string),
        device: fields.device.map(str::to_string),
        path: extract_path(path_region).map(str::to_string),
        duration,
        process,
    })
}

/// Split off the first whitespace-delimited token; the remainder is left-trimmed
fn next_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

/// Last whitespace-delimited token of a right-trimmed string, with its byte offset
fn last_token(s: &str) -> (usize, &str) {
    match s.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        Some((idx, c)) => {
            let start = idx + c.len_utf8();
            (start, &s[start..])
        }
        None => (0, s),
    }
}

/// Parse `HH:MM:SS.<digits>`; the fraction is read as a decimal fraction of a
/// second and truncated (never rounded) to milliseconds.
pub(crate) fn parse_timestamp(token: &str) -> Option<TimeOfDay> {
    let bytes = token.as_bytes();
    if bytes.len() < 10 || bytes[2] != b':' || bytes[5] != b':' || bytes[8] != b'.' {
        return None;
    }
    let fraction = &token[9..];
    if !all_digits(&token[0..2])
        || !all_digits(&token[3..5])
        || !all_digits(&token[6..8])
        || !all_digits(fraction)
    {
        return None;
    }

    let hour = token[0..2].parse().ok()?;
    let minute = token[3..5].parse().ok()?;
    let second = token[6..8].parse().ok()?;
    let milli = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    TimeOfDay::from_hms_milli(hour, minute, second, milli)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_hex_literal(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `<digits>` or `<digits>.<digits>`
fn is_decimal(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(s),
    }
}

struct TrailingPair<'a> {
    /// Byte offset of the duration token
    start: usize,
    duration: f64,
    process: &'a str,
}

/// Locate `<decimal><whitespace><token>` at the very end of `rest`
fn trailing_pair(rest: &str) -> Option<TrailingPair<'_>> {
    let (process_start, process) = last_token(rest);
    if process_start == 0 || process.is_empty() {
        return None;
    }
    let before = rest[..process_start].trim_end();
    let (start, duration_token) = last_token(before);
    if !is_decimal(duration_token) {
        return None;
    }
    let duration = duration_token
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())?;
    Some(TrailingPair {
        start,
        duration,
        process,
    })
}

/// `body` up to its last standalone decimal token, if that token follows the path start
fn path_before_duration(body: &str) -> &str {
    match rightmost_decimal_token(body) {
        Some(end) if body.find('/').is_some_and(|start| start < end) => &body[..end],
        _ => body,
    }
}

/// Byte offset of the last standalone `<decimal>` token in `s`
fn rightmost_decimal_token(s: &str) -> Option<usize> {
    let mut found = None;
    let mut rest = s;
    loop {
        let token = rest.trim_start();
        if token.is_empty() {
            return found;
        }
        let start = s.len() - token.len();
        let end = token.find(char::is_whitespace).unwrap_or(token.len());
        if is_decimal(&token[..end]) {
            found = Some(start);
        }
        rest = &token[end..];
    }
}

#[derive(Default)]
struct KeyedFields<'a> {
    file_descriptor: Option<&'a str>,
    bytes: Option<&'a str>,
    device: Option<&'a str>,
}

/// First `F=`, `B=` and `D=` token of each kind, in any order
fn scan_fields(body: &str) -> KeyedFields<'_> {
    let mut fields = KeyedFields::default();
    for token in body.split_whitespace() {
        if let Some(value) = token.strip_prefix("F=") {
            if fields.file_descriptor.is_none() && all_digits(value) {
                fields.file_descriptor = Some(value);
            }
        } else if let Some(value) = token.strip_prefix("B=") {
            if fields.bytes.is_none() && (is_hex_literal(value) || all_digits(value)) {
                fields.bytes = Some(value);
            }
        } else if let Some(value) = token.strip_prefix("D=") {
            if fields.device.is_none() && is_hex_literal(value) {
                fields.device = Some(value);
            }
        }
    }
    fields
}

/// Everything from the first `/` to the end of `body`, spaces included
fn extract_path(body: &str) -> Option<&str> {
    let start = body.find('/')?;
    let path = body[start..].trim_end();
    (!path.is_empty()).then_some(path)
}
