// Shared helpers for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Path to the checked-in sample trace
pub fn sample_trace() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample_fs_usage.log")
}

/// Write `content` to a temporary trace file kept alive by the returned handle
pub fn write_trace(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp trace");
    file.write_all(content).expect("write temp trace");
    file.flush().expect("flush temp trace");
    file
}
