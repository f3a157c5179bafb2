#![no_main]

use libfuzzer_sys::fuzz_target;
use fs_usage_analyzer::ingest;

fuzz_target!(|data: &[u8]| {
    // Undecodable input must surface as an error, never a panic
    let Ok(report) = ingest::parse_bytes(data, 64) else {
        return;
    };
    assert_eq!(
        report.total_lines,
        report.entries.len() + report.dropped_lines
    );
    for entry in &report.entries {
        assert!(!entry.operation.is_empty());
        assert!(entry.duration >= 0.0);
    }
});
