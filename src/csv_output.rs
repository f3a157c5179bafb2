//! CSV output format for parsed entries and ranked tables

use crate::binning::TimeBins;
use crate::entry::LogEntry;
use crate::stats::FrequencyTable;

const ENTRY_HEADER: &str = "timestamp,operation,fd,bytes,device,path,duration_s,process";

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    // If field contains comma, quote, or newline, wrap in quotes and escape quotes
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn optional_field(field: Option<&str>) -> String {
    field.map(escape_field).unwrap_or_default()
}

/// Format an entry as CSV row
fn format_entry(entry: &LogEntry) -> String {
    [
        entry.timestamp.to_string(),
        escape_field(&entry.operation),
        optional_field(entry.file_descriptor.as_deref()),
        optional_field(entry.bytes.as_deref()),
        optional_field(entry.device.as_deref()),
        optional_field(entry.path.as_deref()),
        format!("{:.6}", entry.duration),
        escape_field(&entry.process),
    ]
    .join(",")
}

/// Generate CSV for a sequence of entries, header first
pub fn entries_to_csv<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut output = String::new();
    output.push_str(ENTRY_HEADER);
    output.push('\n');
    for entry in entries {
        output.push_str(&format_entry(entry));
        output.push('\n');
    }
    output
}

/// Generate CSV for one ranked table: `rank,<column>,count`
pub fn table_to_csv(column: &str, table: &FrequencyTable, top_n: usize) -> String {
    let mut output = format!("rank,{},count\n", escape_field(column));
    for (rank, row) in table.top(top_n).iter().enumerate() {
        output.push_str(&format!(
            "{},{},{}\n",
            rank + 1,
            escape_field(&row.value),
            row.count
        ));
    }
    output
}

/// Generate CSV for the bin series: `bin_start_s,count,total_duration_s`
pub fn bins_to_csv(bins: &TimeBins<'_>) -> String {
    let mut output = String::from("bin_start_s,count,total_duration_s\n");
    for point in bins.series() {
        output.push_str(&format!(
            "{:.3},{},{:.6}\n",
            point.start, point.count, point.total_duration_secs
        ));
    }
    output
}
