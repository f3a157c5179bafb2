use anyhow::{Context, Result};
use clap::Parser;
use fs_usage_analyzer::cli::{Cli, OutputFormat};
use fs_usage_analyzer::config::AnalysisConfig;
use fs_usage_analyzer::filter::{FilterSet, PathMatcher};
use fs_usage_analyzer::json_output::{JsonInput, JsonOutput};
use fs_usage_analyzer::{binning, csv_output, descriptor, ingest, report, stats};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Defaults, then the config file, then command-line overrides
fn load_config(args: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(width) = args.bin_width {
        config.bin_width_secs = width;
    }
    if let Some(top) = args.top {
        config.top_n = top;
    }
    if let Some(chunk_lines) = args.chunk_lines {
        config.chunk_lines = chunk_lines;
    }
    if args.case_sensitive {
        config.case_sensitive_paths = true;
    }

    config.validate()?;
    Ok(config)
}

fn build_filter(args: &Cli, config: &AnalysisConfig) -> Result<FilterSet> {
    let mut filter = FilterSet::all();
    if let Some(fd) = &args.fd {
        filter = filter.with_file_descriptor(fd.as_str());
    }
    if let Some(needle) = &args.path {
        filter = filter.with_path(PathMatcher::substring(needle, config.case_sensitive_paths));
    }
    if let Some(pattern) = &args.path_regex {
        filter = filter.with_path(PathMatcher::regex(pattern, config.case_sensitive_paths)?);
    }
    Ok(filter)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let filter = build_filter(&args, &config)?;

    let parsed = ingest::parse_file(&args.input, config.chunk_lines)
        .with_context(|| format!("Cannot analyze {}", args.input.display()))?;
    tracing::info!(
        lines = parsed.total_lines,
        dropped = parsed.dropped_lines,
        kept = parsed.entries.len(),
        "parsed trace"
    );

    // Filters always run against the full parsed set.
    let entries = filter.apply(&parsed.entries);
    let summary = stats::summary_stats(entries.iter().copied());
    let bins = if args.bins {
        Some(binning::bin_by_time(entries.iter().copied(), config.bin_width_secs)?)
    } else {
        None
    };
    let activity = args
        .descriptors
        .then(|| descriptor::map_descriptor_paths(entries.iter().copied()));

    match args.format {
        OutputFormat::Text => {
            print!("{}", report::render_summary(summary.as_ref(), config.top_n));
            if let Some(bins) = &bins {
                println!();
                print!("{}", report::render_bins(bins));
            }
            if let Some(activity) = &activity {
                println!();
                print!("{}", report::render_descriptors(activity));
            }
            if args.entries {
                println!();
                print!("{}", report::render_entries(entries.iter().copied()));
            }
        }
        OutputFormat::Json => {
            let input = JsonInput {
                total_lines: parsed.total_lines,
                dropped_lines: parsed.dropped_lines,
                entries: entries.len(),
            };
            let mut output = JsonOutput::new(input, summary.as_ref(), config.top_n);
            if let Some(bins) = &bins {
                output = output.with_bins(bins);
            }
            if let Some(activity) = &activity {
                output = output.with_descriptors(activity);
            }
            if args.entries {
                output = output.with_entries(entries.clone());
            }
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => {
            if args.entries {
                print!("{}", csv_output::entries_to_csv(entries.iter().copied()));
            } else if let Some(bins) = &bins {
                print!("{}", csv_output::bins_to_csv(bins));
            } else if let Some(summary) = &summary {
                let tables = [
                    ("operation", &summary.operations),
                    ("fd", &summary.file_descriptors),
                    ("path", &summary.paths),
                    ("process", &summary.processes),
                ];
                let rendered: Vec<String> = tables
                    .iter()
                    .map(|(column, table)| csv_output::table_to_csv(column, table, config.top_n))
                    .collect();
                print!("{}", rendered.join("\n"));
            }
        }
    }

    Ok(())
}
