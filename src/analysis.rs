use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::domain::SkipReason;
use crate::ranking::{rank, RankOptions};
use crate::reader::open_records;
use crate::report::{build_report, write_report};
use crate::stats::AnalysisResult;
use crate::utils::{ensure_outputs_spare_source, format_number};
use crate::{sqlite, Args};

pub const NOTICE_TIME: &str = "%I:%M:%S %p";

/// Runs the whole pipeline once: read, aggregate, rank, report.
pub fn run(args: &Args) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", input = ?args.input, output = ?args.output, "Starting domain growth analysis");
    ensure_outputs_spare_source(args)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let options = RankOptions {
        today,
        window_days: args.days,
        top: args.top,
        baseline: args.baseline,
    };

    let mut records = open_records(&args.input)?;
    let counts = aggregate(records.by_ref())
        .with_context(|| format!("Failed to read source file {:?}", args.input))?;
    let read_stats = records.into_stats();

    if read_stats.skipped_total() > 0 {
        for reason in SkipReason::ALL {
            let skipped = read_stats.skipped_for(reason);
            if skipped > 0 {
                warn!(action = "skip", component = "reader", reason = reason.as_str(), lines = skipped, "Skipped malformed lines");
            }
        }
    }

    if let Some(db_path) = &args.counts_db {
        sqlite::write_daily_counts(db_path, &counts)?;
    }

    let ranking = rank(&counts, &options);
    let report = build_report(&ranking, &options, args.formula);
    write_report(&args.output, &report, args.format)?;

    info!(
        action = "complete",
        component = "analysis",
        lines = read_stats.lines,
        records = read_stats.records,
        skipped = read_stats.skipped_total(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );

    Ok(AnalysisResult {
        read_stats,
        distinct_keys: counts.len(),
        report,
    })
}

pub fn print_start_notice() {
    println!("{} Program starting...", Local::now().format(NOTICE_TIME));
}

pub fn print_analysis_results(result: &AnalysisResult, args: &Args) {
    let stats = &result.read_stats;
    println!(
        "Read {} lines: {} records, {} skipped, {} day/domain pairs",
        format_number(stats.lines),
        format_number(stats.records),
        format_number(stats.skipped_total()),
        format_number(result.distinct_keys as u64)
    );
    println!(
        "Ranked {} domains between {} and {}",
        result.report.rows.len(),
        result.report.today,
        result.report.cutoff
    );

    let location = fs::canonicalize(&args.output).unwrap_or_else(|_| args.output.clone());
    let name = args
        .output
        .file_name()
        .map_or_else(|| args.output.display().to_string(), |n| n.to_string_lossy().into_owned());
    println!(
        "\n\n{} {} Completed - LOCATION: {} \n\n",
        Local::now().format(NOTICE_TIME),
        name,
        location.display()
    );
}
