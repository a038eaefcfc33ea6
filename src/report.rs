use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::ranking::{RankOptions, Ranking};
use crate::stats::{Report, ReportRow};

const GROWTH_DECIMALS: u32 = 3;
const DISPLAY_DATE: &str = "%Y/%m/%d";
const NO_BASELINE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthFormula {
    /// `((current / total) - (previous / baseline_total)) * 100`
    #[default]
    Corrected,
    /// `(current / total) - (previous / baseline_total) * 100`
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

fn ratio(part: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) / Decimal::from(total)
}

/// Percentage growth rounded half-up to three places.
pub fn growth(
    formula: GrowthFormula,
    current: u64,
    total_current: u64,
    previous: Option<u64>,
    total_baseline: u64,
) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let share = ratio(current, total_current);
    let raw = match previous {
        None => share * hundred,
        Some(previous) => {
            let previous_share = ratio(previous, total_baseline);
            match formula {
                GrowthFormula::Corrected => (share - previous_share) * hundred,
                GrowthFormula::Legacy => share - previous_share * hundred,
            }
        }
    };
    raw.round_dp_with_strategy(GROWTH_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

pub fn build_report(ranking: &Ranking, options: &RankOptions, formula: GrowthFormula) -> Report {
    let mut rows: Vec<ReportRow> = ranking
        .top
        .iter()
        .map(|entry| {
            let previous_count = ranking.baseline_count(&entry.domain);
            ReportRow {
                growth_pct: growth(
                    formula,
                    entry.count,
                    ranking.grand_total_current,
                    previous_count,
                    ranking.grand_total_baseline,
                ),
                domain: entry.domain.clone(),
                current_count: entry.count,
                previous_count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.growth_pct
            .cmp(&a.growth_pct)
            .then_with(|| b.current_count.cmp(&a.current_count))
            .then_with(|| a.domain.cmp(&b.domain))
    });

    Report {
        today: options.today,
        cutoff: ranking.cutoff,
        window_days: options.window_days,
        top: options.top,
        formula,
        baseline: options.baseline,
        grand_total_current: ranking.grand_total_current,
        grand_total_baseline: ranking.grand_total_baseline,
        rows,
    }
}

fn table_line(out: &mut String, changed: &str, current: &str, previous: &str, domain: &str) {
    let _ = writeln!(out, "{changed:<9}|{current:<19}|{previous:<19}|{domain}");
}

pub fn render_text(report: &Report) -> String {
    let today = report.today.format(DISPLAY_DATE).to_string();
    let cutoff = report.cutoff.format(DISPLAY_DATE).to_string();

    let mut out = format!(
        "The top {} domains by count. Ordered by percentage growth, between {} and {} \n\n",
        report.top, today, cutoff
    );
    table_line(
        &mut out,
        "% Changed",
        &format!("Count on {today}"),
        &format!("Count on {cutoff}"),
        "Domain",
    );

    for row in &report.rows {
        let previous = row
            .previous_count
            .map_or_else(|| NO_BASELINE.to_string(), |count| count.to_string());
        table_line(
            &mut out,
            &format!("{:>7}", format!("{:.3}", row.growth_pct)),
            &format!("{:>10}", row.current_count),
            &format!("{:>10}", previous),
            &row.domain,
        );
    }
    out
}

pub fn render_json(report: &Report) -> Result<String> {
    let mut body = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    body.push('\n');
    Ok(body)
}

pub fn write_report(path: &Path, report: &Report, format: ReportFormat) -> Result<()> {
    let body = match format {
        ReportFormat::Text => render_text(report),
        ReportFormat::Json => render_json(report)?,
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(body.as_bytes())
        .with_context(|| format!("Failed to write report file {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {:?}", path))?;

    info!(
        action = "write",
        component = "reporter",
        path = ?path,
        rows = report.rows.len(),
        format = ?format,
        "Report written"
    );
    Ok(())
}
