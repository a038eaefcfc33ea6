use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::ranking::{Baseline, DEFAULT_TOP, DEFAULT_WINDOW_DAYS};
use crate::report::{GrowthFormula, ReportFormat};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "topdomains",
    about = "Rank the most common email domains by growth over a trailing window",
    version,
    long_about = None
)]
pub struct Args {
    /// Source file of `<date>,<email>` lines (read-only)
    #[arg(short, long, default_value = "emailData.txt")]
    pub input: PathBuf,

    /// Report file to write
    #[arg(short, long, default_value = "Top50DomainData.txt")]
    pub output: PathBuf,

    /// Size of the trailing window in days
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub days: u32,

    /// Number of domains to rank
    #[arg(short, long, default_value_t = DEFAULT_TOP)]
    pub top: usize,

    /// Treat this date (YYYY-MM-DD) as today instead of the local date
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Growth formula
    #[arg(long, value_enum, default_value_t = GrowthFormula::Corrected)]
    pub formula: GrowthFormula,

    /// Side of the cutoff summed into the baseline counts
    #[arg(long, value_enum, default_value_t = Baseline::Older)]
    pub baseline: Baseline,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Also store the daily domain counts in this SQLite database
    #[arg(long)]
    pub counts_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_run() {
        let args = Args::parse_from(["topdomains"]);
        assert_eq!(args.input, PathBuf::from("emailData.txt"));
        assert_eq!(args.output, PathBuf::from("Top50DomainData.txt"));
        assert_eq!(args.days, 30);
        assert_eq!(args.top, 50);
        assert_eq!(args.today, None);
        assert_eq!(args.formula, GrowthFormula::Corrected);
        assert_eq!(args.baseline, Baseline::Older);
        assert_eq!(args.format, ReportFormat::Text);
    }

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "topdomains",
            "--days",
            "7",
            "--today",
            "2024-02-15",
            "--formula",
            "legacy",
            "--baseline",
            "newer",
            "--format",
            "json",
            "--counts-db",
            "counts.db",
        ]);
        assert_eq!(args.days, 7);
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 2, 15));
        assert_eq!(args.formula, GrowthFormula::Legacy);
        assert_eq!(args.baseline, Baseline::Newer);
        assert_eq!(args.format, ReportFormat::Json);
        assert_eq!(args.counts_db, Some(PathBuf::from("counts.db")));
    }

    #[test]
    fn rejects_bad_today() {
        assert!(Args::try_parse_from(["topdomains", "--today", "15/02/2024"]).is_err());
    }
}
