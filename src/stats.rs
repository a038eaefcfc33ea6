use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ranking::Baseline;
use crate::reader::ReadStats;
use crate::report::GrowthFormula;

/// One well-formed source line: the day it was logged and the domain part of the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedDomain {
    pub domain: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub growth_pct: Decimal,
    pub domain: String,
    pub current_count: u64,
    /// `None` when the domain has no entry on the baseline side of the cutoff.
    pub previous_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub today: NaiveDate,
    pub cutoff: NaiveDate,
    pub window_days: u32,
    pub top: usize,
    pub formula: GrowthFormula,
    pub baseline: Baseline,
    pub grand_total_current: u64,
    pub grand_total_baseline: u64,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub read_stats: ReadStats,
    pub distinct_keys: usize,
    pub report: Report,
}
