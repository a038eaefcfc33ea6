use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::aggregate::DomainDateCounts;
use crate::stats::RankedDomain;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_TOP: usize = 50;

/// Which side of the window cutoff is summed into the baseline totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    /// Dates at or before the cutoff.
    #[default]
    Older,
    /// Dates strictly after the cutoff.
    Newer,
}

impl Baseline {
    fn includes(self, date: NaiveDate, cutoff: NaiveDate) -> bool {
        match self {
            Self::Older => date <= cutoff,
            Self::Newer => date > cutoff,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub today: NaiveDate,
    pub window_days: u32,
    pub top: usize,
    pub baseline: Baseline,
}

impl RankOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            window_days: DEFAULT_WINDOW_DAYS,
            top: DEFAULT_TOP,
            baseline: Baseline::default(),
        }
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub cutoff: NaiveDate,
    /// Highest all-time totals, descending, at most `top` entries.
    pub top: Vec<RankedDomain>,
    /// Every domain with a baseline total, descending.
    pub baseline: Vec<RankedDomain>,
    pub grand_total_current: u64,
    pub grand_total_baseline: u64,
}

impl Ranking {
    pub fn baseline_count(&self, domain: &str) -> Option<u64> {
        self.baseline
            .iter()
            .find(|entry| entry.domain == domain)
            .map(|entry| entry.count)
    }
}

/// Count descending, then domain ascending.
fn sorted_desc(totals: HashMap<&str, u64>) -> Vec<RankedDomain> {
    let mut ranked: Vec<RankedDomain> = totals
        .into_iter()
        .map(|(domain, count)| RankedDomain {
            domain: domain.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    ranked
}

pub fn rank(counts: &DomainDateCounts, options: &RankOptions) -> Ranking {
    let start_time = Instant::now();
    let cutoff = options.cutoff();
    info!(
        action = "start",
        component = "ranker",
        cutoff = %cutoff,
        baseline = ?options.baseline,
        "Ranking domains"
    );

    let mut current_totals: HashMap<&str, u64> = HashMap::new();
    let mut baseline_totals: HashMap<&str, u64> = HashMap::new();

    for (date, domain, count) in counts.iter() {
        *current_totals.entry(domain).or_insert(0) += count;
        if options.baseline.includes(date, cutoff) {
            *baseline_totals.entry(domain).or_insert(0) += count;
        }
    }

    let grand_total_current: u64 = current_totals.values().sum();
    let grand_total_baseline: u64 = baseline_totals.values().sum();

    let mut top = sorted_desc(current_totals);
    top.truncate(options.top);
    let baseline = sorted_desc(baseline_totals);

    info!(
        action = "complete",
        component = "ranker",
        ranked = top.len(),
        baseline_domains = baseline.len(),
        grand_total_current,
        grand_total_baseline,
        duration_ms = start_time.elapsed().as_millis(),
        "Ranking completed"
    );

    Ranking {
        cutoff,
        top,
        baseline,
        grand_total_current,
        grand_total_baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Record;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, domain: &str) -> Record {
        Record {
            date,
            domain: domain.to_string(),
        }
    }

    fn ranked(domain: &str, count: u64) -> RankedDomain {
        RankedDomain {
            domain: domain.to_string(),
            count,
        }
    }

    #[test]
    fn worked_example() {
        let counts: DomainDateCounts = vec![
            record(day(2024, 1, 1), "x.com"),
            record(day(2024, 1, 1), "x.com"),
            record(day(2024, 2, 1), "x.com"),
        ]
        .into_iter()
        .collect();

        let ranking = rank(&counts, &RankOptions::new(day(2024, 2, 15)));
        assert_eq!(ranking.cutoff, day(2024, 1, 16));
        assert_eq!(ranking.top, vec![ranked("x.com", 3)]);
        assert_eq!(ranking.baseline, vec![ranked("x.com", 2)]);
        assert_eq!(ranking.grand_total_current, 3);
        assert_eq!(ranking.grand_total_baseline, 2);
    }

    #[test]
    fn cutoff_day_belongs_to_older_baseline() {
        let today = day(2024, 2, 15);
        let counts: DomainDateCounts = vec![
            record(day(2024, 1, 16), "edge.com"),
            record(day(2024, 1, 17), "late.com"),
        ]
        .into_iter()
        .collect();

        let older = rank(&counts, &RankOptions::new(today));
        assert_eq!(older.baseline_count("edge.com"), Some(1));
        assert_eq!(older.baseline_count("late.com"), None);

        let newer = rank(
            &counts,
            &RankOptions {
                baseline: Baseline::Newer,
                ..RankOptions::new(today)
            },
        );
        assert_eq!(newer.baseline_count("edge.com"), None);
        assert_eq!(newer.baseline_count("late.com"), Some(1));
        assert_eq!(newer.grand_total_current, 2);
    }

    #[test]
    fn shorter_window_moves_cutoff_forward() {
        let counts: DomainDateCounts = vec![
            record(day(2024, 2, 1), "x.com"),
            record(day(2024, 2, 8), "x.com"),
            record(day(2024, 2, 9), "x.com"),
        ]
        .into_iter()
        .collect();
        let options = RankOptions {
            window_days: 7,
            ..RankOptions::new(day(2024, 2, 15))
        };

        assert_eq!(options.cutoff(), day(2024, 2, 8));
        let ranking = rank(&counts, &options);
        assert_eq!(ranking.cutoff, day(2024, 2, 8));
        assert_eq!(ranking.baseline_count("x.com"), Some(2));
        assert_eq!(ranking.grand_total_baseline, 2);

        let month = rank(&counts, &RankOptions::new(day(2024, 2, 15)));
        assert_eq!(month.baseline_count("x.com"), None);
    }

    #[test]
    fn top_is_bounded_and_ties_break_by_name() {
        let mut records = Vec::new();
        for i in 0..60 {
            for _ in 0..(i % 3 + 1) {
                records.push(record(day(2024, 1, 1), &format!("d{i:02}.com")));
            }
        }
        let counts: DomainDateCounts = records.into_iter().collect();
        let ranking = rank(&counts, &RankOptions::new(day(2024, 2, 15)));

        assert_eq!(ranking.top.len(), DEFAULT_TOP);
        assert_eq!(ranking.top[0], ranked("d02.com", 3));
        assert_eq!(ranking.top[1], ranked("d05.com", 3));
        assert!(ranking.top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn fewer_domains_than_top() {
        let counts: DomainDateCounts = vec![
            record(day(2024, 1, 1), "a.com"),
            record(day(2024, 1, 2), "b.com"),
        ]
        .into_iter()
        .collect();
        let ranking = rank(&counts, &RankOptions::new(day(2024, 2, 15)));
        assert_eq!(ranking.top.len(), 2);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        let ranking = rank(&DomainDateCounts::default(), &RankOptions::new(day(2024, 2, 15)));
        assert!(ranking.top.is_empty());
        assert_eq!(ranking.grand_total_current, 0);
        assert_eq!(ranking.grand_total_baseline, 0);
    }
}
