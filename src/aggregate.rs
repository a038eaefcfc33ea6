use chrono::NaiveDate;
use std::collections::HashMap;
use std::io;
use std::time::Instant;
use tracing::info;

use crate::stats::Record;

/// Occurrence count per `(date, domain)`. Immutable once [`aggregate`] returns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DomainDateCounts {
    counts: HashMap<(NaiveDate, String), u64>,
}

impl DomainDateCounts {
    #[cfg(test)]
    pub fn get(&self, date: NaiveDate, domain: &str) -> u64 {
        self.counts
            .get(&(date, domain.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of every count; equals the number of records aggregated.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str, u64)> + '_ {
        self.counts
            .iter()
            .map(|((date, domain), count)| (*date, domain.as_str(), *count))
    }

    fn add(&mut self, record: Record) {
        *self.counts.entry((record.date, record.domain)).or_insert(0) += 1;
    }
}

impl FromIterator<Record> for DomainDateCounts {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut counts = Self::default();
        for record in iter {
            counts.add(record);
        }
        counts
    }
}

/// Single pass over the record stream. The first I/O error aborts the aggregation.
pub fn aggregate<I>(records: I) -> io::Result<DomainDateCounts>
where
    I: IntoIterator<Item = io::Result<Record>>,
{
    let start_time = Instant::now();
    info!(action = "start", component = "aggregator", "Aggregating records by date and domain");

    let mut counts = DomainDateCounts::default();
    for record in records {
        counts.add(record?);
    }

    info!(
        action = "complete",
        component = "aggregator",
        distinct_keys = counts.len(),
        records = counts.total(),
        duration_ms = start_time.elapsed().as_millis(),
        "Aggregation completed"
    );
    Ok(counts)
}
