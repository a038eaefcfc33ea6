use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::aggregate::DomainDateCounts;

const DAY_FORMAT: &str = "%Y-%m-%d";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS domain_daily_counts (
    day    TEXT    NOT NULL,
    domain TEXT    NOT NULL,
    count  INTEGER NOT NULL,
    PRIMARY KEY (day, domain)
)";

/// Replaces the contents of `domain_daily_counts` with the freshly aggregated counts.
pub fn write_daily_counts(db_path: &Path, counts: &DomainDateCounts) -> Result<usize> {
    let start_time = Instant::now();
    info!(action = "start", component = "daily_counts", path = ?db_path, "Writing daily domain counts");

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open counts database {:?}", db_path))?;
    conn.execute(CREATE_TABLE, [])
        .context("Failed to create domain_daily_counts table")?;

    let tx = conn.transaction()?;
    let removed = tx.execute("DELETE FROM domain_daily_counts", [])?;
    let mut written = 0;
    {
        let mut insert = tx.prepare(
            "INSERT INTO domain_daily_counts (day, domain, count) VALUES (?1, ?2, ?3)",
        )?;
        for (date, domain, count) in counts.iter() {
            let count = i64::try_from(count).context("Daily count exceeds SQLite integer range")?;
            written += insert.execute(params![date.format(DAY_FORMAT).to_string(), domain, count])?;
        }
    }
    tx.commit().context("Failed to commit daily domain counts")?;

    info!(
        action = "complete",
        component = "daily_counts",
        rows_removed = removed,
        rows_written = written,
        duration_ms = start_time.elapsed().as_millis(),
        "Daily domain counts written"
    );
    Ok(written)
}
