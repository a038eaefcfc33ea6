use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::{parse_record, SkipReason};
use crate::stats::Record;

const LOGGED_SKIPS: u64 = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub lines: u64,
    pub records: u64,
    pub skipped: HashMap<SkipReason, u64>,
}

impl ReadStats {
    pub fn skipped_total(&self) -> u64 {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> u64 {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

/// Streams [`Record`]s out of a line-oriented source, one line in memory at a time.
///
/// Malformed lines are counted in [`ReadStats`] and skipped. End of input is the
/// zero-length read; an I/O error is yielded once and ends the stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    source: R,
    buf: Vec<u8>,
    stats: ReadStats,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buf: Vec::with_capacity(128),
            stats: ReadStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn into_stats(self) -> ReadStats {
        self.stats
    }

    fn skip(&mut self, reason: SkipReason) {
        let count = self.stats.skipped.entry(reason).or_insert(0);
        *count += 1;
        if self.stats.skipped_total() <= LOGGED_SKIPS {
            debug!(
                action = "skip",
                component = "reader",
                line_number = self.stats.lines,
                reason = %reason,
                "Skipping malformed line"
            );
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.source.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.stats.lines += 1;
                    if self.buf.last() == Some(&b'\n') {
                        self.buf.pop();
                    }
                    match parse_record(&self.buf) {
                        Ok(record) => {
                            self.stats.records += 1;
                            return Some(Ok(record));
                        }
                        Err(reason) => self.skip(reason),
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Opens the source read-only and wraps it in a buffered [`RecordReader`].
pub fn open_records(path: &Path) -> Result<RecordReader<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open source file {:?}", path))?;
    info!(action = "open", component = "reader", path = ?path, "Opened source file");
    Ok(RecordReader::new(BufReader::with_capacity(1 << 16, file)))
}
