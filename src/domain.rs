use chrono::NaiveDate;
use std::fmt;

use crate::stats::Record;

const DATE_FORMATS: [&str; 3] = ["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d"];

/// Why a source line was not turned into a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Blank,
    Encoding,
    MissingComma,
    BadDate,
    MissingAt,
    EmptyDomain,
}

impl SkipReason {
    pub const ALL: [SkipReason; 6] = [
        Self::Blank,
        Self::Encoding,
        Self::MissingComma,
        Self::BadDate,
        Self::MissingAt,
        Self::EmptyDomain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Encoding => "encoding",
            Self::MissingComma => "missing_comma",
            Self::BadDate => "bad_date",
            Self::MissingAt => "missing_at",
            Self::EmptyDomain => "empty_domain",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Blank => "blank line",
            Self::Encoding => "line is not valid UTF-8",
            Self::MissingComma => "no comma between date and address",
            Self::BadDate => "unrecognised date",
            Self::MissingAt => "address has no '@'",
            Self::EmptyDomain => "address has nothing after '@'",
        };
        f.write_str(text)
    }
}

pub fn parse_date(field: &str) -> Option<NaiveDate> {
    let field = field.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(field, format).ok())
}

/// Everything after the first `@`, case preserved.
pub fn extract_domain(address: &str) -> Result<&str, SkipReason> {
    let (_, domain) = address.split_once('@').ok_or(SkipReason::MissingAt)?;
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(SkipReason::EmptyDomain);
    }
    Ok(domain)
}

/// Parses one raw line (without its newline) of the form `<date>,<address>`.
pub fn parse_record(line: &[u8]) -> Result<Record, SkipReason> {
    let line = std::str::from_utf8(line).map_err(|_| SkipReason::Encoding)?;
    let line = line.trim_end();
    if line.trim_start().is_empty() {
        return Err(SkipReason::Blank);
    }

    let (date, address) = line.split_once(',').ok_or(SkipReason::MissingComma)?;
    let date = parse_date(date).ok_or(SkipReason::BadDate)?;
    let domain = extract_domain(address)?;

    Ok(Record {
        date,
        domain: domain.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_compact_date_and_domain() {
        let record = parse_record(b"20240101,a@x.com").unwrap();
        assert_eq!(record.date, day(2024, 1, 1));
        assert_eq!(record.domain, "x.com");
    }

    #[test]
    fn accepts_dashed_and_slashed_dates() {
        assert_eq!(parse_date("2024-02-15"), Some(day(2024, 2, 15)));
        assert_eq!(parse_date("2024/02/15"), Some(day(2024, 2, 15)));
        assert_eq!(parse_date("15.02.2024"), None);
    }

    #[test]
    fn domain_is_everything_after_first_at() {
        assert_eq!(extract_domain("odd@name@Example.COM"), Ok("name@Example.COM"));
        assert_eq!(extract_domain("nobody"), Err(SkipReason::MissingAt));
        assert_eq!(extract_domain("nobody@"), Err(SkipReason::EmptyDomain));
    }

    #[test]
    fn strips_carriage_return() {
        let record = parse_record(b"20240101,a@x.com\r").unwrap();
        assert_eq!(record.domain, "x.com");
    }

    #[test]
    fn classifies_malformed_lines() {
        assert_eq!(parse_record(b""), Err(SkipReason::Blank));
        assert_eq!(parse_record(b"   "), Err(SkipReason::Blank));
        assert_eq!(parse_record(b"garbage-no-at-sign"), Err(SkipReason::MissingComma));
        assert_eq!(parse_record(b"yesterday,a@x.com"), Err(SkipReason::BadDate));
        assert_eq!(parse_record(b"20240101,ax.com"), Err(SkipReason::MissingAt));
        assert_eq!(parse_record(b"20240101,a@x\xff.com"), Err(SkipReason::Encoding));
    }
}
