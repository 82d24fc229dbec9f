use chrono::{NaiveDate, NaiveDateTime};
use getset::Getters;
use rust_decimal::Decimal;

use super::LedgerError;

/// Canonical on-disk timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: [&str; 3] = [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One expense transaction.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Entry {
    amount: Decimal,
    timestamp: NaiveDateTime,
    category: String,
    notes: String,
}

impl Entry {
    pub fn new(
        amount: Decimal,
        timestamp: NaiveDateTime,
        category: impl Into<String>,
        notes: impl Into<String>,
    ) -> Entry {
        Entry {
            amount,
            timestamp,
            category: category.into(),
            notes: notes.into(),
        }
    }
}

/// Conversion into the canonical timestamp of an entry.
pub trait IntoTimestamp {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError>;
}

impl IntoTimestamp for NaiveDateTime {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError> {
        Ok(self)
    }
}

impl IntoTimestamp for NaiveDate {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError> {
        Ok(self.and_time(chrono::NaiveTime::MIN))
    }
}

impl IntoTimestamp for &str {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError> {
        parse_timestamp(self)
    }
}

impl IntoTimestamp for String {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError> {
        parse_timestamp(&self)
    }
}

impl IntoTimestamp for &String {
    fn into_timestamp(self) -> Result<NaiveDateTime, LedgerError> {
        parse_timestamp(self)
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS` and a few close variants, falling back to a
/// bare date at midnight.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, LedgerError> {
    let text = text.trim();

    for format in ACCEPTED_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(timestamp);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| LedgerError::InvalidTimestamp(text.to_string()))
}
