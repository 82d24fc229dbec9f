use std::cmp;

use chrono::NaiveDateTime;
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod entry;
pub mod ledger;
pub mod ordering;


use entry::Entry;
use ordering::{ByAmount, ByCategory, ByDate, SortOrder};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid date range, start={start} is after end={end}")]
    InvalidDateRange { start: NaiveDateTime, end: NaiveDateTime },
    #[error("unexpected ledger columns: {0:?}")]
    SchemaMismatch(Vec<String>),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
}

/// A comparator used to reorder the ledger in place.
///
/// Implementations must describe a total order; the store always applies it
/// with a stable sort so equal entries keep their relative position.
#[enum_dispatch]
pub trait EntryOrdering {
    fn compare(&self, a: &Entry, b: &Entry) -> cmp::Ordering;
}
