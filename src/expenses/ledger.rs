use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::entry::{Entry, IntoTimestamp};
use super::ordering::{ByAmount, ByCategory, ByDate, SortOrder};
use super::{EntryOrdering, LedgerError};
use crate::data;

/// Ledger file used by [`LedgerStore::new`].
pub const DEFAULT_LEDGER_PATH: &str = "data.csv";

/// An open bound for the date range totals.
pub const UNBOUNDED: Option<NaiveDateTime> = None;

/// Owns the ordered list of expense entries and the file they persist to.
///
/// The grand total is never cached; every aggregate is computed from the
/// entries present at the time of the call.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl LedgerStore {
    pub fn new() -> LedgerStore {
        LedgerStore::open(DEFAULT_LEDGER_PATH)
    }

    /// Loads the ledger at `path`. A missing or unreadable file yields an
    /// empty ledger; later exports still target `path`.
    pub fn open(path: impl AsRef<Path>) -> LedgerStore {
        let path = path.as_ref().to_path_buf();

        let entries = if !path.exists() {
            info!("no ledger at {}, starting empty", path.display());
            Vec::new()
        } else {
            match data::load_csv(&path) {
                Ok(entries) => {
                    debug!("loaded ledger, path={}, entries={}", path.display(), entries.len());
                    entries
                },
                Err(err) => {
                    warn!("failed to load ledger, starting empty, path={}, err={}", path.display(), err);
                    Vec::new()
                },
            }
        };

        LedgerStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_ledger(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|entry| *entry.amount()).sum()
    }

    /// Sum for an exact, case-sensitive category match. Unknown categories sum to zero.
    pub fn total_by_category(&self, category: &str) -> Decimal {
        self.entries
            .iter()
            .filter(|entry| entry.category() == category)
            .map(|entry| *entry.amount())
            .sum()
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !categories.contains(&entry.category().as_str()) {
                categories.push(entry.category());
            }
        }

        categories
    }

    pub fn summarize(&self) -> Vec<(&str, Decimal)> {
        self.categories()
            .into_iter()
            .map(|category| (category, self.total_by_category(category)))
            .collect()
    }

    /// Inclusive range sum. Missing bounds default to the earliest and latest
    /// timestamps in the ledger. An inverted range or an unparsable bound is
    /// logged and sums to zero.
    pub fn total_by_date_range<S, E>(&self, start: Option<S>, end: Option<E>) -> Decimal
    where
        S: IntoTimestamp,
        E: IntoTimestamp,
    {
        match self.checked_total_by_date_range(start, end) {
            Ok(total) => total,
            Err(err) => {
                warn!("{}", err);
                Decimal::ZERO
            },
        }
    }

    /// Bounds accept the same forms as [`LedgerStore::add_entry`]; pass
    /// [`UNBOUNDED`] to leave one open.
    pub fn checked_total_by_date_range<S, E>(
        &self,
        start: Option<S>,
        end: Option<E>,
    ) -> Result<Decimal, LedgerError>
    where
        S: IntoTimestamp,
        E: IntoTimestamp,
    {
        let start = start.map(|bound| bound.into_timestamp()).transpose()?;
        let end = end.map(|bound| bound.into_timestamp()).transpose()?;

        let start = start.or_else(|| self.entries.iter().map(|entry| *entry.timestamp()).min());
        let end = end.or_else(|| self.entries.iter().map(|entry| *entry.timestamp()).max());

        // Only reachable with an empty ledger and at least one bound missing.
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(Decimal::ZERO);
        };

        if start > end {
            return Err(LedgerError::InvalidDateRange { start, end });
        }

        Ok(self
            .entries
            .iter()
            .filter(|entry| (start..=end).contains(entry.timestamp()))
            .map(|entry| *entry.amount())
            .sum())
    }

    /// Reorders the entries in place. The sort is stable.
    pub fn sort(&mut self, order: impl Into<SortOrder>) {
        let order = order.into();
        self.entries.sort_by(|a, b| order.compare(a, b));
    }

    pub fn sort_by_date(&mut self, ascending: bool) {
        self.sort(ByDate::new(ascending));
    }

    pub fn sort_by_category(&mut self) {
        self.sort(ByCategory);
    }

    pub fn sort_by_amount(&mut self, ascending: bool) {
        self.sort(ByAmount::new(ascending));
    }

    /// Appends an entry at the end of the current ordering, even if the
    /// ledger was sorted before. The amount is not validated.
    pub fn add_entry(
        &mut self,
        amount: Decimal,
        date: impl IntoTimestamp,
        category: &str,
        notes: &str,
    ) -> Result<(), LedgerError> {
        let timestamp = date.into_timestamp()?;
        self.entries.push(Entry::new(amount, timestamp, category, notes));

        Ok(())
    }

    /// Writes every entry, in current order, over the ledger file.
    pub fn export(&self) -> Result<(), LedgerError> {
        data::export_csv(&self.path, &self.entries)?;
        debug!("exported ledger, path={}, entries={}", self.path.display(), self.entries.len());

        Ok(())
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        LedgerStore::new()
    }
}
