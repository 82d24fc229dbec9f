use std::cmp;

use enum_dispatch::enum_dispatch;

use super::entry::Entry;
use super::EntryOrdering;

#[enum_dispatch(EntryOrdering)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    ByDate,
    ByCategory,
    ByAmount,
}

/// Descending flips each comparison, never the sorted slice, so ties stay in
/// insertion order.
fn directed(ordering: cmp::Ordering, ascending: bool) -> cmp::Ordering {
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByDate {
    ascending: bool,
}

impl ByDate {
    pub fn new(ascending: bool) -> ByDate {
        ByDate { ascending }
    }
}

impl EntryOrdering for ByDate {
    fn compare(&self, a: &Entry, b: &Entry) -> cmp::Ordering {
        directed(a.timestamp().cmp(b.timestamp()), self.ascending)
    }
}

/// Lexicographic, ascending, byte-wise string comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByCategory;

impl EntryOrdering for ByCategory {
    fn compare(&self, a: &Entry, b: &Entry) -> cmp::Ordering {
        a.category().cmp(b.category())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByAmount {
    ascending: bool,
}

impl ByAmount {
    pub fn new(ascending: bool) -> ByAmount {
        ByAmount { ascending }
    }
}

impl EntryOrdering for ByAmount {
    fn compare(&self, a: &Entry, b: &Entry) -> cmp::Ordering {
        directed(a.amount().cmp(b.amount()), self.ascending)
    }
}
