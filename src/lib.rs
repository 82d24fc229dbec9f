pub mod data;
pub mod expenses;

pub use expenses::entry::{Entry, IntoTimestamp};
pub use expenses::ledger::{LedgerStore, DEFAULT_LEDGER_PATH, UNBOUNDED};
pub use expenses::LedgerError;
