//! Core ledger logic, independent of any front end.

/// Amount display helpers
pub mod format;
/// Identifier generation
pub mod ids;
/// Whole-ledger export and import
pub mod snapshot;
/// Pure aggregation over transaction lists
pub mod stats;
/// Persistence store over `SeaORM`
pub mod store;

pub use snapshot::{ImportFailure, ImportReport, Snapshot};
pub use stats::{DateRange, StatsPeriod, TransactionStats};
pub use store::Store;
