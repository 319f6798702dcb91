//! Export and import of the whole ledger as one JSON document.
//!
//! ```json
//! { "transactions": [..], "categories": [..], "budgets": [..],
//!   "preferences": { "key": value }, "exportDate": "..", "version": "2.0" }
//! ```
//!
//! Missing top-level keys import as empty. Import is best-effort: each record is written
//! on its own, a failed write is recorded in the [`ImportReport`] and the rest continue.
//! Default categories in a document are skipped so an import never overwrites the seed set.

use crate::core::store::Store;
use crate::entities::{
    Budget, BudgetModel, Category, CategoryModel, Record, Transaction, TransactionModel,
    UserPreference, UserPreferenceModel,
};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Schema version written into every export.
pub const SNAPSHOT_VERSION: &str = "2.0";

/// The transportable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Every transaction
    pub transactions: Vec<TransactionModel>,
    /// Every category, defaults included
    pub categories: Vec<CategoryModel>,
    /// Every budget
    pub budgets: Vec<BudgetModel>,
    /// Decoded preference values by key
    pub preferences: BTreeMap<String, serde_json::Value>,
    /// When the document was produced
    #[serde(rename = "exportDate")]
    pub export_date: Option<DateTime<Utc>>,
    /// Schema version tag
    pub version: String,
}

impl Snapshot {
    /// Parses a document.
    ///
    /// # Errors
    /// Returns [`Error::ImportFormat`] if `text` is not a snapshot.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ImportFormat {
            message: e.to_string(),
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::read("snapshot", e))
    }
}

/// A record that could not be written during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Entity kind
    pub entity: &'static str,
    /// Record id or preference key
    pub id: String,
    /// Why the write failed
    pub message: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Transactions written
    pub transactions: usize,
    /// Non-default categories written
    pub categories: usize,
    /// Default categories left untouched
    pub skipped_default_categories: usize,
    /// Budgets written
    pub budgets: usize,
    /// Preferences written
    pub preferences: usize,
    /// Records that failed
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Whether every record in the document was written or deliberately skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of records written.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.transactions + self.categories + self.budgets + self.preferences
    }

    fn record(&mut self, entity: &'static str, id: &str, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!(entity, id, error = %e, "import record failed");
                self.failures.push(ImportFailure {
                    entity,
                    id: id.to_string(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}

impl Store {
    /// Collects every entity and preference into a [`Snapshot`] stamped with the
    /// current time.
    #[instrument(skip(self))]
    pub async fn export_snapshot(&self) -> Result<Snapshot> {
        let snapshot = Snapshot {
            transactions: self.load_all::<Transaction>().await?,
            categories: self.load_all::<Category>().await?,
            budgets: self.load_all::<Budget>().await?,
            preferences: self.preferences().await?,
            export_date: Some(Utc::now()),
            version: SNAPSHOT_VERSION.to_string(),
        };
        info!(
            transactions = snapshot.transactions.len(),
            categories = snapshot.categories.len(),
            budgets = snapshot.budgets.len(),
            "exported snapshot"
        );
        Ok(snapshot)
    }

    /// Upserts every record in `snapshot` except default categories.
    ///
    /// # Errors
    /// Only [`Error::NotReady`] aborts; individual write failures are collected in the
    /// returned report.
    #[instrument(skip(self, snapshot), fields(version = %snapshot.version))]
    pub async fn import_snapshot(&self, snapshot: Snapshot) -> Result<ImportReport> {
        self.ensure_ready()?;
        let mut report = ImportReport::default();

        for t in snapshot.transactions {
            let id = t.id.clone();
            if report.record(Transaction::KIND, &id, self.save::<Transaction>(t).await) {
                report.transactions += 1;
            }
        }

        for c in snapshot.categories {
            if c.is_default {
                report.skipped_default_categories += 1;
                continue;
            }
            let id = c.id.clone();
            if report.record(Category::KIND, &id, self.save::<Category>(c).await) {
                report.categories += 1;
            }
        }

        for b in snapshot.budgets {
            let id = b.id.clone();
            if report.record(Budget::KIND, &id, self.save::<Budget>(b).await) {
                report.budgets += 1;
            }
        }

        let now = Utc::now();
        for (key, value) in snapshot.preferences {
            let row = UserPreferenceModel::encode(key.as_str(), &value, now);
            if report.record(UserPreference::KIND, &key, self.save::<UserPreference>(row).await) {
                report.preferences += 1;
            }
        }

        info!(
            written = report.written(),
            skipped_defaults = report.skipped_default_categories,
            failed = report.failures.len(),
            "imported snapshot"
        );
        Ok(report)
    }

    /// [`Store::export_snapshot`] as pretty-printed JSON.
    pub async fn export_json(&self) -> Result<String> {
        self.export_snapshot().await?.to_json()
    }

    /// Parses `text` and imports it.
    ///
    /// # Errors
    /// Returns [`Error::ImportFormat`] if `text` is not a snapshot document.
    pub async fn import_json(&self, text: &str) -> Result<ImportReport> {
        self.import_snapshot(Snapshot::from_json(text)?).await
    }
}
