//! Persistence store - Durable local storage for every entity type.
//!
//! A [`Store`] wraps one `SeaORM` connection that the caller constructs and injects. It
//! starts out uninitialized; [`Store::initialize`] creates the schema and flips it to
//! ready, after which the CRUD operations are available. Every operation is generic over
//! [`Record`], so transactions, categories, budgets and preferences share one code path.
//!
//! Each write is independent. There is no multi-record transaction and nothing is rolled
//! back when a later write fails.

use crate::config::database;
use crate::core::stats::{self, DateRange, TransactionStats};
use crate::entities::{
    Budget, Category, CategoryColumn, Record, Transaction, TransactionColumn, TransactionModel,
    UserPreference, UserPreferenceModel,
};
use crate::errors::{Error, Result, WriteOp};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, QueryFilter,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument};

/// Handle to the ledger database.
#[derive(Debug)]
pub struct Store {
    db: DatabaseConnection,
    ready: AtomicBool,
}

impl Store {
    /// Wraps an existing connection. The store is not ready until [`Store::initialize`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            ready: AtomicBool::new(false),
        }
    }

    /// Opens `database_url` and wraps the connection.
    ///
    /// # Errors
    /// Returns [`Error::StorageInit`] if the medium cannot be opened.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(database::create_connection(database_url).await?))
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Whether [`Store::initialize`] has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Creates tables and indexes if absent and marks the store ready. Calling it again
    /// once ready does nothing.
    ///
    /// # Errors
    /// Returns [`Error::StorageInit`] if schema creation fails. This is fatal.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.is_ready() {
            debug!("storage already initialized");
            return Ok(());
        }

        database::create_tables(&self.db)
            .await
            .map_err(|e| Error::StorageInit {
                message: e.to_string(),
            })?;

        self.ready.store(true, Ordering::Release);
        info!("storage ready");
        Ok(())
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Every stored record of `E`, in the entity's listing order.
    ///
    /// Transactions come newest `date` first (ties by newest `created_at`), categories by
    /// name, budgets by newest `start_date`.
    #[instrument(skip(self), fields(entity = E::KIND))]
    pub async fn load_all<E: Record>(&self) -> Result<Vec<E::Model>> {
        self.ensure_ready()?;
        let rows = E::ordered(E::find())
            .all(&self.db)
            .await
            .map_err(|e| Error::read(E::KIND, e))?;
        debug!(count = rows.len(), "loaded");
        Ok(rows)
    }

    /// Looks up one record by id.
    pub async fn find<E: Record>(&self, id: &str) -> Result<Option<E::Model>> {
        self.ensure_ready()?;
        E::find()
            .filter(E::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(|e| Error::read(E::KIND, e))
    }

    /// Inserts `model`, or replaces every column of the stored record with the same id.
    ///
    /// # Errors
    /// Returns [`Error::StorageWrite`] on failure; nothing may be assumed written.
    #[instrument(skip(self, model), fields(entity = E::KIND, id = E::record_id(&model)))]
    pub async fn save<E>(&self, model: E::Model) -> Result<()>
    where
        E: Record,
        E::Model: IntoActiveModel<E::ActiveModel> + Sync,
        E::ActiveModel: Send,
    {
        self.ensure_ready()?;
        let id = E::record_id(&model).to_string();
        let id_column = E::id_column();
        let others: Vec<E::Column> = E::Column::iter()
            .filter(|c| c.as_str() != id_column.as_str())
            .collect();

        E::insert(model.into_active_model().reset_all())
            .on_conflict(OnConflict::column(id_column).update_columns(others).to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Save, E::KIND, id, e))?;
        debug!("saved");
        Ok(())
    }

    /// Saves each model in turn, stopping at the first failure. Earlier writes stay.
    pub async fn save_all<E>(&self, models: Vec<E::Model>) -> Result<()>
    where
        E: Record,
        E::Model: IntoActiveModel<E::ActiveModel> + Sync,
        E::ActiveModel: Send,
    {
        for model in models {
            self.save::<E>(model).await?;
        }
        Ok(())
    }

    /// Applies the supplied fields of `patch` to the stored record and refreshes its
    /// `updated_at`. Returns the record as stored afterwards.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no record has this id, [`Error::StorageWrite`] if
    /// the write fails.
    #[instrument(skip(self, patch), fields(entity = E::KIND))]
    pub async fn update<E>(&self, id: &str, patch: E::Patch) -> Result<E::Model>
    where
        E: Record,
        E::Model: IntoActiveModel<E::ActiveModel> + Sync,
        E::ActiveModel: Send,
    {
        self.ensure_ready()?;
        let existing = E::find()
            .filter(E::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Update, E::KIND, id, e))?
            .ok_or_else(|| Error::not_found(E::KIND, id))?;

        let mut active = existing.clone().into_active_model();
        E::apply_patch(&mut active, patch, Utc::now());
        if !active.is_changed() {
            return Ok(existing);
        }

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Update, E::KIND, id, e))?;
        debug!("updated");
        Ok(updated)
    }

    /// Removes the record with this id. A missing id is not an error.
    #[instrument(skip(self), fields(entity = E::KIND))]
    pub async fn delete<E: Record>(&self, id: &str) -> Result<()> {
        self.ensure_ready()?;
        let result = E::delete_many()
            .filter(E::id_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Delete, E::KIND, id, e))?;
        debug!(rows = result.rows_affected, "deleted");
        Ok(())
    }

    /// Deletes all transactions, budgets and preferences, then every non-default
    /// category. Default categories are kept.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<()> {
        self.ensure_ready()?;

        let transactions = Transaction::delete_many()
            .exec(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Clear, Transaction::KIND, "", e))?;
        let budgets = Budget::delete_many()
            .exec(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Clear, Budget::KIND, "", e))?;
        let preferences = UserPreference::delete_many()
            .exec(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Clear, UserPreference::KIND, "", e))?;
        let categories = Category::delete_many()
            .filter(CategoryColumn::IsDefault.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| Error::write(WriteOp::Clear, Category::KIND, "", e))?;

        info!(
            transactions = transactions.rows_affected,
            budgets = budgets.rows_affected,
            preferences = preferences.rows_affected,
            categories = categories.rows_affected,
            "cleared all data"
        );
        Ok(())
    }

    /// Transactions whose `date` falls inside `range`, newest first.
    pub async fn transactions_in_range(&self, range: &DateRange) -> Result<Vec<TransactionModel>> {
        self.ensure_ready()?;
        Transaction::ordered(Transaction::find())
            .filter(TransactionColumn::Date.between(range.start, range.end))
            .all(&self.db)
            .await
            .map_err(|e| Error::read(Transaction::KIND, e))
    }

    /// Transactions filed under `category_id`, newest first.
    pub async fn transactions_for_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<TransactionModel>> {
        self.ensure_ready()?;
        Transaction::ordered(Transaction::find())
            .filter(TransactionColumn::CategoryId.eq(category_id))
            .all(&self.db)
            .await
            .map_err(|e| Error::read(Transaction::KIND, e))
    }

    /// Income, expense and count over every stored transaction.
    pub async fn transaction_stats(&self) -> Result<TransactionStats> {
        let transactions = self.load_all::<Transaction>().await?;
        Ok(stats::summarize(&transactions))
    }

    /// Stores `value` under `key`, replacing any previous value.
    #[instrument(skip(self, value))]
    pub async fn set_preference(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.save::<UserPreference>(UserPreferenceModel::encode(key, value, Utc::now()))
            .await
    }

    /// All preferences, decoded.
    pub async fn preferences(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        Ok(self
            .load_all::<UserPreference>()
            .await?
            .into_iter()
            .map(|row| {
                let value = row.decoded_value();
                (row.key, value)
            })
            .collect())
    }
}
