//! Application state coordinator - The in-memory view of the ledger.
//!
//! [`AppState`] owns the [`Store`] and a cached copy of every transaction, category and
//! budget. Reads are served from memory. Mutations are validated against the cached
//! view, written through to the store, and only then applied to memory: every write
//! moves `pending -> committed -> applied`, and a write the store rejects never reaches
//! the `applied` stage.

use crate::config::categories::default_categories;
use crate::core::ids::{BUDGET_PREFIX, CATEGORY_PREFIX, TRANSACTION_PREFIX, generate_id_at};
use crate::core::snapshot::ImportReport;
use crate::core::store::Store;
use crate::entities::budget::{BudgetPatch, NewBudget};
use crate::entities::category::{CategoryPatch, NewCategory};
use crate::entities::transaction::{NewTransaction, TransactionPatch, TransactionType};
use crate::entities::{
    Budget, BudgetModel, Category, CategoryModel, Record, Transaction, TransactionModel,
};
use crate::errors::{Error, Result};
use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// The cached collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerData {
    /// All transactions
    pub transactions: Vec<TransactionModel>,
    /// All categories
    pub categories: Vec<CategoryModel>,
    /// All budgets
    pub budgets: Vec<BudgetModel>,
}

impl LedgerData {
    fn category(&self, id: &str) -> Option<&CategoryModel> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn references(&self, category_id: &str) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.category_id == category_id)
            .count()
    }

    fn check_category(&self, category_id: &str, transaction_type: TransactionType) -> Result<()> {
        let category = self
            .category(category_id)
            .ok_or_else(|| Error::not_found(Category::KIND, category_id))?;
        if category.category_type == transaction_type {
            Ok(())
        } else {
            Err(Error::CategoryTypeMismatch {
                category_id: category_id.to_string(),
                expected: category.category_type.to_string(),
                actual: transaction_type.to_string(),
            })
        }
    }
}

/// Result of [`AppState::delete_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDeletion {
    /// The category was removed
    Deleted,
    /// Transactions still reference the category; nothing was changed
    InUse {
        /// How many transactions reference it
        transaction_count: usize,
    },
}

#[derive(Debug, Clone, Copy)]
enum WriteStage {
    Pending,
    Committed,
    Applied,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Committed => "committed",
            Self::Applied => "applied",
        })
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Single in-memory snapshot of the ledger, kept in step with the store.
#[derive(Debug)]
pub struct AppState {
    store: Store,
    data: RwLock<LedgerData>,
    loading: AtomicBool,
}

impl AppState {
    /// Wraps an injected store. Nothing is loaded until [`AppState::initialize`].
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            data: RwLock::new(LedgerData::default()),
            loading: AtomicBool::new(true),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Brings the store to ready and loads every collection.
    ///
    /// # Errors
    /// Returns [`Error::StorageInit`] if the store cannot be initialized. Individual load
    /// failures are logged, not returned.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        self.store.initialize().await?;
        self.refresh().await
    }

    /// Reloads transactions, categories and budgets concurrently and replaces the cache.
    ///
    /// A collection that fails to load keeps its previous contents. If categories fail
    /// to load or come back empty, the default set is written to the store and used.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        self.store.ensure_ready()?;
        self.loading.store(true, Ordering::Release);

        let (transactions, categories, budgets) = tokio::join!(
            self.store.load_all::<Transaction>(),
            self.store.load_all::<Category>(),
            self.store.load_all::<Budget>(),
        );

        let categories = match categories {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                info!("no categories stored, seeding defaults");
                self.seed_default_categories().await
            }
            Err(e) => {
                error!(error = %e, "failed to load categories, falling back to defaults");
                self.seed_default_categories().await
            }
        };
        let transactions = transactions
            .inspect_err(|e| error!(error = %e, "failed to load transactions"))
            .ok();
        let budgets = budgets
            .inspect_err(|e| error!(error = %e, "failed to load budgets"))
            .ok();

        {
            let mut data = self.data.write().await;
            if let Some(list) = transactions {
                data.transactions = list;
            }
            data.categories = categories;
            if let Some(list) = budgets {
                data.budgets = list;
            }
            info!(
                transactions = data.transactions.len(),
                categories = data.categories.len(),
                budgets = data.budgets.len(),
                "ledger loaded"
            );
        }

        self.loading.store(false, Ordering::Release);
        Ok(())
    }

    async fn seed_default_categories(&self) -> Vec<CategoryModel> {
        let defaults = default_categories();
        if let Err(e) = self.store.save_all::<Category>(defaults.clone()).await {
            warn!(error = %e, "could not persist default categories");
        }
        defaults
    }

    async fn write_through<T, F>(
        &self,
        op: &'static str,
        id: &str,
        commit: F,
        apply: impl FnOnce(&mut LedgerData, &T),
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug!(op, id, stage = %WriteStage::Pending);
        let value = commit
            .await
            .inspect_err(|e| warn!(op, id, error = %e, "store rejected write"))?;
        debug!(op, id, stage = %WriteStage::Committed);
        apply(&mut *self.data.write().await, &value);
        debug!(op, id, stage = %WriteStage::Applied);
        Ok(value)
    }

    /// Whether a load is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// A copy of all cached collections.
    pub async fn snapshot(&self) -> LedgerData {
        self.data.read().await.clone()
    }

    /// Cached transactions.
    pub async fn transactions(&self) -> Vec<TransactionModel> {
        self.data.read().await.transactions.clone()
    }

    /// Cached categories.
    pub async fn categories(&self) -> Vec<CategoryModel> {
        self.data.read().await.categories.clone()
    }

    /// Cached categories serving `transaction_type`, for pickers.
    pub async fn categories_for(&self, transaction_type: TransactionType) -> Vec<CategoryModel> {
        self.data
            .read()
            .await
            .categories
            .iter()
            .filter(|c| c.category_type == transaction_type)
            .cloned()
            .collect()
    }

    /// Cached budgets.
    pub async fn budgets(&self) -> Vec<BudgetModel> {
        self.data.read().await.budgets.clone()
    }

    /// One cached category.
    pub async fn category(&self, id: &str) -> Option<CategoryModel> {
        self.data.read().await.category(id).cloned()
    }

    /// Records a new transaction and appends it to the cache.
    ///
    /// # Errors
    /// Rejects a non-positive amount, an empty description, an unknown category or one
    /// serving the other type. Store failures are returned and the cache is untouched.
    #[instrument(skip(self, input), fields(category = %input.category_id))]
    pub async fn add_transaction(&self, input: NewTransaction) -> Result<TransactionModel> {
        validate_amount(input.amount)?;
        validate_text("description", &input.description)?;
        self.data
            .read()
            .await
            .check_category(&input.category_id, input.transaction_type)?;

        let now = Utc::now();
        let id = generate_id_at(TRANSACTION_PREFIX, now);
        let model = input.into_model(id.clone(), now);

        let saved = self
            .write_through(
                "add_transaction",
                &id,
                async {
                    self.store
                        .save::<Transaction>(model.clone())
                        .await
                        .map(|()| model)
                },
                |data, saved| data.transactions.push(saved.clone()),
            )
            .await?;
        info!(id = %saved.id, amount = saved.amount, "transaction added");
        Ok(saved)
    }

    /// Applies `patch` to a transaction and replaces the cached copy with the stored one.
    ///
    /// # Errors
    /// [`Error::NotFound`] for an unknown id; the same validation as
    /// [`AppState::add_transaction`] on the merged result.
    #[instrument(skip(self, patch))]
    pub async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<TransactionModel> {
        {
            let data = self.data.read().await;
            let current = data
                .transactions
                .iter()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::not_found(Transaction::KIND, id))?;
            let merged = patch.merged(current);
            validate_amount(merged.amount)?;
            validate_text("description", &merged.description)?;
            data.check_category(&merged.category_id, merged.transaction_type)?;
        }

        let updated = self
            .write_through(
                "update_transaction",
                id,
                self.store.update::<Transaction>(id, patch),
                |data, updated| {
                    if let Some(slot) = data.transactions.iter_mut().find(|t| t.id == updated.id) {
                        *slot = updated.clone();
                    }
                },
            )
            .await?;
        info!("transaction updated");
        Ok(updated)
    }

    /// Deletes a transaction. Unknown ids are not an error.
    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.write_through(
            "delete_transaction",
            id,
            self.store.delete::<Transaction>(id),
            |data, ()| data.transactions.retain(|t| t.id != id),
        )
        .await?;
        info!("transaction deleted");
        Ok(())
    }

    /// Creates a category and appends it to the cache.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add_category(&self, input: NewCategory) -> Result<CategoryModel> {
        validate_text("name", &input.name)?;
        let id = generate_id_at(CATEGORY_PREFIX, Utc::now());
        let model = input.into_model(id.clone());

        let saved = self
            .write_through(
                "add_category",
                &id,
                async {
                    self.store
                        .save::<Category>(model.clone())
                        .await
                        .map(|()| model)
                },
                |data, saved| data.categories.push(saved.clone()),
            )
            .await?;
        info!(id = %saved.id, "category added");
        Ok(saved)
    }

    /// Applies `patch` to a category.
    ///
    /// # Errors
    /// [`Error::Validation`] when the type would change while transactions reference the
    /// category, or the name would become empty.
    #[instrument(skip(self, patch))]
    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<CategoryModel> {
        {
            let data = self.data.read().await;
            let current = data
                .category(id)
                .ok_or_else(|| Error::not_found(Category::KIND, id))?;
            if let Some(name) = &patch.name {
                validate_text("name", name)?;
            }
            if let Some(new_type) = patch.category_type {
                let in_use = data.references(id);
                if new_type != current.category_type && in_use > 0 {
                    return Err(Error::validation(format!(
                        "category is used by {in_use} transactions, its type cannot change"
                    )));
                }
            }
            if let Some(Some(cap)) = patch.budget {
                validate_amount(cap)?;
            }
        }

        let updated = self
            .write_through(
                "update_category",
                id,
                self.store.update::<Category>(id, patch),
                |data, updated| {
                    if let Some(slot) = data.categories.iter_mut().find(|c| c.id == updated.id) {
                        *slot = updated.clone();
                    }
                },
            )
            .await?;
        info!("category updated");
        Ok(updated)
    }

    /// Deletes a category unless a cached transaction still references it.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &str) -> Result<CategoryDeletion> {
        let transaction_count = self.data.read().await.references(id);
        if transaction_count > 0 {
            info!(transaction_count, "category in use, not deleted");
            return Ok(CategoryDeletion::InUse { transaction_count });
        }

        self.write_through(
            "delete_category",
            id,
            self.store.delete::<Category>(id),
            |data, ()| data.categories.retain(|c| c.id != id),
        )
        .await?;
        info!("category deleted");
        Ok(CategoryDeletion::Deleted)
    }

    fn check_budget(data: &LedgerData, budget: &BudgetModel) -> Result<()> {
        validate_amount(budget.amount)?;
        if data.category(&budget.category_id).is_none() {
            return Err(Error::not_found(Category::KIND, &budget.category_id));
        }
        if budget.start_date > budget.end_date {
            return Err(Error::validation("budget start date is after its end date"));
        }
        Ok(())
    }

    /// Creates a budget and appends it to the cache.
    #[instrument(skip(self, input), fields(category = %input.category_id))]
    pub async fn add_budget(&self, input: NewBudget) -> Result<BudgetModel> {
        let now = Utc::now();
        let id = generate_id_at(BUDGET_PREFIX, now);
        let model = input.into_model(id.clone(), now);
        Self::check_budget(&*self.data.read().await, &model)?;

        let saved = self
            .write_through(
                "add_budget",
                &id,
                async {
                    self.store
                        .save::<Budget>(model.clone())
                        .await
                        .map(|()| model)
                },
                |data, saved| data.budgets.push(saved.clone()),
            )
            .await?;
        info!(id = %saved.id, "budget added");
        Ok(saved)
    }

    /// Applies `patch` to a budget.
    #[instrument(skip(self, patch))]
    pub async fn update_budget(&self, id: &str, patch: BudgetPatch) -> Result<BudgetModel> {
        {
            let data = self.data.read().await;
            let current = data
                .budgets
                .iter()
                .find(|b| b.id == id)
                .ok_or_else(|| Error::not_found(Budget::KIND, id))?;
            Self::check_budget(&data, &patch.merged(current))?;
        }

        let updated = self
            .write_through(
                "update_budget",
                id,
                self.store.update::<Budget>(id, patch),
                |data, updated| {
                    if let Some(slot) = data.budgets.iter_mut().find(|b| b.id == updated.id) {
                        *slot = updated.clone();
                    }
                },
            )
            .await?;
        info!("budget updated");
        Ok(updated)
    }

    /// Deletes a budget. Unknown ids are not an error.
    #[instrument(skip(self))]
    pub async fn delete_budget(&self, id: &str) -> Result<()> {
        self.write_through(
            "delete_budget",
            id,
            self.store.delete::<Budget>(id),
            |data, ()| data.budgets.retain(|b| b.id != id),
        )
        .await?;
        info!("budget deleted");
        Ok(())
    }

    /// Clears everything except default categories and reloads.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<()> {
        self.store.clear_all().await?;
        self.refresh().await
    }

    /// Imports a snapshot document and reloads the cache.
    ///
    /// # Errors
    /// [`Error::ImportFormat`] if the document cannot be parsed; nothing is written then.
    #[instrument(skip(self, text))]
    pub async fn import_json(&self, text: &str) -> Result<ImportReport> {
        let report = self.store.import_json(text).await?;
        self.refresh().await?;
        Ok(report)
    }

    /// Exports the stored ledger as a snapshot document.
    pub async fn export_json(&self) -> Result<String> {
        self.store.export_json().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::budget::BudgetPeriod;
    use crate::test_utils::{category, new_transaction, setup_test_state};
    use chrono::{Duration, TimeZone};
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_initialize_seeds_default_categories() -> Result<()> {
        let state = setup_test_state().await?;

        assert!(!state.is_loading());
        let categories = state.categories().await;
        assert_eq!(categories.len(), default_categories().len());
        assert!(categories.iter().all(|c| c.is_default));
        assert_eq!(
            state.store().load_all::<Category>().await?.len(),
            default_categories().len()
        );

        state.refresh().await?;
        assert_eq!(state.categories().await.len(), default_categories().len());
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_before_initialize_is_not_ready() -> Result<()> {
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        let state = AppState::new(Store::new(db));
        assert!(matches!(state.refresh().await, Err(Error::NotReady)));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_transaction_writes_through() -> Result<()> {
        let state = setup_test_state().await?;
        let input = new_transaction(TransactionType::Expense, 42.0, "food");

        let added = state.add_transaction(input.clone()).await?;

        assert!(added.id.starts_with("trans_"));
        assert_eq!(added.created_at, added.updated_at);
        assert_eq!(added.amount, input.amount);
        assert_eq!(added.category_id, input.category_id);
        assert_eq!(added.transaction_type, input.transaction_type);
        assert_eq!(added.date, input.date);

        let stored = state.store().load_all::<Transaction>().await?;
        assert_eq!(stored.iter().filter(|t| t.id == added.id).count(), 1);
        assert_eq!(state.transactions().await, stored);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_transaction_rejects_invalid_input() -> Result<()> {
        let state = setup_test_state().await?;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = state
                .add_transaction(new_transaction(TransactionType::Expense, amount, "food"))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidAmount { .. }));
        }

        let mut blank = new_transaction(TransactionType::Expense, 5.0, "food");
        blank.description = "   ".to_string();
        assert!(matches!(
            state.add_transaction(blank).await,
            Err(Error::Validation { .. })
        ));

        assert!(matches!(
            state
                .add_transaction(new_transaction(TransactionType::Expense, 5.0, "nope"))
                .await,
            Err(Error::NotFound { .. })
        ));

        assert!(matches!(
            state
                .add_transaction(new_transaction(TransactionType::Income, 5.0, "food"))
                .await,
            Err(Error::CategoryTypeMismatch { .. })
        ));

        assert!(state.transactions().await.is_empty());
        assert!(state.store().load_all::<Transaction>().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_leaves_memory_unchanged() -> Result<()> {
        let state = setup_test_state().await?;
        let kept = state
            .add_transaction(new_transaction(TransactionType::Income, 10.0, "salary"))
            .await?;

        state
            .store()
            .connection()
            .execute_unprepared("DROP TABLE transactions")
            .await?;

        let err = state
            .add_transaction(new_transaction(TransactionType::Expense, 3.0, "food"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert_eq!(err.user_message(), "Cannot save transaction");
        assert_eq!(state.transactions().await, vec![kept.clone()]);

        let err = state.delete_transaction(&kept.id).await.unwrap_err();
        assert_eq!(err.user_message(), "Cannot delete transaction");
        assert_eq!(state.transactions().await, vec![kept]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_merges_and_refreshes() -> Result<()> {
        let state = setup_test_state().await?;
        let before = state
            .add_transaction(new_transaction(TransactionType::Expense, 20.0, "food"))
            .await?;

        let after = state
            .update_transaction(
                &before.id,
                TransactionPatch {
                    amount: Some(25.0),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(after.amount, 25.0);
        assert_eq!(after.description, before.description);
        assert_eq!(after.category_id, before.category_id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(state.transactions().await, vec![after.clone()]);
        assert_eq!(
            state.store().find::<Transaction>(&before.id).await?,
            Some(after)
        );

        let err = state
            .update_transaction(
                &before.id,
                TransactionPatch {
                    category_id: Some("salary".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CategoryTypeMismatch { .. }));

        let err = state
            .update_transaction("missing", TransactionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction_is_idempotent() -> Result<()> {
        let state = setup_test_state().await?;
        let kept = state
            .add_transaction(new_transaction(TransactionType::Expense, 1.0, "food"))
            .await?;

        state.delete_transaction("missing").await?;
        assert_eq!(state.transactions().await, vec![kept.clone()]);

        state.delete_transaction(&kept.id).await?;
        state.delete_transaction(&kept.id).await?;
        assert!(state.transactions().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_refused_while_in_use() -> Result<()> {
        let state = setup_test_state().await?;
        let pets = state
            .add_category(NewCategory::new(
                "Pets",
                "🐶",
                "#795548",
                TransactionType::Expense,
            ))
            .await?;
        let unused = state
            .add_category(NewCategory::new(
                "Garden",
                "🌱",
                "#8BC34A",
                TransactionType::Expense,
            ))
            .await?;
        state
            .add_transaction(new_transaction(TransactionType::Expense, 9.0, &pets.id))
            .await?;
        let before = state.snapshot().await;

        let outcome = state.delete_category(&pets.id).await?;
        assert_eq!(
            outcome,
            CategoryDeletion::InUse {
                transaction_count: 1
            }
        );
        assert_eq!(state.snapshot().await, before);
        assert!(state.store().find::<Category>(&pets.id).await?.is_some());

        assert_eq!(
            state.delete_category(&unused.id).await?,
            CategoryDeletion::Deleted
        );
        let after = state.categories().await;
        assert_eq!(after.len(), before.categories.len() - 1);
        assert!(after.iter().all(|c| c.id != unused.id));
        assert!(state.store().find::<Category>(&unused.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_category_type_locked_while_referenced() -> Result<()> {
        let state = setup_test_state().await?;
        state
            .add_transaction(new_transaction(TransactionType::Expense, 9.0, "food"))
            .await?;

        let err = state
            .update_category(
                "food",
                CategoryPatch {
                    category_type: Some(TransactionType::Income),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let renamed = state
            .update_category(
                "food",
                CategoryPatch {
                    name: Some("Meals".to_string()),
                    budget: Some(Some(500.0)),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(renamed.name, "Meals");
        assert_eq!(renamed.budget, Some(500.0));
        assert!(renamed.is_default);
        assert_eq!(state.category("food").await, Some(renamed));
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_lifecycle() -> Result<()> {
        let state = setup_test_state().await?;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let input = NewBudget {
            category_id: "food".to_string(),
            amount: 300.0,
            period: BudgetPeriod::Monthly,
            start_date: start,
            end_date: start + Duration::days(30),
        };

        let mut backwards = input.clone();
        backwards.end_date = start - Duration::days(1);
        assert!(matches!(
            state.add_budget(backwards).await,
            Err(Error::Validation { .. })
        ));
        let mut orphan = input.clone();
        orphan.category_id = "ghost".to_string();
        assert!(matches!(
            state.add_budget(orphan).await,
            Err(Error::NotFound { .. })
        ));

        let budget = state.add_budget(input).await?;
        assert!(budget.id.starts_with("budget_"));

        let updated = state
            .update_budget(
                &budget.id,
                BudgetPatch {
                    amount: Some(350.0),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.amount, 350.0);
        assert_eq!(state.budgets().await, vec![updated]);

        state.delete_budget(&budget.id).await?;
        assert!(state.budgets().await.is_empty());
        assert!(state.store().load_all::<Budget>().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_keeps_only_defaults() -> Result<()> {
        let state = setup_test_state().await?;
        state
            .add_category(NewCategory::new(
                "Pets",
                "🐶",
                "#795548",
                TransactionType::Expense,
            ))
            .await?;
        state
            .add_transaction(new_transaction(TransactionType::Expense, 9.0, "food"))
            .await?;
        state
            .store()
            .set_preference("theme", &serde_json::json!("dark"))
            .await?;

        state.reset().await?;

        let categories = state.categories().await;
        assert_eq!(categories.len(), default_categories().len());
        assert!(categories.iter().all(|c| c.is_default));
        assert!(state.transactions().await.is_empty());
        assert!(state.budgets().await.is_empty());
        assert!(state.store().preferences().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_export_import_round_trip() -> Result<()> {
        let state = setup_test_state().await?;
        let pets = state
            .add_category(NewCategory::new(
                "Pets",
                "🐶",
                "#795548",
                TransactionType::Expense,
            ))
            .await?;
        state
            .add_transaction(new_transaction(TransactionType::Expense, 9.0, &pets.id))
            .await?;
        state
            .add_transaction(new_transaction(TransactionType::Income, 900.0, "salary"))
            .await?;
        let before = state.snapshot().await;
        let document = state.export_json().await?;

        state.reset().await?;
        let report = state.import_json(&document).await?;

        assert!(report.is_complete());
        assert_eq!(report.transactions, 2);
        assert_eq!(report.categories, 1);

        let mut expected = before.transactions.clone();
        let mut actual = state.transactions().await;
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        actual.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(actual, expected);
        assert!(state.category(&pets.id).await.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_document() -> Result<()> {
        let state = setup_test_state().await?;
        let err = state.import_json("not json").await.unwrap_err();
        assert!(matches!(err, Error::ImportFormat { .. }));
        assert_eq!(
            err.user_message(),
            "Cannot import data, please check the file format"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_category_load_failure_falls_back_to_defaults() -> Result<()> {
        let state = setup_test_state().await?;
        state
            .store()
            .connection()
            .execute_unprepared("DROP TABLE categories")
            .await?;

        state.refresh().await?;

        assert_eq!(state.categories().await.len(), default_categories().len());
        assert!(!state.is_loading());
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_load_failure_keeps_other_collections() -> Result<()> {
        let state = setup_test_state().await?;
        let kept = state
            .add_transaction(new_transaction(TransactionType::Expense, 12.0, "food"))
            .await?;
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let budget = |category_id: &str| NewBudget {
            category_id: category_id.to_string(),
            amount: 200.0,
            period: BudgetPeriod::Monthly,
            start_date: start,
            end_date: start + Duration::days(30),
        };
        state.add_budget(budget("food")).await?;

        // Written behind the coordinator's back so only a reload can see them.
        let late_budget = budget("transport").into_model("budget_late".to_string(), start);
        state.store().save::<Budget>(late_budget.clone()).await?;
        let pets = category("pets", TransactionType::Expense);
        state.store().save::<Category>(pets.clone()).await?;

        state
            .store()
            .connection()
            .execute_unprepared("DROP TABLE transactions")
            .await?;
        state.refresh().await?;

        assert_eq!(state.transactions().await, vec![kept]);
        let budgets = state.budgets().await;
        assert_eq!(budgets.len(), 2);
        assert!(budgets.contains(&late_budget));
        assert_eq!(
            state.categories().await.len(),
            default_categories().len() + 1
        );
        assert!(state.category(&pets.id).await.is_some());
        assert!(!state.is_loading());
        Ok(())
    }
}
