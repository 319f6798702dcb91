//! Shared test utilities.
//!
//! Helpers for setting up in-memory stores and coordinators, plus record builders with
//! sensible defaults.

use crate::cache::AppState;
use crate::core::ids::{TRANSACTION_PREFIX, generate_id_at};
use crate::core::store::Store;
use crate::entities::category::NewCategory;
use crate::entities::transaction::{NewTransaction, TransactionType};
use crate::entities::{CategoryModel, TransactionModel};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per process. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` store with all tables initialized.
/// This is the standard setup for store tests.
pub async fn setup_test_store() -> Result<Store> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    let store = Store::new(db);
    store.initialize().await?;
    Ok(store)
}

/// Creates a coordinator over a fresh in-memory store, already initialized, so the
/// default categories are loaded.
pub async fn setup_test_state() -> Result<AppState> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    let state = AppState::new(Store::new(db));
    state.initialize().await?;
    Ok(state)
}

/// Builds a stored-shape transaction dated `date`, with `created_at`/`updated_at`
/// equal to `date` and the description `"Test transaction"`.
#[must_use]
pub fn transaction(
    transaction_type: TransactionType,
    amount: f64,
    category_id: &str,
    date: DateTime<Utc>,
) -> TransactionModel {
    NewTransaction::new(
        transaction_type,
        amount,
        "Test transaction",
        category_id,
        date,
    )
    .into_model(generate_id_at(TRANSACTION_PREFIX, date), date)
}

/// Builds a non-default category whose name is `id` capitalized.
#[must_use]
pub fn category(id: &str, category_type: TransactionType) -> CategoryModel {
    let mut chars = id.chars();
    let name: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    NewCategory::new(name, "🏷️", "#607D8B", category_type).into_model(id.to_string())
}

/// A new-transaction input with defaults, for coordinator tests.
#[must_use]
pub fn new_transaction(
    transaction_type: TransactionType,
    amount: f64,
    category_id: &str,
) -> NewTransaction {
    NewTransaction::new(
        transaction_type,
        amount,
        "Test transaction",
        category_id,
        Utc::now(),
    )
}
