//! Database configuration module.
//!
//! Handles `SQLite` connection setup and schema creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`, so the
//! schema always matches the Rust structs. Every statement is `IF NOT EXISTS`, which makes
//! [`create_tables`] safe to run on every start.

use crate::entities::{
    Budget, BudgetColumn, Category, Transaction, TransactionColumn, UserPreference,
};
use crate::errors::{Error, Result};
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::debug;

/// Default location of the ledger database, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/pocket_ledger.sqlite?mode=rwc";

/// Returns the file path part of a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

/// Opens a connection to `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first, so the default
/// `data/` location works on a fresh checkout.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url)
        .map(Path::new)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::StorageInit {
            message: format!("cannot create {}: {e}", parent.display()),
        })?;
    }

    debug!(database_url, "opening database");
    Database::connect(database_url)
        .await
        .map_err(|e| Error::StorageInit {
            message: e.to_string(),
        })
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_transactions_date")
            .table(Transaction)
            .col(TransactionColumn::Date)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_transactions_category")
            .table(Transaction)
            .col(TransactionColumn::CategoryId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_transactions_type")
            .table(Transaction)
            .col(TransactionColumn::TransactionType)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_budgets_category")
            .table(Budget)
            .col(BudgetColumn::CategoryId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_budgets_period")
            .table(Budget)
            .col(BudgetColumn::StartDate)
            .col(BudgetColumn::EndDate)
            .to_owned(),
    ]
}

/// Creates all tables and lookup indexes if they are absent.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = vec![
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Budget),
        schema.create_table_from_entity(UserPreference),
    ];
    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    for index in indexes() {
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}
