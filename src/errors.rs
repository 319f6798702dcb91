//! Unified error types for the ledger.
//!
//! Storage failures are split by phase (init, read, write) so callers can decide
//! whether to retry, fall back, or give up. Expected control-flow outcomes such as
//! a category that is still in use are not errors; see
//! [`CategoryDeletion`](crate::cache::CategoryDeletion).

use thiserror::Error;

/// The kind of write a [`Error::StorageWrite`] was attempting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or replace
    Save,
    /// Partial update
    Update,
    /// Single-record delete
    Delete,
    /// Bulk delete
    Clear,
}

impl WriteOp {
    /// Verb used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Clear => "clear",
        }
    }
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the store, the coordinator and the configuration layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The storage medium could not be opened or the schema could not be created.
    /// Fatal: the application cannot proceed.
    #[error("Storage initialization failed: {message}")]
    StorageInit {
        /// Underlying cause
        message: String,
    },

    /// Reading a collection or a record failed.
    #[error("Failed to read {entity}: {message}")]
    StorageRead {
        /// Entity kind being read (e.g. `"transaction"`)
        entity: &'static str,
        /// Underlying cause
        message: String,
    },

    /// Writing a record failed. Nothing may be assumed about partial success.
    #[error("Failed to {op} {entity} {id}: {message}")]
    StorageWrite {
        /// Kind of write that failed
        op: WriteOp,
        /// Entity kind being written
        entity: &'static str,
        /// Identifier of the record being written (empty for bulk statements)
        id: String,
        /// Underlying cause
        message: String,
    },

    /// An import document could not be parsed as a snapshot.
    #[error("Import document has an unexpected format: {message}")]
    ImportFormat {
        /// Parser message
        message: String,
    },

    /// An operation was issued before [`Store::initialize`](crate::core::store::Store::initialize).
    #[error("Storage has not been initialized")]
    NotReady,

    /// The targeted record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Requested identifier
        id: String,
    },

    /// A transaction's type does not match the type of its category.
    #[error("Category {category_id} is for {expected} entries, not {actual}")]
    CategoryTypeMismatch {
        /// Category identifier
        category_id: String,
        /// Type served by the category
        expected: String,
        /// Type that was requested
        actual: String,
    },

    /// Amounts must be finite and strictly positive.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Any other rejected input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// File system error outside the database.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw database error that was not attributed to a specific operation.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    /// Builds a [`Error::StorageRead`] from a database error.
    pub fn read(entity: &'static str, err: impl std::fmt::Display) -> Self {
        Self::StorageRead {
            entity,
            message: err.to_string(),
        }
    }

    /// Builds a [`Error::StorageWrite`] from a database error.
    pub fn write(
        op: WriteOp,
        entity: &'static str,
        id: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::StorageWrite {
            op,
            entity,
            id: id.into(),
            message: err.to_string(),
        }
    }

    /// Builds a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Builds a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry or fall back instead of aborting.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::StorageInit { .. } | Self::NotReady)
    }

    /// Short message naming the failed operation in user terms, without internal detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageInit { .. } | Self::NotReady => "Cannot open the ledger".to_string(),
            Self::StorageRead { entity, .. } => format!("Cannot load {entity} records"),
            Self::StorageWrite {
                op: WriteOp::Clear,
                entity,
                ..
            } => format!("Cannot clear {entity} records"),
            Self::StorageWrite { op, entity, .. } => format!("Cannot {op} {entity}"),
            Self::ImportFormat { .. } => {
                "Cannot import data, please check the file format".to_string()
            }
            Self::NotFound { entity, .. } => format!("The {entity} no longer exists"),
            Self::CategoryTypeMismatch { .. } => {
                "The selected category does not match the entry type".to_string()
            }
            Self::InvalidAmount { .. } => "Please enter an amount greater than zero".to_string(),
            Self::Validation { message } => message.clone(),
            Self::Config { .. } => "Cannot read the configuration".to_string(),
            Self::Io(_) => "Cannot access the file".to_string(),
            Self::Database(_) => "Cannot access the ledger".to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
