//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations,
//! plus a [`Record`] implementation that lets the store handle every table the same way.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user_preference;

use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, Select};

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user_preference::{
    Column as UserPreferenceColumn, Entity as UserPreference, Model as UserPreferenceModel,
};

/// A table keyed by a single string identifier that the store can list, upsert,
/// patch and delete generically.
pub trait Record: EntityTrait {
    /// Entity name used in errors and log fields.
    const KIND: &'static str;

    /// Partial update accepted by [`Store::update`](crate::core::store::Store::update).
    type Patch: std::fmt::Debug + Send;

    /// The primary key column.
    fn id_column() -> Self::Column;

    /// The primary key value of a model.
    fn record_id(model: &Self::Model) -> &str;

    /// Applies the default listing order.
    fn ordered(select: Select<Self>) -> Select<Self>;

    /// Writes the supplied fields of `patch` into `active`, refreshing any audit
    /// timestamp to `now`.
    fn apply_patch(active: &mut Self::ActiveModel, patch: Self::Patch, now: DateTime<Utc>);
}
