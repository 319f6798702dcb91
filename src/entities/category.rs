//! Category entity - Groups transactions of one type for display and statistics.
//!
//! `name`, `icon` and `color` are presentation metadata; the ledger stores them but
//! never interprets them. Default categories are the built-in seed set and survive
//! a full reset.

use super::Record;
use super::transaction::TransactionType;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Select, Set};
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier across income and expense categories
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Display glyph or emoji
    pub icon: String,
    /// Display color token
    pub color: String,
    /// The transaction type this category serves
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// Optional informational spending cap
    #[serde(default)]
    pub budget: Option<f64>,
    /// Part of the built-in seed set
    #[serde(rename = "isDefault", alias = "is_default", default)]
    pub is_default: bool,
}

/// `Category` has no declared relationships; transactions refer to it by id.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a user-created category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Display name
    pub name: String,
    /// Display glyph or emoji
    pub icon: String,
    /// Display color token
    pub color: String,
    /// The transaction type this category serves
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// Optional informational spending cap
    #[serde(default)]
    pub budget: Option<f64>,
    /// Usually false for user-created categories
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

impl NewCategory {
    /// Creates a non-default category without a cap.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        category_type: TransactionType,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            category_type,
            budget: None,
            is_default: false,
        }
    }

    /// Materializes the stored record.
    #[must_use]
    pub fn into_model(self, id: String) -> Model {
        Model {
            id,
            name: self.name.trim().to_string(),
            icon: self.icon,
            color: self.color,
            category_type: self.category_type,
            budget: self.budget,
            is_default: self.is_default,
        }
    }
}

/// Partial update for a category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryPatch {
    /// New display name
    pub name: Option<String>,
    /// New glyph
    pub icon: Option<String>,
    /// New color token
    pub color: Option<String>,
    /// New transaction type
    pub category_type: Option<TransactionType>,
    /// New cap; `Some(None)` clears it
    pub budget: Option<Option<f64>>,
}

impl Record for Entity {
    const KIND: &'static str = "category";
    type Patch = CategoryPatch;

    fn id_column() -> Column {
        Column::Id
    }

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn ordered(select: Select<Self>) -> Select<Self> {
        select.order_by_asc(Column::Name)
    }

    // Categories carry no audit timestamps.
    fn apply_patch(active: &mut ActiveModel, patch: CategoryPatch, _now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            active.name = Set(v.trim().to_string());
        }
        if let Some(v) = patch.icon {
            active.icon = Set(v);
        }
        if let Some(v) = patch.color {
            active.color = Set(v);
        }
        if let Some(v) = patch.category_type {
            active.category_type = Set(v);
        }
        if let Some(v) = patch.budget {
            active.budget = Set(v);
        }
    }
}
