//! Transaction entity - A single income or expense entry.
//!
//! `date` is the user-assigned date of the entry and is what every statistic filters on;
//! `created_at`/`updated_at` are audit timestamps. Recurrence fields are advisory only,
//! nothing in the crate expands them into scheduled entries.

use super::Record;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, QueryOrder, Select, Set};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of money flow. Categories serve exactly one of these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl TransactionType {
    /// Lowercase name as stored in the database and in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a recurring entry repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    /// Every day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every week
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every month
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every year
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// Ordered free-text labels, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct TagList(pub Vec<String>);

impl From<Vec<String>> for TagList {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Generated identifier, immutable once assigned
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Positive amount, currency-agnostic
    pub amount: f64,
    /// Non-empty free text
    pub description: String,
    /// Identifier of the category this entry is filed under
    pub category_id: String,
    /// User-assigned date of the entry
    pub date: DateTimeUtc,
    /// Optional free-text location
    pub location: Option<String>,
    /// Optional labels
    #[sea_orm(column_type = "Json", nullable)]
    pub tags: Option<TagList>,
    /// Advisory recurrence flag
    pub recurring: Option<bool>,
    /// Advisory recurrence frequency
    #[serde(rename = "recurringFrequency", alias = "recurring_frequency")]
    pub recurring_frequency: Option<RecurringFrequency>,
    /// When the entry was created
    pub created_at: DateTimeUtc,
    /// When the entry was last modified
    pub updated_at: DateTimeUtc,
}

/// Transactions reference categories by id only; no database-level foreign key is
/// declared so that imports may arrive in any order.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a new transaction. Identifier and audit timestamps are assigned on save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Positive amount
    pub amount: f64,
    /// Non-empty free text
    pub description: String,
    /// Category to file the entry under
    pub category_id: String,
    /// User-assigned date
    pub date: DateTime<Utc>,
    /// Optional location
    #[serde(default)]
    pub location: Option<String>,
    /// Optional labels
    #[serde(default)]
    pub tags: Option<TagList>,
    /// Advisory recurrence flag
    #[serde(default)]
    pub recurring: Option<bool>,
    /// Advisory recurrence frequency
    #[serde(default, rename = "recurringFrequency")]
    pub recurring_frequency: Option<RecurringFrequency>,
}

impl NewTransaction {
    /// Creates an entry with only the required fields set.
    pub fn new(
        transaction_type: TransactionType,
        amount: f64,
        description: impl Into<String>,
        category_id: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_type,
            amount,
            description: description.into(),
            category_id: category_id.into(),
            date,
            location: None,
            tags: None,
            recurring: None,
            recurring_frequency: None,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(TagList(tags.into_iter().map(Into::into).collect()));
        self
    }

    /// Materializes the stored record. Both audit timestamps are set to `now`.
    #[must_use]
    pub fn into_model(self, id: String, now: DateTime<Utc>) -> Model {
        Model {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            description: self.description.trim().to_string(),
            category_id: self.category_id,
            date: self.date,
            location: self.location,
            tags: self.tags,
            recurring: self.recurring,
            recurring_frequency: self.recurring_frequency,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: `None` leaves a field untouched. For nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionPatch {
    /// New type
    pub transaction_type: Option<TransactionType>,
    /// New amount
    pub amount: Option<f64>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category_id: Option<String>,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New location
    pub location: Option<Option<String>>,
    /// New tags
    pub tags: Option<Option<TagList>>,
    /// New recurrence flag
    pub recurring: Option<Option<bool>>,
    /// New recurrence frequency
    pub recurring_frequency: Option<Option<RecurringFrequency>>,
}

impl TransactionPatch {
    /// Returns `base` with this patch applied, leaving audit timestamps alone.
    #[must_use]
    pub fn merged(&self, base: &Model) -> Model {
        let mut out = base.clone();
        if let Some(v) = self.transaction_type {
            out.transaction_type = v;
        }
        if let Some(v) = self.amount {
            out.amount = v;
        }
        if let Some(v) = &self.description {
            out.description.clone_from(v);
        }
        if let Some(v) = &self.category_id {
            out.category_id.clone_from(v);
        }
        if let Some(v) = self.date {
            out.date = v;
        }
        if let Some(v) = &self.location {
            out.location.clone_from(v);
        }
        if let Some(v) = &self.tags {
            out.tags.clone_from(v);
        }
        if let Some(v) = self.recurring {
            out.recurring = v;
        }
        if let Some(v) = self.recurring_frequency {
            out.recurring_frequency = v;
        }
        out
    }
}

impl Record for Entity {
    const KIND: &'static str = "transaction";
    type Patch = TransactionPatch;

    fn id_column() -> Column {
        Column::Id
    }

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn ordered(select: Select<Self>) -> Select<Self> {
        select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::CreatedAt)
    }

    fn apply_patch(active: &mut ActiveModel, patch: TransactionPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.transaction_type {
            active.transaction_type = Set(v);
        }
        if let Some(v) = patch.amount {
            active.amount = Set(v);
        }
        if let Some(v) = patch.description {
            active.description = Set(v.trim().to_string());
        }
        if let Some(v) = patch.category_id {
            active.category_id = Set(v);
        }
        if let Some(v) = patch.date {
            active.date = Set(v);
        }
        if let Some(v) = patch.location {
            active.location = Set(v);
        }
        if let Some(v) = patch.tags {
            active.tags = Set(v);
        }
        if let Some(v) = patch.recurring {
            active.recurring = Set(v);
        }
        if let Some(v) = patch.recurring_frequency {
            active.recurring_frequency = Set(v);
        }
        active.updated_at = Set(now);
    }
}
