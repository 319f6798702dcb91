//! Budget entity - A spending cap for one category over a period.
//!
//! The store does not tie `period` to calendar boundaries; `start_date`/`end_date`
//! are taken as given and interpretation is left to whoever reads them.

use super::Record;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Select, Set};
use serde::{Deserialize, Serialize};

/// Length of a budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// One day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// One week
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// One month
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Generated identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Category the cap applies to
    pub category_id: String,
    /// Cap amount
    pub amount: f64,
    /// Period length
    pub period: BudgetPeriod,
    /// First instant covered
    pub start_date: DateTimeUtc,
    /// Last instant covered
    pub end_date: DateTimeUtc,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When the budget was last modified
    pub updated_at: DateTimeUtc,
}

/// `Budget` has no declared relationships; it refers to its category by id.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a new budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// Category the cap applies to
    pub category_id: String,
    /// Cap amount
    pub amount: f64,
    /// Period length
    pub period: BudgetPeriod,
    /// First instant covered
    pub start_date: DateTime<Utc>,
    /// Last instant covered
    pub end_date: DateTime<Utc>,
}

impl NewBudget {
    /// Materializes the stored record with both audit timestamps at `now`.
    #[must_use]
    pub fn into_model(self, id: String, now: DateTime<Utc>) -> Model {
        Model {
            id,
            category_id: self.category_id,
            amount: self.amount,
            period: self.period,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a budget.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BudgetPatch {
    /// New category
    pub category_id: Option<String>,
    /// New cap
    pub amount: Option<f64>,
    /// New period length
    pub period: Option<BudgetPeriod>,
    /// New start
    pub start_date: Option<DateTime<Utc>>,
    /// New end
    pub end_date: Option<DateTime<Utc>>,
}

impl BudgetPatch {
    /// Returns `base` with this patch applied, leaving audit timestamps alone.
    #[must_use]
    pub fn merged(&self, base: &Model) -> Model {
        let mut out = base.clone();
        if let Some(v) = &self.category_id {
            out.category_id.clone_from(v);
        }
        if let Some(v) = self.amount {
            out.amount = v;
        }
        if let Some(v) = self.period {
            out.period = v;
        }
        if let Some(v) = self.start_date {
            out.start_date = v;
        }
        if let Some(v) = self.end_date {
            out.end_date = v;
        }
        out
    }
}

impl Record for Entity {
    const KIND: &'static str = "budget";
    type Patch = BudgetPatch;

    fn id_column() -> Column {
        Column::Id
    }

    fn record_id(model: &Model) -> &str {
        &model.id
    }

    fn ordered(select: Select<Self>) -> Select<Self> {
        select.order_by_desc(Column::StartDate)
    }

    fn apply_patch(active: &mut ActiveModel, patch: BudgetPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.category_id {
            active.category_id = Set(v);
        }
        if let Some(v) = patch.amount {
            active.amount = Set(v);
        }
        if let Some(v) = patch.period {
            active.period = Set(v);
        }
        if let Some(v) = patch.start_date {
            active.start_date = Set(v);
        }
        if let Some(v) = patch.end_date {
            active.end_date = Set(v);
        }
        active.updated_at = Set(now);
    }
}
