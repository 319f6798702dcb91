//! User preference entity - Key-value pairs for application settings.
//! Values are stored JSON-encoded so any JSON value round-trips.

use super::Record;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Select, Set};
use serde::{Deserialize, Serialize};

/// User preference database model - stores key-value configuration pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_preferences")]
pub struct Model {
    /// Preference key (e.g., `"theme"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// JSON-encoded value
    pub value: String,
    /// When this preference was last written
    pub updated_at: DateTimeUtc,
}

/// `UserPreference` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds a row holding `value` encoded as JSON.
    #[must_use]
    pub fn encode(key: impl Into<String>, value: &serde_json::Value, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
            updated_at: now,
        }
    }

    /// Decodes the stored value. Rows written by other tools may hold bare text,
    /// which is returned as a JSON string.
    #[must_use]
    pub fn decoded_value(&self) -> serde_json::Value {
        serde_json::from_str(&self.value)
            .unwrap_or_else(|_| serde_json::Value::String(self.value.clone()))
    }
}

impl Record for Entity {
    const KIND: &'static str = "preference";
    type Patch = serde_json::Value;

    fn id_column() -> Column {
        Column::Key
    }

    fn record_id(model: &Model) -> &str {
        &model.key
    }

    fn ordered(select: Select<Self>) -> Select<Self> {
        select.order_by_asc(Column::Key)
    }

    fn apply_patch(active: &mut ActiveModel, patch: serde_json::Value, now: DateTime<Utc>) {
        active.value = Set(patch.to_string());
        active.updated_at = Set(now);
    }
}
