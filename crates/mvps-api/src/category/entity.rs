//! Category Entity

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::store::{now_millis, EpochMillis};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    #[sqlx(rename = "category_id")]
    pub id: RowKey,
    #[sqlx(rename = "category_name")]
    pub name: String,
    pub description: Option<String>,
    /// Top level when absent
    pub parent_category_id: Option<RowKey>,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            name: name.into(),
            description: None,
            parent_category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent: RowKey) -> Self {
        self.parent_category_id = Some(parent);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for Category {
    fn key(&self) -> RowKey {
        self.id
    }
}
