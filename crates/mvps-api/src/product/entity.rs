//! Product Entity
//!
//! A catalogue item; vendors price and stock it through vendor products.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::store::{now_millis, EpochMillis};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    #[sqlx(rename = "product_id")]
    pub id: RowKey,
    #[sqlx(rename = "product_name")]
    pub name: String,
    pub generic_name: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    /// Harmonized System of Nomenclature code
    pub hsn_code: Option<String>,
    pub unit_of_measure: Option<String>,
    pub barcode: Option<String>,
    pub prescription_required: bool,
    pub is_active: bool,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            name: name.into(),
            generic_name: None,
            category_id: None,
            description: None,
            manufacturer: None,
            hsn_code: None,
            unit_of_measure: None,
            barcode: None,
            prescription_required: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_generic_name(mut self, generic_name: impl Into<String>) -> Self {
        self.generic_name = Some(generic_name.into());
        self
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for Product {
    fn key(&self) -> RowKey {
        self.id
    }
}
