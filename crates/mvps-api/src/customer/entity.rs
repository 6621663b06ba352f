//! Customer Entity

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::store::{now_millis, EpochMillis};

crate::text_enum! {
    /// Customer segment
    pub enum CustomerType {
        Retail => "retail",
        Wholesale => "wholesale",
        Institution => "institution",
    }
}

impl Default for CustomerType {
    fn default() -> Self {
        Self::Retail
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Customer {
    #[sqlx(rename = "customer_id")]
    pub id: RowKey,
    #[sqlx(rename = "customer_name")]
    pub name: String,
    pub email: Option<String>,
    /// Unique when present
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub customer_type: CustomerType,
    pub registration_date: Option<NaiveDate>,
    pub is_active: bool,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            pincode: None,
            customer_type: CustomerType::default(),
            registration_date: Some(now.date_naive()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for Customer {
    fn key(&self) -> RowKey {
        self.id
    }
}
