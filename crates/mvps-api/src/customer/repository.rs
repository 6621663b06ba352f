//! Customer Repository

use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use super::entity::{Customer, CustomerType};
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::{date_text, SqliteTable};

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name TEXT NOT NULL,
    email TEXT,
    phone TEXT UNIQUE,
    address TEXT,
    city TEXT,
    state TEXT,
    pincode TEXT,
    customer_type TEXT NOT NULL DEFAULT 'retail',
    registration_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_customers_type ON customers(customer_type);
"#;

const SEARCH_COLUMNS: &[&str] = &["customer_name", "email", "phone"];

/// Customer list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    pub customer_type: Option<CustomerType>,
    pub is_active: Option<bool>,
    /// Case-insensitive city match
    pub city: Option<String>,
    /// Case-insensitive substring of name, email or phone
    pub search: Option<String>,
}

impl CustomerFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("customer_type", self.customer_type.map(|t| t.as_str()))
            .eq("is_active", self.is_active)
            .eq_ignore_case("city", self.city.clone())
            .contains(SEARCH_COLUMNS, self.search.clone())
    }
}

pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, customer: &mut Customer) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO customers (customer_name, email, phone, address, city, state, pincode, \
             customer_type, registration_date, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.pincode)
        .bind(customer.customer_type.as_str())
        .bind(date_text(customer.registration_date))
        .bind(customer.is_active)
        .bind(customer.created_at.timestamp_millis())
        .bind(customer.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        customer.id = result.last_insert_rowid();
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE customer_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE phone = ?")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn update(&self, customer: &Customer) -> Result<()> {
        let result = sqlx::query(
            "UPDATE customers SET customer_name = ?, email = ?, phone = ?, address = ?, city = ?, \
             state = ?, pincode = ?, customer_type = ?, registration_date = ?, is_active = ?, \
             updated_at = ? WHERE customer_id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.pincode)
        .bind(customer.customer_type.as_str())
        .bind(date_text(customer.registration_date))
        .bind(customer.is_active)
        .bind(customer.updated_at.timestamp_millis())
        .bind(customer.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Customer", customer.id));
        }
        Ok(())
    }
}

impl SqliteTable for CustomerRepository {
    type Entity = Customer;
    const TABLE: &'static str = "customers";
    const KEY_COLUMN: &'static str = "customer_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
