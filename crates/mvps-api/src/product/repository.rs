//! Product Repository

use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use super::entity::Product;
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::SqliteTable;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    generic_name TEXT,
    category_id INTEGER REFERENCES product_categories(category_id),
    description TEXT,
    manufacturer TEXT,
    hsn_code TEXT,
    unit_of_measure TEXT,
    barcode TEXT UNIQUE,
    prescription_required INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
"#;

const SEARCH_COLUMNS: &[&str] = &["product_name", "generic_name"];

/// Product list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub is_active: Option<bool>,
    pub prescription_required: Option<bool>,
    /// Case-insensitive substring of product or generic name
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("category_id", self.category_id)
            .eq("is_active", self.is_active)
            .eq("prescription_required", self.prescription_required)
            .contains(SEARCH_COLUMNS, self.search.clone())
    }
}

pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, product: &mut Product) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO products (product_name, generic_name, category_id, description, \
             manufacturer, hsn_code, unit_of_measure, barcode, prescription_required, is_active, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.generic_name)
        .bind(product.category_id)
        .bind(&product.description)
        .bind(&product.manufacturer)
        .bind(&product.hsn_code)
        .bind(&product.unit_of_measure)
        .bind(&product.barcode)
        .bind(product.prescription_required)
        .bind(product.is_active)
        .bind(product.created_at.timestamp_millis())
        .bind(product.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        product.id = result.last_insert_rowid();
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE barcode = ?")
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn update(&self, product: &Product) -> Result<()> {
        let result = sqlx::query(
            "UPDATE products SET product_name = ?, generic_name = ?, category_id = ?, \
             description = ?, manufacturer = ?, hsn_code = ?, unit_of_measure = ?, barcode = ?, \
             prescription_required = ?, is_active = ?, updated_at = ? WHERE product_id = ?",
        )
        .bind(&product.name)
        .bind(&product.generic_name)
        .bind(product.category_id)
        .bind(&product.description)
        .bind(&product.manufacturer)
        .bind(&product.hsn_code)
        .bind(&product.unit_of_measure)
        .bind(&product.barcode)
        .bind(product.prescription_required)
        .bind(product.is_active)
        .bind(product.updated_at.timestamp_millis())
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Product", product.id));
        }
        Ok(())
    }
}

impl SqliteTable for ProductRepository {
    type Entity = Product;
    const TABLE: &'static str = "products";
    const KEY_COLUMN: &'static str = "product_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
