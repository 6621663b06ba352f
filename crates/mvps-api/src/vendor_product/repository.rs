//! Vendor Product Repository

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use utoipa::IntoParams;

use super::entity::{PriceOffer, StockMovement, VendorProduct};
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::{date_text, now_millis, SqliteTable};

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vendor_products (
    vendor_product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    vendor_id INTEGER NOT NULL REFERENCES vendors(vendor_id),
    product_id INTEGER NOT NULL REFERENCES products(product_id),
    vendor_sku TEXT,
    cost_price REAL NOT NULL,
    mrp REAL,
    discount_percentage REAL NOT NULL DEFAULT 0,
    final_price REAL GENERATED ALWAYS AS
        (ROUND(cost_price * (1 - discount_percentage / 100.0), 2)) STORED,
    minimum_order_quantity INTEGER NOT NULL DEFAULT 1,
    stock_quantity INTEGER NOT NULL DEFAULT 0,
    expiry_date TEXT,
    is_available INTEGER NOT NULL DEFAULT 1,
    delivery_time_days INTEGER NOT NULL DEFAULT 7,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    CONSTRAINT unique_vendor_product UNIQUE (vendor_id, product_id)
);
CREATE INDEX IF NOT EXISTS idx_vendor_products_product ON vendor_products(product_id);
CREATE INDEX IF NOT EXISTS idx_vendor_products_final_price ON vendor_products(final_price);

CREATE TABLE IF NOT EXISTS vendor_stock_movements (
    movement_id INTEGER PRIMARY KEY AUTOINCREMENT,
    vendor_product_id INTEGER NOT NULL REFERENCES vendor_products(vendor_product_id),
    previous_quantity INTEGER NOT NULL,
    new_quantity INTEGER NOT NULL,
    change_amount INTEGER NOT NULL,
    changed_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_stock_movements_vp ON vendor_stock_movements(vendor_product_id, changed_at);
"#;

/// Vendor product list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VendorProductFilter {
    pub vendor_id: Option<RowKey>,
    pub product_id: Option<RowKey>,
    pub is_available: Option<bool>,
    /// Inclusive lower bound on final price
    pub min_price: Option<f64>,
    /// Inclusive upper bound on final price
    pub max_price: Option<f64>,
}

impl VendorProductFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("vendor_id", self.vendor_id)
            .eq("product_id", self.product_id)
            .eq("is_available", self.is_available)
            .at_least("final_price", self.min_price)
            .at_most("final_price", self.max_price)
    }
}

/// Which offers of each product a market query keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferScope {
    /// Only the cheapest offer, ties to the oldest listing; sorted by product name
    CheapestPerProduct,
    /// Every offer, cheapest first within each product
    All,
}

/// Available offers joined with product and vendor names.
///
/// `ranked` filters apply before the per-product ranking and may use the
/// `p.`, `vp.` and `v.` aliases; `offers` filters apply to the ranked rows
/// by output column name.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketQuery {
    pub scope: OfferScope,
    /// Drop offers with no stock before ranking
    pub in_stock_only: bool,
    pub ranked: FilterSet,
    pub offers: FilterSet,
}

impl MarketQuery {
    pub fn new(scope: OfferScope) -> Self {
        Self {
            scope,
            in_stock_only: true,
            ranked: FilterSet::new(),
            offers: FilterSet::new(),
        }
    }

    fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            "WITH ranked AS ( \
             SELECT p.product_id, p.product_name, p.generic_name, p.category_id, \
             vp.vendor_product_id, vp.vendor_id, v.vendor_name, vp.cost_price, \
             vp.discount_percentage, vp.final_price, vp.stock_quantity, vp.is_available, \
             ROW_NUMBER() OVER (PARTITION BY vp.product_id \
                 ORDER BY vp.final_price ASC, vp.vendor_product_id ASC) AS price_rank, \
             MIN(vp.final_price) OVER (PARTITION BY vp.product_id) AS lowest_price \
             FROM vendor_products vp \
             JOIN products p ON p.product_id = vp.product_id \
             JOIN vendors v ON v.vendor_id = vp.vendor_id \
             WHERE vp.is_available = 1",
        );
        if self.in_stock_only {
            qb.push(" AND vp.stock_quantity > 0");
        }
        self.ranked.push_conditions(&mut qb);
        qb.push(") SELECT *, final_price <= lowest_price AS is_lowest FROM ranked WHERE 1=1");
        if self.scope == OfferScope::CheapestPerProduct {
            qb.push(" AND price_rank = 1");
        }
        self.offers.push_conditions(&mut qb);
        match self.scope {
            OfferScope::CheapestPerProduct => qb.push(" ORDER BY product_name ASC, product_id ASC"),
            OfferScope::All => qb.push(" ORDER BY product_id ASC, final_price ASC, vendor_product_id ASC"),
        };
        qb
    }
}

/// Outcome of a single stock change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Applied { previous: i64, new: i64 },
    Unchanged,
    NotFound,
}

pub struct VendorProductRepository {
    pool: SqlitePool,
}

impl VendorProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert, then reload so the generated price is populated.
    pub async fn insert(&self, vp: &mut VendorProduct) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO vendor_products (vendor_id, product_id, vendor_sku, cost_price, mrp, \
             discount_percentage, minimum_order_quantity, stock_quantity, expiry_date, \
             is_available, delivery_time_days, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(vp.vendor_id)
        .bind(vp.product_id)
        .bind(&vp.vendor_sku)
        .bind(vp.cost_price)
        .bind(vp.mrp)
        .bind(vp.discount_percentage)
        .bind(vp.minimum_order_quantity)
        .bind(vp.stock_quantity)
        .bind(date_text(vp.expiry_date))
        .bind(vp.is_available)
        .bind(vp.delivery_time_days)
        .bind(vp.created_at.timestamp_millis())
        .bind(vp.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        *vp = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::internal(format!("vendor product {id} vanished after insert")))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<VendorProduct>> {
        let vp = sqlx::query_as::<_, VendorProduct>(
            "SELECT * FROM vendor_products WHERE vendor_product_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vp)
    }

    /// Cheapest available, in-stock listing of a product. Ties go to the oldest listing.
    pub async fn find_cheapest_for_product(&self, product_id: RowKey) -> Result<Option<VendorProduct>> {
        let vp = sqlx::query_as::<_, VendorProduct>(
            "SELECT * FROM vendor_products \
             WHERE product_id = ? AND is_available = 1 AND stock_quantity > 0 \
             ORDER BY final_price ASC, vendor_product_id ASC LIMIT 1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vp)
    }

    /// Persist editable fields and reload the generated price.
    pub async fn update(&self, vp: &mut VendorProduct) -> Result<()> {
        let result = sqlx::query(
            "UPDATE vendor_products SET vendor_sku = ?, cost_price = ?, mrp = ?, \
             discount_percentage = ?, minimum_order_quantity = ?, stock_quantity = ?, \
             expiry_date = ?, is_available = ?, delivery_time_days = ?, updated_at = ? \
             WHERE vendor_product_id = ?",
        )
        .bind(&vp.vendor_sku)
        .bind(vp.cost_price)
        .bind(vp.mrp)
        .bind(vp.discount_percentage)
        .bind(vp.minimum_order_quantity)
        .bind(vp.stock_quantity)
        .bind(date_text(vp.expiry_date))
        .bind(vp.is_available)
        .bind(vp.delivery_time_days)
        .bind(vp.updated_at.timestamp_millis())
        .bind(vp.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("VendorProduct", vp.id));
        }
        if let Some(stored) = self.find_by_id(vp.id).await? {
            *vp = stored;
        }
        Ok(())
    }

    /// Set the stock level and record the movement atomically.
    pub async fn set_stock(&self, id: RowKey, new_quantity: i64) -> Result<StockChange> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<i64> = sqlx::query_scalar(
            "SELECT stock_quantity FROM vendor_products WHERE vendor_product_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(previous) = previous else {
            return Ok(StockChange::NotFound);
        };
        if previous == new_quantity {
            return Ok(StockChange::Unchanged);
        }

        let now = now_millis().timestamp_millis();
        sqlx::query(
            "UPDATE vendor_products SET stock_quantity = ?, updated_at = ? WHERE vendor_product_id = ?",
        )
        .bind(new_quantity)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO vendor_stock_movements \
             (vendor_product_id, previous_quantity, new_quantity, change_amount, changed_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(previous)
        .bind(new_quantity)
        .bind(new_quantity - previous)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StockChange::Applied { previous, new: new_quantity })
    }

    /// Offers across the marketplace, ranked per product by final price.
    pub async fn market_offers(&self, query: &MarketQuery) -> Result<Vec<PriceOffer>> {
        let mut qb = query.build();
        let offers = qb.build_query_as::<PriceOffer>().fetch_all(&self.pool).await?;
        Ok(offers)
    }

    /// Movements for one listing, newest first.
    pub async fn stock_history(&self, id: RowKey) -> Result<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT m.movement_id, m.vendor_product_id, vp.product_id, p.product_name, \
             vp.vendor_id, v.vendor_name, vp.vendor_sku, m.previous_quantity, m.new_quantity, \
             m.change_amount, m.changed_at \
             FROM vendor_stock_movements m \
             JOIN vendor_products vp ON vp.vendor_product_id = m.vendor_product_id \
             JOIN products p ON p.product_id = vp.product_id \
             JOIN vendors v ON v.vendor_id = vp.vendor_id \
             WHERE m.vendor_product_id = ? \
             ORDER BY m.changed_at DESC, m.movement_id DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}

impl SqliteTable for VendorProductRepository {
    type Entity = VendorProduct;
    const TABLE: &'static str = "vendor_products";
    const KEY_COLUMN: &'static str = "vendor_product_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
