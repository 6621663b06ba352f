//! Database pool and schema setup

use std::str::FromStr;

use mvps_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::{category, customer, order, product, vendor, vendor_order, vendor_product};

/// Table definitions in foreign key order.
const SCHEMAS: &[(&str, &str)] = &[
    ("vendors", vendor::repository::SCHEMA),
    ("product_categories", category::repository::SCHEMA),
    ("products", product::repository::SCHEMA),
    ("customers", customer::repository::SCHEMA),
    ("vendor_products", vendor_product::repository::SCHEMA),
    ("orders", order::repository::SCHEMA),
    ("vendor_orders", vendor_order::repository::SCHEMA),
];

/// Open a pool for the configured database.
///
/// In-memory databases exist per connection, so they get a single connection
/// that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    info!(url = %config.url, in_memory = config.is_in_memory(), "Database pool opened");
    Ok(pool)
}

/// Create all tables and indexes if they do not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, ddl) in SCHEMAS {
        sqlx::raw_sql(ddl).execute(pool).await?;
        tracing::debug!(schema = name, "Schema applied");
    }
    info!(tables = SCHEMAS.len(), "Schema initialized");
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = connect(&config).await?;
    init_schema(&pool).await?;
    Ok(pool)
}
