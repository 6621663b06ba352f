//! Category Repository

use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use super::entity::Category;
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::SqliteTable;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS product_categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL,
    description TEXT,
    parent_category_id INTEGER REFERENCES product_categories(category_id),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_categories_parent ON product_categories(parent_category_id);
"#;

/// Category list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryFilter {
    /// Direct children of this category
    pub parent_category_id: Option<RowKey>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl CategoryFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("parent_category_id", self.parent_category_id)
            .contains(&["category_name"], self.search.clone())
    }
}

pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, category: &mut Category) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO product_categories (category_name, description, parent_category_id, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_category_id)
        .bind(category.created_at.timestamp_millis())
        .bind(category.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        category.id = result.last_insert_rowid();
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM product_categories WHERE category_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn update(&self, category: &Category) -> Result<()> {
        let result = sqlx::query(
            "UPDATE product_categories SET category_name = ?, description = ?, \
             parent_category_id = ?, updated_at = ? WHERE category_id = ?",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_category_id)
        .bind(category.updated_at.timestamp_millis())
        .bind(category.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Category", category.id));
        }
        Ok(())
    }

    /// Hard delete. Fails with a conflict while products or subcategories
    /// still reference the category.
    pub async fn delete(&self, id: RowKey) -> Result<()> {
        let result = sqlx::query("DELETE FROM product_categories WHERE category_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Category", id));
        }
        Ok(())
    }

    /// Whether `candidate` is `id` itself or lies below it.
    pub async fn is_within(&self, candidate: RowKey, id: RowKey) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "WITH RECURSIVE subtree(category_id) AS ( \
                 SELECT ? \
                 UNION \
                 SELECT c.category_id FROM product_categories c \
                 JOIN subtree s ON c.parent_category_id = s.category_id) \
             SELECT category_id FROM subtree WHERE category_id = ?",
        )
        .bind(id)
        .bind(candidate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}

impl SqliteTable for CategoryRepository {
    type Entity = Category;
    const TABLE: &'static str = "product_categories";
    const KEY_COLUMN: &'static str = "category_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::product::{Product, ProductRepository};

    #[tokio::test]
    async fn test_subtree_membership() {
        let pool = db::connect_in_memory().await.unwrap();
        let repo = CategoryRepository::new(pool);

        let mut root = Category::new("Medicines");
        repo.insert(&mut root).await.unwrap();
        let mut child = Category::new("Antibiotics").with_parent(root.id);
        repo.insert(&mut child).await.unwrap();
        let mut grandchild = Category::new("Penicillins").with_parent(child.id);
        repo.insert(&mut grandchild).await.unwrap();
        let mut other = Category::new("Devices");
        repo.insert(&mut other).await.unwrap();

        assert!(repo.is_within(root.id, root.id).await.unwrap());
        assert!(repo.is_within(grandchild.id, root.id).await.unwrap());
        assert!(!repo.is_within(root.id, grandchild.id).await.unwrap());
        assert!(!repo.is_within(other.id, root.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_products_reference_existing_categories() {
        let pool = db::connect_in_memory().await.unwrap();
        let categories = CategoryRepository::new(pool.clone());
        let products = ProductRepository::new(pool);

        let mut dangling = Product::new("Orphan");
        dangling.category_id = Some(77);
        assert!(products.insert(&mut dangling).await.is_err());

        let mut category = Category::new("Analgesics");
        categories.insert(&mut category).await.unwrap();
        let mut product = Product::new("Crocin 500");
        product.category_id = Some(category.id);
        products.insert(&mut product).await.unwrap();

        let err = categories.delete(category.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }), "got {err:?}");
    }
}
