//! Development Data Seeder
//!
//! Seeds a small marketplace on startup when the store is empty:
//! vendors in three cities, a two level category tree, a handful of common
//! medicines, customers of
//! every segment and vendor listings at different prices so that cheapest
//! vendor selection has something to choose from.

use sqlx::SqlitePool;
use tracing::info;

use crate::category::{Category, CategoryRepository};
use crate::customer::{Customer, CustomerRepository, CustomerType};
use crate::product::{Product, ProductRepository};
use crate::shared::error::Result;
use crate::vendor::{Vendor, VendorRepository};
use crate::vendor_product::{VendorProduct, VendorProductRepository};

const VENDORS: &[(&str, &str, &str, f64)] = &[
    ("MedSupply Traders", "Pune", "Maharashtra", 4.5),
    ("CarePlus Distributors", "Mumbai", "Maharashtra", 4.1),
    ("HealthFirst Wholesale", "Bengaluru", "Karnataka", 3.8),
];

const ROOT_CATEGORY: &str = "Medicines";

/// Subcategories of the root, one per seeded product
const CATEGORIES: &[&str] = &["Analgesics", "Antibiotics", "Gastrointestinal", "Antihistamines"];

/// (name, generic name, barcode, prescription required)
const PRODUCTS: &[(&str, &str, &str, bool)] = &[
    ("Crocin 500", "Paracetamol", "8901000000011", false),
    ("Augmentin 625", "Amoxicillin + Clavulanate", "8901000000028", true),
    ("Pan 40", "Pantoprazole", "8901000000035", true),
    ("Cetzine 10", "Cetirizine", "8901000000042", false),
];

const CUSTOMERS: &[(&str, &str, CustomerType)] = &[
    ("Asha Kulkarni", "9800000001", CustomerType::Retail),
    ("City Care Pharmacy", "9800000002", CustomerType::Wholesale),
    ("Sahyadri Hospital", "9800000003", CustomerType::Institution),
];

/// Counts of seeded rows
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub vendors: usize,
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
    pub vendor_products: usize,
}

/// Development data seeder
pub struct DevDataSeeder {
    vendor_repo: VendorRepository,
    category_repo: CategoryRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    vendor_product_repo: VendorProductRepository,
}

impl DevDataSeeder {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            vendor_repo: VendorRepository::new(pool.clone()),
            category_repo: CategoryRepository::new(pool.clone()),
            product_repo: ProductRepository::new(pool.clone()),
            customer_repo: CustomerRepository::new(pool.clone()),
            vendor_product_repo: VendorProductRepository::new(pool),
        }
    }

    /// Seed everything unless vendors already exist.
    pub async fn seed(&self) -> Result<SeedSummary> {
        if self.vendor_repo.count().await? > 0 {
            info!("Store already has data, skipping dev seed");
            return Ok(SeedSummary::default());
        }

        info!("Seeding development data...");
        let vendors = self.seed_vendors().await?;
        let categories = self.seed_categories().await?;
        let products = self.seed_products(&categories).await?;
        let customers = self.seed_customers().await?;
        let vendor_products = self.seed_listings(&vendors, &products).await?;

        let summary = SeedSummary {
            vendors: vendors.len(),
            categories: categories.len() + 1,
            products: products.len(),
            customers,
            vendor_products,
        };
        info!(?summary, "Development data seeded");
        Ok(summary)
    }

    async fn seed_vendors(&self) -> Result<Vec<Vendor>> {
        let mut seeded = Vec::with_capacity(VENDORS.len());
        for (i, (name, city, state, rating)) in VENDORS.iter().enumerate() {
            let mut vendor = Vendor::new(*name).with_location(*city, *state);
            vendor.rating = *rating;
            vendor.email = Some(format!("orders{}@vendor.example", i + 1));
            vendor.gst_number = Some(format!("27AAAPV{:04}A1Z{}", i + 1, i + 1));
            self.vendor_repo.insert(&mut vendor).await?;
            seeded.push(vendor);
        }
        Ok(seeded)
    }

    /// Root first, then its children. Returns the children.
    async fn seed_categories(&self) -> Result<Vec<Category>> {
        let mut root = Category::new(ROOT_CATEGORY);
        self.category_repo.insert(&mut root).await?;

        let mut children = Vec::with_capacity(CATEGORIES.len());
        for name in CATEGORIES {
            let mut category = Category::new(*name).with_parent(root.id);
            self.category_repo.insert(&mut category).await?;
            children.push(category);
        }
        Ok(children)
    }

    async fn seed_products(&self, categories: &[Category]) -> Result<Vec<Product>> {
        let mut seeded = Vec::with_capacity(PRODUCTS.len());
        for (i, (name, generic, barcode, rx)) in PRODUCTS.iter().enumerate() {
            let mut product = Product::new(*name).with_generic_name(*generic);
            product.category_id = categories.get(i).map(|c| c.id);
            product.barcode = Some(barcode.to_string());
            product.prescription_required = *rx;
            product.unit_of_measure = Some("strip".to_string());
            self.product_repo.insert(&mut product).await?;
            seeded.push(product);
        }
        Ok(seeded)
    }

    async fn seed_customers(&self) -> Result<usize> {
        for (name, phone, customer_type) in CUSTOMERS {
            let mut customer = Customer::new(*name);
            customer.phone = Some(phone.to_string());
            customer.customer_type = *customer_type;
            customer.city = Some("Pune".to_string());
            self.customer_repo.insert(&mut customer).await?;
        }
        Ok(CUSTOMERS.len())
    }

    /// Every vendor lists every product; prices and discounts vary by vendor.
    async fn seed_listings(&self, vendors: &[Vendor], products: &[Product]) -> Result<usize> {
        let mut count = 0;
        for (vi, vendor) in vendors.iter().enumerate() {
            for (pi, product) in products.iter().enumerate() {
                let cost = 20.0 + 15.0 * pi as f64 + 2.5 * vi as f64;
                let discount = (vi * 5) as f64;
                let mut listing = VendorProduct::new(vendor.id, product.id, cost)
                    .with_discount(discount)
                    .with_stock(50 + 25 * vi as i64);
                listing.vendor_sku = Some(format!("V{}-P{}", vendor.id, product.id));
                listing.mrp = Some((cost * 1.2 * 100.0).round() / 100.0);
                self.vendor_product_repo.insert(&mut listing).await?;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_seed_once() {
        let pool = connect_in_memory().await.unwrap();
        let seeder = DevDataSeeder::new(pool.clone());

        let first = seeder.seed().await.unwrap();
        assert_eq!(first.vendors, 3);
        assert_eq!(first.categories, 5);
        assert_eq!(first.products, 4);
        assert_eq!(first.customers, 3);
        assert_eq!(first.vendor_products, 12);

        let second = seeder.seed().await.unwrap();
        assert_eq!(second, SeedSummary::default());
    }

    #[tokio::test]
    async fn test_products_are_categorised() {
        let pool = connect_in_memory().await.unwrap();
        DevDataSeeder::new(pool.clone()).seed().await.unwrap();

        let pan = ProductRepository::new(pool.clone()).find_by_id(3).await.unwrap().unwrap();
        let category = CategoryRepository::new(pool)
            .find_by_id(pan.category_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(category.name, "Gastrointestinal");
        assert_eq!(category.parent_category_id, Some(1));
    }
}
