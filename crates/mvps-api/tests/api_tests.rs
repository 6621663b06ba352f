//! Marketplace API Integration Tests
//!
//! Repositories against in-memory SQLite and the assembled router driven
//! request by request.

use axum::body::{to_bytes, Body};
use chrono::{DateTime, NaiveDate, Utc};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use mvps_api::db::connect_in_memory;
use mvps_api::seed::DevDataSeeder;
use mvps_api::shared::pagination::encode_cursor;
use mvps_api::{api_router, HealthState, Order, OrderRepository, Vendor, VendorRepository};

async fn vendors_in(pool: &SqlitePool, count: usize) {
    let repo = VendorRepository::new(pool.clone());
    for i in 1..=count {
        let city = if i % 2 == 1 { "Pune" } else { "Mumbai" };
        let mut vendor = Vendor::new(format!("Vendor {i}")).with_location(city, "Maharashtra");
        repo.insert(&mut vendor).await.unwrap();
    }
}

fn app_for(pool: &SqlitePool) -> Router {
    let health = HealthState::new(pool.clone(), None);
    let (router, _) = api_router(pool.clone(), health).split_for_parts();
    router
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn ids(page: &Value, key: &str) -> Vec<i64> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[key].as_i64().unwrap())
        .collect()
}

/// Follow `nextCursor` from the first page to the last, collecting `key`.
///
/// `query` is the filter part of the URI; every page must carry `hasNext`
/// consistent with the cursor it returns.
async fn walk_cursor(app: &Router, path: &str, query: &str, size: u32, key: &str) -> Vec<i64> {
    let mut walked = Vec::new();
    let mut uri = format!("{path}/cursor?{query}&size={size}");
    loop {
        let (status, page) = get(app, &uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let page_ids = ids(&page, key);
        assert!(page_ids.len() <= size as usize);
        walked.extend(page_ids);
        match page["nextCursor"].as_str() {
            Some(cursor) => {
                assert_eq!(page["hasNext"], true);
                uri = format!("{path}/cursor?{query}&size={size}&cursor={cursor}");
            }
            None => {
                assert_eq!(page["hasNext"], false);
                break;
            }
        }
    }
    walked
}

/// Every id of one offset listing with the same filter.
async fn offset_ids(app: &Router, path: &str, query: &str, key: &str) -> Vec<i64> {
    let (status, page) = get(app, &format!("{path}?{query}&limit=100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["totalItems"].as_u64().unwrap() as usize, page["data"].as_array().unwrap().len());
    ids(&page, key)
}

fn utc(date: &str, time: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&format!("{date}T{time}Z"))
        .unwrap()
        .with_timezone(&Utc)
}

mod cursor_tests {
    use super::*;

    #[tokio::test]
    async fn test_twenty_five_vendors_in_pages_of_ten() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 25).await;
        let app = app_for(&pool);

        let (status, first) = get(&app, "/vendors/cursor?size=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&first, "vendorId"), (1..=10).collect::<Vec<_>>());
        assert_eq!(first["pageSize"], 10);
        assert_eq!(first["hasNext"], true);
        assert_eq!(first["nextCursor"], "MTA=");

        let (_, second) = get(&app, "/vendors/cursor?size=10&cursor=MTA%3D").await;
        assert_eq!(ids(&second, "vendorId"), (11..=20).collect::<Vec<_>>());
        assert_eq!(second["hasNext"], true);

        let cursor = second["nextCursor"].as_str().unwrap().to_string();
        let (_, third) = get(&app, &format!("/vendors/cursor?size=10&cursor={cursor}")).await;
        assert_eq!(ids(&third, "vendorId"), (21..=25).collect::<Vec<_>>());
        assert_eq!(third["hasNext"], false);
        assert!(third.as_object().unwrap().contains_key("nextCursor"));
        assert!(third["nextCursor"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_cursor_restarts_from_first_page() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 5).await;
        let app = app_for(&pool);

        let (status, page) = get(&app, "/vendors/cursor?size=2&cursor=%21%21not-base64").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&page, "vendorId"), vec![1, 2]);
        assert_eq!(page["hasNext"], true);
    }

    #[tokio::test]
    async fn test_cursor_past_the_end_is_empty_and_terminal() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 3).await;
        let app = app_for(&pool);

        let cursor = encode_cursor(Some(3)).unwrap();
        let (status, page) = get(&app, &format!("/vendors/cursor?cursor={cursor}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["data"], json!([]));
        assert_eq!(page["hasNext"], false);
        assert!(page["nextCursor"].is_null());
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let pool = connect_in_memory().await.unwrap();
        let app = app_for(&pool);

        let (_, page) = get(&app, "/customers/cursor").await;
        assert_eq!(page["data"], json!([]));
        assert_eq!(page["pageSize"], 20);
        assert_eq!(page["hasNext"], false);
        assert!(page["nextCursor"].is_null());

        let (_, page) = get(&app, "/customers").await;
        assert_eq!(page["success"], true);
        assert_eq!(page["pagination"]["totalItems"], 0);
        assert_eq!(page["pagination"]["totalPages"], 0);
    }

    #[tokio::test]
    async fn test_size_is_clamped() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 3).await;
        let app = app_for(&pool);

        let (_, page) = get(&app, "/vendors/cursor?size=0").await;
        assert_eq!(page["pageSize"], 1);
        assert_eq!(ids(&page, "vendorId"), vec![1]);

        let (_, page) = get(&app, "/vendors/cursor?size=5000").await;
        assert_eq!(page["pageSize"], 100);

        let (_, page) = get(&app, "/vendors/cursor?size=abc").await;
        assert_eq!(page["pageSize"], 20);
    }

    #[tokio::test]
    async fn test_cursor_and_offset_agree_under_filter() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 25).await;
        let app = app_for(&pool);

        let mut walked = Vec::new();
        let mut uri = "/vendors/cursor?city=pune&size=4".to_string();
        loop {
            let (_, page) = get(&app, &uri).await;
            walked.extend(ids(&page, "vendorId"));
            match page["nextCursor"].as_str() {
                Some(cursor) => uri = format!("/vendors/cursor?city=pune&size=4&cursor={cursor}"),
                None => break,
            }
        }

        let (_, offset) = get(&app, "/vendors?city=PUNE&limit=100").await;
        assert_eq!(offset["pagination"]["totalItems"], 13);
        assert_eq!(ids(&offset, "vendorId"), walked);
        assert_eq!(walked, (1..=25).step_by(2).collect::<Vec<_>>());
    }
}

mod resource_cursor_tests {
    use super::*;

    async fn seeded() -> (SqlitePool, Router) {
        let pool = connect_in_memory().await.unwrap();
        DevDataSeeder::new(pool.clone()).seed().await.unwrap();
        let app = app_for(&pool);
        (pool, app)
    }

    #[tokio::test]
    async fn test_product_search_walk_matches_offset() {
        let (_, app) = seeded().await;

        let walked = walk_cursor(&app, "/products", "search=AN", 1, "productId").await;
        assert_eq!(walked, vec![2, 3]);
        assert_eq!(offset_ids(&app, "/products", "search=AN", "productId").await, walked);

        let by_category = walk_cursor(&app, "/products", "categoryId=4", 1, "productId").await;
        assert_eq!(by_category, vec![3]);
    }

    #[tokio::test]
    async fn test_customer_walk_matches_offset() {
        let (_, app) = seeded().await;

        let all = walk_cursor(&app, "/customers", "isActive=true", 1, "customerId").await;
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(offset_ids(&app, "/customers", "isActive=true", "customerId").await, all);

        let wholesale = walk_cursor(&app, "/customers", "customerType=wholesale", 2, "customerId").await;
        assert_eq!(wholesale, vec![2]);
    }

    #[tokio::test]
    async fn test_vendor_product_price_walk_matches_offset() {
        let (_, app) = seeded().await;
        let query = "minPrice=20&maxPrice=50";

        let walked = walk_cursor(&app, "/vendor-products", query, 2, "vendorProductId").await;
        assert_eq!(walked, vec![1, 2, 3, 5, 6, 7, 9, 10, 11]);
        assert_eq!(offset_ids(&app, "/vendor-products", query, "vendorProductId").await, walked);

        let vendor_two = walk_cursor(&app, "/vendor-products", "vendorId=2&maxPrice=50", 2, "vendorProductId").await;
        assert_eq!(vendor_two, vec![5, 6, 7]);
    }

    #[tokio::test]
    async fn test_order_date_walk_matches_offset() {
        let (pool, app) = seeded().await;
        let repo = OrderRepository::new(pool.clone());

        let mut placed = Vec::new();
        let mut place = |at: DateTime<Utc>, customer_id: i64| {
            let mut order = Order::new(customer_id);
            order.order_date = at;
            placed.push(order);
        };
        for i in 0..24_u32 {
            let day = NaiveDate::from_ymd_opt(2024, 3, 1 + i % 6).unwrap();
            let time = format!("{:02}:{:02}:00", (i * 7) % 24, (i * 13) % 60);
            place(utc(&day.to_string(), &time), i64::from(1 + i % 3));
        }
        place(utc("2024-03-01", "23:59:59"), 1);
        place(utc("2024-03-02", "00:00:00"), 2);
        place(utc("2024-03-03", "23:59:59"), 3);
        place(utc("2024-03-04", "00:00:00"), 1);

        let from = utc("2024-03-02", "00:00:00");
        let to = utc("2024-03-03", "23:59:59");
        let mut expected = Vec::new();
        for order in &mut placed {
            repo.insert_with_items(order, &mut []).await.unwrap();
            if order.order_date >= from && order.order_date <= to {
                expected.push(order.id);
            }
        }
        assert!(expected.len() > 4);

        let query = "fromDate=2024-03-02&toDate=2024-03-03";
        let walked = walk_cursor(&app, "/orders", query, 3, "orderId").await;
        assert_eq!(walked, expected);
        assert_eq!(offset_ids(&app, "/orders", query, "orderId").await, walked);

        let with_customer = format!("{query}&customerId=3");
        let walked = walk_cursor(&app, "/orders", &with_customer, 2, "orderId").await;
        let expected_for_customer: Vec<i64> = placed
            .iter()
            .filter(|o| o.customer_id == 3 && expected.contains(&o.id))
            .map(|o| o.id)
            .collect();
        assert_eq!(walked, expected_for_customer);
        assert_eq!(offset_ids(&app, "/orders", &with_customer, "orderId").await, walked);
    }
}

mod offset_tests {
    use super::*;

    #[tokio::test]
    async fn test_page_numbers_and_totals() {
        let pool = connect_in_memory().await.unwrap();
        vendors_in(&pool, 25).await;
        let app = app_for(&pool);

        let (_, page) = get(&app, "/vendors?page=3&limit=10").await;
        assert_eq!(ids(&page, "vendorId"), (21..=25).collect::<Vec<_>>());
        assert_eq!(
            page["pagination"],
            json!({ "page": 3, "limit": 10, "totalItems": 25, "totalPages": 3 })
        );

        let (_, page) = get(&app, "/vendors?page=0&limit=5").await;
        assert_eq!(page["pagination"]["page"], 1);
        assert_eq!(ids(&page, "vendorId"), vec![1, 2, 3, 4, 5]);

        let (_, page) = get(&app, "/vendors?page=9&limit=10").await;
        assert_eq!(page["data"], json!([]));
        assert_eq!(page["pagination"]["totalItems"], 25);
    }
}

mod resource_tests {
    use super::*;

    async fn seeded_app() -> Router {
        let pool = connect_in_memory().await.unwrap();
        DevDataSeeder::new(pool.clone()).seed().await.unwrap();
        app_for(&pool)
    }

    #[tokio::test]
    async fn test_create_and_fetch_vendor() {
        let app = seeded_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/vendors",
            Some(json!({ "vendorName": "Nova Pharma", "city": "Nagpur", "rating": 4.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], true);
        assert_eq!(created["message"], "Vendor created successfully");
        assert_eq!(created["data"]["isActive"], true);

        let id = created["data"]["vendorId"].as_i64().unwrap();
        let (status, fetched) = get(&app, &format!("/vendors/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["vendorName"], "Nova Pharma");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let app = seeded_app().await;

        let (status, body) = get(&app, "/vendors/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_blank_vendor_name_is_rejected() {
        let app = seeded_app().await;

        let (status, body) =
            send(&app, Method::POST, "/vendors", Some(json!({ "vendorName": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_filter() {
        let app = seeded_app().await;

        let (status, _) = send(&app, Method::DELETE, "/vendors/2", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, page) = get(&app, "/vendors/cursor?isActive=true").await;
        assert_eq!(ids(&page, "vendorId"), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_product_search_and_barcode() {
        let app = seeded_app().await;

        let (_, page) = get(&app, "/products/cursor?search=PARA").await;
        assert_eq!(ids(&page, "productId"), vec![1]);

        let (status, body) = get(&app, "/products/barcode/8901000000011").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["productName"], "Crocin 500");
    }

    #[tokio::test]
    async fn test_customer_lookup_by_phone_and_type() {
        let app = seeded_app().await;

        let (status, body) = get(&app, "/customers/phone/9800000002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["customerType"], "wholesale");

        let (_, page) = get(&app, "/customers?customerType=institution").await;
        assert_eq!(page["pagination"]["totalItems"], 1);
    }

    #[tokio::test]
    async fn test_vendor_product_price_range() {
        let app = seeded_app().await;

        let (_, cursor_page) = get(&app, "/vendor-products/cursor?minPrice=30&maxPrice=40").await;
        let (_, offset_page) = get(&app, "/vendor-products?minPrice=30&maxPrice=40").await;

        assert_eq!(ids(&cursor_page, "vendorProductId"), vec![2, 6, 10]);
        assert_eq!(ids(&offset_page, "vendorProductId"), vec![2, 6, 10]);
        for row in cursor_page["data"].as_array().unwrap() {
            let price = row["finalPrice"].as_f64().unwrap();
            assert!((30.0..=40.0).contains(&price));
        }
    }

    #[tokio::test]
    async fn test_bulk_stock_update_and_history() {
        let app = seeded_app().await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/vendor-products/stock",
            Some(json!({
                "updates": [
                    { "vendorProductId": 1, "stockQuantity": 60 },
                    { "vendorProductId": 2, "stockQuantity": 50 },
                    { "vendorProductId": 3, "stockQuantity": -5 },
                    { "vendorProductId": 999, "stockQuantity": 10 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updatedCount"], 1);
        assert_eq!(body["message"], "Stock updated successfully");

        let (status, history) = get(&app, "/vendor-products/1/stock-history").await;
        assert_eq!(status, StatusCode::OK);
        let entries = history["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["previousQuantity"], 50);
        assert_eq!(entries[0]["newQuantity"], 60);
        assert_eq!(entries[0]["changeAmount"], 10);
        assert_eq!(entries[0]["productName"], "Crocin 500");
        assert_eq!(entries[0]["vendorName"], "MedSupply Traders");

        let (status, _) = get(&app, "/vendor-products/999/stock-history").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) =
            send(&app, Method::PATCH, "/vendor-products/stock", Some(json!({ "updates": [] }))).await;
        assert_eq!(body["message"], "No updates provided");
        assert_eq!(body["updatedCount"], 0);
    }

    #[tokio::test]
    async fn test_order_prices_lines_and_picks_cheapest_listing() {
        let app = seeded_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/orders",
            Some(json!({
                "customerId": 1,
                "orderType": "online",
                "items": [
                    { "productId": 1, "quantity": 2 },
                    { "productId": 2, "vendorProductId": 10, "quantity": 1 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let order = &created["data"];
        assert_eq!(order["orderStatus"], "pending");
        assert_eq!(order["paymentStatus"], "pending");
        assert!(order["orderNumber"].as_str().unwrap().starts_with("ORD-"));
        assert_eq!(order["totalAmount"], 76.0);
        assert_eq!(order["discountAmount"], 4.0);
        assert_eq!(order["finalAmount"], 72.0);

        let items = order["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["vendorProductId"], 1);
        assert_eq!(items[0]["unitPrice"], 20.0);
        assert_eq!(items[0]["lineTotal"], 40.0);
        assert_eq!(items[1]["vendorProductId"], 10);
        assert_eq!(items[1]["unitPrice"], 36.0);
        assert_eq!(items[1]["productName"], "Augmentin 625");

        let id = order["orderId"].as_i64().unwrap();
        let (_, history) = get(&app, "/customers/1/orders?orderStatus=pending").await;
        assert_eq!(ids(&history, "orderId"), vec![id]);
    }

    #[tokio::test]
    async fn test_order_validation() {
        let app = seeded_app().await;

        let (status, body) =
            send(&app, Method::POST, "/orders", Some(json!({ "customerId": 1, "items": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            Method::POST,
            "/orders",
            Some(json!({ "customerId": 999, "items": [{ "productId": 1, "quantity": 1 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/orders",
            Some(json!({ "customerId": 1, "items": [{ "productId": 1, "quantity": 0 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_order_status_changes_and_cancel() {
        let app = seeded_app().await;
        send(
            &app,
            Method::POST,
            "/orders",
            Some(json!({ "customerId": 2, "items": [{ "productId": 3, "quantity": 1 }] })),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/orders/1/status",
            Some(json!({ "orderStatus": "teleported" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/orders/1/payment-status",
            Some(json!({ "paymentStatus": "paid" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["paymentStatus"], "paid");

        let (status, _) = send(&app, Method::DELETE, "/orders/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, page) = get(&app, "/orders/cursor?orderStatus=cancelled").await;
        assert_eq!(ids(&page, "orderId"), vec![1]);
        let (_, page) = get(&app, "/orders?orderStatus=pending").await;
        assert_eq!(page["pagination"]["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let app = seeded_app().await;

        let (status, _) = get(&app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "database");
        let (status, _) = get(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_category_tree_crud() {
        let app = seeded_app().await;

        let (_, children) = get(&app, "/categories?parentCategoryId=1").await;
        assert_eq!(children["pagination"]["totalItems"], 4);
        let walked = walk_cursor(&app, "/categories", "parentCategoryId=1", 3, "categoryId").await;
        assert_eq!(walked, vec![2, 3, 4, 5]);

        let (status, _) = send(
            &app,
            Method::POST,
            "/categories",
            Some(json!({ "categoryName": "Vitamins", "parentCategoryId": 99 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, created) = send(
            &app,
            Method::POST,
            "/categories",
            Some(json!({ "categoryName": "Vitamins", "parentCategoryId": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["message"], "Category created successfully");
        let id = created["data"]["categoryId"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/categories/1",
            Some(json!({ "parentCategoryId": id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/categories/{id}"),
            Some(json!({ "description": "Supplements", "parentCategoryId": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["description"], "Supplements");
        assert!(updated["data"]["parentCategoryId"].is_null());

        // still referenced by Crocin 500
        let (status, body) = send(&app, Method::DELETE, "/categories/2", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONSTRAINT_VIOLATION");

        let (status, body) = send(&app, Method::DELETE, &format!("/categories/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Category deleted successfully");
        let (status, _) = get(&app, &format!("/categories/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_category_must_exist() {
        let app = seeded_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(json!({ "productName": "Dolo 650", "categoryId": 404 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) =
            send(&app, Method::PUT, "/products/1", Some(json!({ "categoryId": 404 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, Method::PUT, "/products/1", Some(json!({ "categoryId": 5 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["categoryId"], 5);
    }

    async fn place_sample_order(app: &Router) -> i64 {
        let (status, created) = send(
            app,
            Method::POST,
            "/orders",
            Some(json!({
                "customerId": 1,
                "notes": "Leave at the gate",
                "items": [
                    { "productId": 1, "quantity": 2 },
                    { "productId": 2, "vendorProductId": 10, "quantity": 1 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created["data"]["orderId"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_order_item_changes_follow_into_order_totals() {
        let app = seeded_app().await;
        let order_id = place_sample_order(&app).await;

        let (_, lines) = get(&app, &format!("/order-items?orderId={order_id}")).await;
        assert_eq!(ids(&lines, "orderItemId"), vec![1, 2]);
        let walked = walk_cursor(&app, "/order-items", "vendorId=3", 1, "orderItemId").await;
        assert_eq!(walked, vec![2]);

        let (status, line) = get(&app, "/order-items/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line["data"]["vendorName"], "HealthFirst Wholesale");

        let (status, updated) =
            send(&app, Method::PUT, "/order-items/1", Some(json!({ "quantity": 3 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["message"], "Order item updated successfully");
        assert_eq!(updated["data"]["lineTotal"], 60.0);

        let (_, order) = get(&app, &format!("/orders/{order_id}")).await;
        assert_eq!(order["data"]["totalAmount"], 96.0);
        assert_eq!(order["data"]["discountAmount"], 4.0);
        assert_eq!(order["data"]["finalAmount"], 92.0);

        let (status, _) =
            send(&app, Method::PUT, "/order-items/1", Some(json!({ "quantity": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::DELETE, "/order-items/2", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&app, "/order-items/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, order) = get(&app, &format!("/orders/{order_id}")).await;
        assert_eq!(order["data"]["totalAmount"], 60.0);
        assert_eq!(order["data"]["finalAmount"], 56.0);
        assert_eq!(order["data"]["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_search() {
        let app = seeded_app().await;
        place_sample_order(&app).await;
        send(
            &app,
            Method::POST,
            "/orders",
            Some(json!({ "customerId": 2, "notes": "Call before delivery", "items": [{ "productId": 3, "quantity": 1 }] })),
        )
        .await;

        let (status, page) = get(&app, "/orders/search?search=GATE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&page, "orderId"), vec![1]);
        assert_eq!(page["pagination"]["totalItems"], 1);

        let (_, page) = get(&app, "/orders/search?search=ORD-&limit=1&page=2").await;
        assert_eq!(ids(&page, "orderId"), vec![2]);
        assert_eq!(page["pagination"]["totalItems"], 2);

        let (_, page) = get(&app, "/orders/search?search=ORD-&paymentStatus=paid").await;
        assert_eq!(page["data"], json!([]));
    }

    #[tokio::test]
    async fn test_vendor_order_lifecycle() {
        let app = seeded_app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/vendor-orders",
            Some(json!({ "vendorId": 999, "totalAmount": 10.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/vendor-orders",
            Some(json!({ "vendorId": 1, "totalAmount": -1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = send(
            &app,
            Method::POST,
            "/vendor-orders",
            Some(json!({ "vendorId": 1, "totalAmount": 1500.0, "expectedDeliveryDate": "2024-09-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["message"], "Vendor order created successfully");
        assert_eq!(created["data"]["status"], "pending");
        assert_eq!(created["data"]["expectedDeliveryDate"], "2024-09-01");
        assert!(created["data"]["poNumber"].as_str().unwrap().starts_with("PO-"));

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/vendor-orders/1",
            Some(json!({ "status": "received" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["status"], "received");
        assert!(updated["data"]["actualDeliveryDate"].is_string());

        let (_, page) = get(&app, "/vendor-orders?status=received").await;
        assert_eq!(ids(&page, "vendorOrderId"), vec![1]);
        let walked = walk_cursor(&app, "/vendor-orders", "vendorId=1", 5, "vendorOrderId").await;
        assert_eq!(walked, vec![1]);
        let (_, page) = get(&app, "/vendor-orders/cursor?vendorId=2").await;
        assert_eq!(page["data"], json!([]));

        let (status, body) = send(&app, Method::DELETE, "/vendor-orders/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Vendor order cancelled successfully");
        let (_, fetched) = get(&app, "/vendor-orders/1").await;
        assert_eq!(fetched["data"]["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_lowest_prices_and_comparison() {
        let app = seeded_app().await;

        let (status, body) = get(&app, "/vendor-products/lowest-prices").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["productName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Augmentin 625", "Cetzine 10", "Crocin 500", "Pan 40"]);
        assert_eq!(ids(&body, "vendorProductId"), vec![2, 12, 1, 11]);
        assert_eq!(body["data"][2]["priceStatus"], "LOWEST PRICE");

        let (_, body) = get(&app, "/vendor-products/lowest-prices?minStock=60&categoryId=2").await;
        assert_eq!(ids(&body, "vendorProductId"), vec![5]);
        assert_eq!(body["data"][0]["vendorName"], "CarePlus Distributors");

        let (_, body) = get(&app, "/vendor-products/lowest-prices?maxPrice=30").await;
        assert_eq!(ids(&body, "productId"), vec![1]);

        let (_, body) = get(&app, "/vendor-products/price-comparison?productId=1").await;
        assert_eq!(ids(&body, "vendorProductId"), vec![1, 5, 9]);
        let statuses: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["priceStatus"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, ["LOWEST PRICE", "HIGHER PRICE", "HIGHER PRICE"]);
    }

    #[tokio::test]
    async fn test_vendor_listings_and_product_offers() {
        let app = seeded_app().await;

        let (status, body) = get(&app, "/vendors/1/products").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "vendorProductId"), vec![1, 2, 3, 4]);

        send(&app, Method::DELETE, "/vendor-products/2", None).await;
        let (_, body) = get(&app, "/vendors/1/products?isAvailable=false").await;
        assert_eq!(ids(&body, "vendorProductId"), vec![2]);

        let (status, _) = get(&app, "/vendors/999/products").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(&app, "/products/1/vendors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "vendorId"), vec![1, 2, 3]);
        // the withdrawn listing is no longer offered
        let (_, body) = get(&app, "/products/2/vendors").await;
        assert_eq!(ids(&body, "vendorProductId"), vec![6, 10]);
        assert_eq!(body["data"][0]["priceStatus"], "LOWEST PRICE");

        let (status, _) = get(&app, "/products/999/vendors").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_marketplace_search() {
        let app = seeded_app().await;

        let (status, body) = get(&app, "/search/products?q=pan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "productId"), vec![3]);
        assert_eq!(body["data"][0]["vendorProductId"], 11);

        let (_, body) = get(&app, "/search/products?minPrice=40").await;
        assert_eq!(ids(&body, "productId"), vec![4, 3]);

        let (_, body) = get(&app, "/search/products?q=healthfirst&prescriptionRequired=true").await;
        assert_eq!(ids(&body, "productId"), vec![3]);

        let (_, body) = get(&app, "/search/vendors?q=pune").await;
        assert_eq!(ids(&body, "vendorId"), vec![1]);
        let (_, body) = get(&app, "/search/vendors?state=KARNATAKA").await;
        assert_eq!(ids(&body, "vendorId"), vec![3]);
        let (_, body) = get(&app, "/search/vendors?isActive=false").await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_openapi_lists_every_resource() {
        let pool = connect_in_memory().await.unwrap();
        let health = HealthState::new(pool.clone(), None);
        let (_, openapi) = api_router(pool, health).split_for_parts();

        for path in [
            "/vendors/{id}/products",
            "/categories/cursor",
            "/products/{id}/vendors",
            "/orders/search",
            "/order-items/{id}",
            "/vendor-products/lowest-prices",
            "/vendor-products/price-comparison",
            "/vendor-orders/cursor",
            "/search/products",
            "/search/vendors",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
        let schemas = openapi.components.expect("components").schemas;
        for schema in ["UpdateVendorRequest", "UpdateVendorOrderRequest", "StockUpdate"] {
            assert!(schemas.contains_key(schema), "missing schema {schema}");
        }
    }
}
