//! MVPS API Server
//!
//! Serves the marketplace REST APIs:
//! - `/vendors`, `/products`, `/customers`, `/orders`, `/vendor-products`
//!   with offset (`GET /`) and cursor (`GET /cursor`) listing
//! - `/health` probes
//! - Swagger UI at `/swagger-ui`, OpenAPI document at `/q/openapi`
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MVPS_CONFIG` | - | Path to TOML config file |
//! | `MVPS_HTTP_HOST` | `0.0.0.0` | Bind host |
//! | `MVPS_HTTP_PORT` | `8080` | HTTP API port |
//! | `MVPS_DATABASE_URL` | `sqlite://mvps.db?mode=rwc` | sqlx SQLite URL |
//! | `MVPS_DATABASE_MAX_CONNECTIONS` | `10` | Pool size |
//! | `MVPS_DEV_MODE` | `false` | Seed sample data into an empty store |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | `text` | `json` for structured output |

use anyhow::Result;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use mvps_api::seed::DevDataSeeder;
use mvps_api::{api_router, db, HealthState};
use mvps_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    mvps_common::logging::init_logging("mvps-api-server");

    info!("Starting MVPS API Server");

    let config = AppConfig::load()?;

    let pool = db::connect(&config.database).await?;
    db::init_schema(&pool).await?;

    if config.dev_mode {
        match DevDataSeeder::new(pool.clone()).seed().await {
            Ok(summary) => info!(?summary, "Dev seeding finished"),
            Err(e) => warn!(error = %e, "Dev data seeding failed"),
        }
    }

    let health_state = HealthState::new(pool.clone(), Some(env!("CARGO_PKG_VERSION").to_string()));

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = api_router(pool.clone(), health_state.clone()).split_for_parts();

    openapi.info.title = "MVPS Marketplace API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some(
        "Vendors, products, customers, orders and vendor listings with offset and cursor pagination"
            .to_string(),
    );

    let app = Router::new()
        .merge(router)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http());

    let addr = config.http.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    health_state.set_ready();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("MVPS API Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received...");
}
