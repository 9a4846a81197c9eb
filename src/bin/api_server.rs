// src/bin/api_server.rs

use review_service::infra::logging::init_logging;
use review_service::infra::{AppConfig, StorageBackend};
use review_service::transport;
use review_service::{InMemoryReviewStore, PostgresReviewStore, ReviewService, ReviewStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log)?;
    info!(service = %config.log.service_name, "starting review service");

    // --- Storage Initialization ---
    let store: Arc<dyn ReviewStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let store = PostgresReviewStore::connect(&config.database).await?;
            match store.table_exists().await {
                Ok(true) => {}
                Ok(false) => warn!("table `review` is missing; apply sql/review.sql"),
                Err(e) => error!(error = %e, "could not inspect database schema"),
            }
            info!(
                host = %config.database.host,
                database = %config.database.name,
                max_connections = config.database.max_connections,
                "connected to postgres"
            );
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; reviews are lost on restart");
            Arc::new(InMemoryReviewStore::new())
        }
    };

    // --- Service Initialization ---
    let app_state = transport::http::AppState {
        review_service: ReviewService::new(store),
        request_timeout: config.request_timeout,
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "review API listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received, draining connections");
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
