// src/server/mod.rs
//! HTTP surface: routes, CORS and the static directory.

mod error;
mod handlers;

pub use error::ApiError;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::service::GalleryService;
use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Builds the application router.
///
/// `/static` is mounted only when `static_dir` exists.
pub fn create_router(service: Arc<GalleryService>, static_dir: &Path) -> Router {
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/images", get(handlers::list_images))
        .route("/files", get(handlers::list_files))
        .route("/pages", get(handlers::list_pages))
        .route("/image/:id", get(handlers::image_redirect))
        .route("/file/:id", get(handlers::file_redirect))
        .route("/page/:id", get(handlers::page))
        .route("/:suffix", get(handlers::resolve_suffix))
        .with_state(service);

    let router = if static_dir.is_dir() {
        router.nest_service("/static", ServeDir::new(static_dir))
    } else {
        log::warn!(
            "Static directory {} not found; /static is not served",
            static_dir.display()
        );
        router
    };

    router.layer(CorsLayer::permissive())
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &ServiceConfig) -> Result<(), AppError> {
    let service = Arc::new(GalleryService::from_config(config)?);
    let router = create_router(service, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| AppError::InternalError {
            message: format!("Failed to bind {}", config.bind_address),
            source: Some(Box::new(e)),
        })?;
    log::info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::InternalError {
            message: "Server stopped unexpectedly".to_string(),
            source: Some(Box::new(e)),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
