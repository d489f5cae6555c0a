//! Application router shared by the binary and the integration tests.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, handlers, middleware, state::AppState};

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_csv))
        .route("/upload/csv", post(handlers::upload::upload_csv))
        .route("/upload/history", get(handlers::upload::upload_history))
        .route("/sales", get(handlers::sales::list_sales))
        .route("/sales/summary", get(handlers::sales::sales_summary))
        .route("/sales/statistics", get(handlers::sales::sales_statistics))
        .route("/sales/export", get(handlers::sales::export_sales))
        .route("/sales/{id}", get(handlers::sales::get_sale))
        .route(
            "/analytics/top-products",
            get(handlers::analytics::top_products),
        )
        .route(
            "/analytics/top-regions",
            get(handlers::analytics::top_regions),
        )
        .route(
            "/analytics/top-categories",
            get(handlers::analytics::top_categories),
        )
        .route(
            "/analytics/sales-trend",
            get(handlers::analytics::sales_trend),
        )
}

/// Builds the full application with its middleware stack and state.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(middleware::log_error_responses)),
        )
        .with_state(state)
}

/// Invalid origins are skipped with a warning.
pub fn build_cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(24 * 60 * 60));

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
