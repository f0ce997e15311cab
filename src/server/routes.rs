//! Router configuration for the API server.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::limit;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Only the two analyze endpoints count against the limiter
    let analyze = Router::new()
        .route("/api/contracts/analyze", post(handlers::analyze_upload))
        .route("/api/contracts/analyze-text", post(handlers::analyze_text))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit::enforce));

    let mut contracts = Router::new()
        .route("/api/contracts/:id", get(handlers::get_analysis))
        .route(
            "/api/contracts/:id/generate-email",
            post(handlers::generate_email),
        );
    if state.store.is_durable() {
        contracts = contracts
            .route("/api/contracts", get(handlers::list_analyses))
            .route("/api/contracts/", get(handlers::list_analyses));
    }

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(analyze)
        .merge(contracts)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors_layer(&state.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured frontend origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
