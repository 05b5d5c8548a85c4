//! API layer - HTTP entry points.

pub mod http;
pub mod middleware;

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::App;
use crate::infrastructure::config::AppConfig;

pub use middleware::IpWhitelist;

/// Build the full router: routes, middleware and shared state.
pub fn router(app: Arc<App>, config: &AppConfig) -> Router {
    let whitelist = Arc::new(IpWhitelist::new(config.ip_whitelist.clone()));
    if whitelist.is_enabled() {
        tracing::info!(
            allowed = config.ip_whitelist.len(),
            "IP whitelist enabled"
        );
    }

    let router = http::routes()
        .with_state(app)
        .layer(axum::middleware::from_fn(middleware::csrf_middleware))
        .layer(axum::middleware::from_fn_with_state(
            whitelist,
            middleware::ip_whitelist_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::no_cache_middleware));

    let router = match build_cors_layer(&config.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.log_requests {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // The editor sends JSON bodies and X-Requested-With, which trigger preflights.
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::REQUESTED_WITH_HEADER),
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(cors.allow_origin(origins))
}
