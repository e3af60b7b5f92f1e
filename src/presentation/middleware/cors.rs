//! CORS Middleware Configuration

use axum::http::HeaderName;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Create CORS layer from settings.
///
/// The `Pagination` header must be exposed or browser clients cannot read the
/// paging metadata on list responses.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let pagination = HeaderName::from_static("pagination");

    let origins: Vec<_> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([pagination])
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([pagination])
            .max_age(std::time::Duration::from_secs(3600))
    }
}
