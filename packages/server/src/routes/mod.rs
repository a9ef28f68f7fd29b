use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::{CorsConfig, StorageConfig};
use crate::handlers::auth::*;
use crate::handlers::image::*;
use crate::handlers::view::*;
use crate::state::AppState;

pub fn api_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(image_routes(storage))
        .merge(auth_routes())
        .routes(routes!(view_image))
}

fn image_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(insert_image))
        .layer(insert_body_limit(storage.max_image_size));

    OpenApiRouter::new()
        .merge(upload)
        .routes(routes!(hide_image))
        .routes(routes!(delete_image))
        .routes(routes!(search_images))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
}

/// CORS for browser clients. An empty origin list disables cross-origin
/// access, `*` allows any origin.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
