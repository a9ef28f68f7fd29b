pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Minimal Image Server API",
        version = "1.0.0",
        description = "Upload, replace, hide, delete, search and serve images"
    ),
    tags(
        (name = "Images", description = "Image lifecycle and retrieval"),
        (name = "Auth", description = "Accounts and auth tokens"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes::api_routes(&state.config.storage))
        .split_for_parts();

    let cors = routes::cors_layer(&state.config.server.cors);

    router
        .with_state(state)
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}
