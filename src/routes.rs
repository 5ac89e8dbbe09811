use utoipa::OpenApi;
use crate::docs::ApiDoc;
use axum::{Json, Router};
use axum::routing::get;
use crate::state::AppState;

pub fn configure_routes() -> Router<AppState> {
    Router::new()
        .merge(crate::modules::convert::router())
        .merge(api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
