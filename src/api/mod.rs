use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

pub mod graphiql;
pub mod graphql;

pub fn build_router() -> Router {
    Router::new()
        .merge(graphql::router())
        .route("/graphiql", get(graphiql::page))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not_found"})),
    )
}
