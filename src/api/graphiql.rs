//! Interactive schema explorer, served for manual testing against `/graphql`.

use async_graphql::http::GraphiQLSource;
use axum::response::{Html, IntoResponse};

pub async fn page() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
