use axum::{routing::get, Router};

use crate::cloud;

async fn root() -> &'static str {
    "Cloud Billing API"
}

pub fn api_routes() -> Router {
    Router::new().route("/", get(root)).merge(cloud::api::routes())
}
