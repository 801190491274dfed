mod investors;
mod scrape;
mod stats;

use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/investors",
            get(investors::list_investors).post(investors::create_investor),
        )
        .route("/investors/bulk", post(investors::bulk_upsert))
        .route("/stats", get(stats::get_stats))
        .route("/scrape", get(scrape::overview).post(scrape::submit))
        .route("/scrape/jobs/:id", get(scrape::job_status))
        .route("/scrape/jobs/:id/complete", post(scrape::complete))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
