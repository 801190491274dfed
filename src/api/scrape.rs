use super::AppState;
use crate::error::ApiError;
use crate::ingestion::{
    CompletionCallback, IngestionService, JobView, ScrapeAccepted, ScrapeOverview, ScrapeRequest,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn overview(State(state): State<AppState>) -> Result<Json<ScrapeOverview>, ApiError> {
    Ok(Json(IngestionService::overview(&state.db).await?))
}

pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScrapeAccepted>), ApiError> {
    let Json(req) =
        body.map_err(|e| ApiError::body("Failed to start scraping job", e.body_text()))?;
    let accepted = IngestionService::submit(&state.db, req).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

pub async fn job_status(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<JobView>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    Ok(Json(IngestionService::job(&state.db, id).await?))
}

pub async fn complete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<CompletionCallback>, JsonRejection>,
) -> Result<Json<JobView>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let Json(callback) =
        body.map_err(|e| ApiError::body("Failed to update scraping job", e.body_text()))?;
    Ok(Json(IngestionService::complete(&state.db, id, callback).await?))
}
