use super::AppState;
use crate::directory::DirectoryStats;
use crate::error::ApiError;
use crate::storage::repository::StatsRepository;
use axum::extract::State;
use axum::Json;
use log::info;

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DirectoryStats>, ApiError> {
    let stats = StatsRepository::stats(&state.db).await?;
    info!("GET /stats -> total {}", stats.total_investors);
    Ok(Json(stats))
}
