use super::AppState;
use crate::directory::validation::{validate_batch, validate_new_investor};
use crate::directory::{InvestorPage, ListParams, ListQuery, NewInvestor};
use crate::error::ApiError;
use crate::storage::repository::InvestorRepository;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

/// 批量写入接受 `{ "investors": [...] }` 或裸数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BulkPayload {
    Wrapped { investors: Vec<NewInvestor> },
    Bare(Vec<NewInvestor>),
}

impl BulkPayload {
    fn into_records(self) -> Vec<NewInvestor> {
        match self {
            BulkPayload::Wrapped { investors } => investors,
            BulkPayload::Bare(investors) => investors,
        }
    }
}

pub async fn list_investors(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<InvestorPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let params = ListParams::from(query);
    let page = InvestorRepository::list(&state.db, &params).await?;
    info!(
        "GET /investors -> {} of {} (offset {}, limit {})",
        page.investors.len(),
        page.total,
        page.offset,
        page.limit
    );
    Ok(Json(page))
}

pub async fn create_investor(
    State(state): State<AppState>,
    body: Result<Json<NewInvestor>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(new) = body.map_err(|e| ApiError::body("Failed to create investor", e.body_text()))?;
    if let Err(e) = validate_new_investor(&new) {
        warn!("⚠ POST /investors 校验失败: {}", e);
        return Err(e.into());
    }

    let investor = InvestorRepository::create(&state.db, new).await?;
    info!("✓ 新建投资人 id={} name={}", investor.id, investor.name);
    Ok((StatusCode::CREATED, Json(json!({ "investor": investor }))))
}

pub async fn bulk_upsert(
    State(state): State<AppState>,
    body: Result<Json<BulkPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) =
        body.map_err(|e| ApiError::body("Failed to import investors", e.body_text()))?;
    let records = payload.into_records();
    if let Err(e) = validate_batch(&records) {
        warn!("⚠ POST /investors/bulk 校验失败: {}", e);
        return Err(e.into());
    }

    let upserted = InvestorRepository::bulk_upsert(&state.db, records).await?;
    info!("✓ 批量写入 {} 条", upserted);
    Ok(Json(json!({ "upserted": upserted })))
}
