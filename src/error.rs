use crate::directory::ValidationError;
use crate::ingestion::IngestionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use thiserror::Error;

/// HTTP 层统一错误，响应体固定为 `{ "error": message }`
#[derive(Debug, Error)]
pub enum ApiError {
    /// 存储错误，原文返回
    #[error("{0}")]
    Store(#[from] sea_orm::DbErr),
    /// 请求体无法解析；细节只写日志
    #[error("{message}")]
    Body { message: String, detail: String },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    pub fn body(message: &str, detail: impl ToString) -> Self {
        ApiError::Body {
            message: message.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(_) | ApiError::Body { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<IngestionError> for ApiError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::Store(db) => ApiError::Store(db),
            IngestionError::NotFound(_) => ApiError::NotFound(e.to_string()),
            IngestionError::AlreadyFinished { .. } => ApiError::Conflict(e.to_string()),
            IngestionError::UnknownSource(_)
            | IngestionError::InvalidLimit(_)
            | IngestionError::InvalidStatus(_) => ApiError::Validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store(e) => error!("✗ 存储错误: {}", e),
            ApiError::Body { detail, .. } => error!("✗ 请求体解析失败: {}", detail),
            _ => {}
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
