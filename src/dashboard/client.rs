use crate::directory::{DirectoryStats, InvestorPage};
use crate::ingestion::{ScrapeAccepted, ScrapeOverview};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// 目录服务的只读/提交接口，刷新逻辑只依赖这个 trait
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn fetch_investors(&self, limit: u64) -> Result<InvestorPage, ClientError>;
    async fn fetch_stats(&self) -> Result<DirectoryStats, ClientError>;
    async fn fetch_sources(&self) -> Result<ScrapeOverview, ClientError>;
    async fn submit_scrape(&self, source: &str, limit: i64)
        -> Result<ScrapeAccepted, ClientError>;
}

#[derive(Clone)]
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        if !status.is_success() {
            // 服务端错误体是 { "error": "..." }
            let message = serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(raw);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&raw)
            .map_err(|e| ClientError::InvalidResponse(format!("json parse failed: {e}")))
    }
}

#[async_trait]
impl DirectoryApi for HttpDirectoryClient {
    async fn fetch_investors(&self, limit: u64) -> Result<InvestorPage, ClientError> {
        let resp = self
            .client
            .get(self.url("/investors"))
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn fetch_stats(&self) -> Result<DirectoryStats, ClientError> {
        let resp = self
            .client
            .get(self.url("/stats"))
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn fetch_sources(&self) -> Result<ScrapeOverview, ClientError> {
        let resp = self
            .client
            .get(self.url("/scrape"))
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn submit_scrape(
        &self,
        source: &str,
        limit: i64,
    ) -> Result<ScrapeAccepted, ClientError> {
        let body = serde_json::json!({ "type": source, "limit": limit });
        let resp = self
            .client
            .post(self.url("/scrape"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::read_json(resp).await
    }
}
