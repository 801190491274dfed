use crate::storage::entity::scrape_job;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SOURCE: &str = "sec_adv";
pub const DEFAULT_SCRAPE_LIMIT: i64 = 100;
pub const ESTIMATED_TIME: &str = "5-10 minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeSource {
    SecAdv,
    Sec13f,
    Crunchbase,
}

impl ScrapeSource {
    pub const ALL: [ScrapeSource; 3] = [
        ScrapeSource::SecAdv,
        ScrapeSource::Sec13f,
        ScrapeSource::Crunchbase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeSource::SecAdv => "sec_adv",
            ScrapeSource::Sec13f => "sec_13f",
            ScrapeSource::Crunchbase => "crunchbase",
        }
    }

    pub fn info(&self) -> SourceInfo {
        let (name, description, estimated_records) = match self {
            ScrapeSource::SecAdv => (
                "SEC Form ADV",
                "Investment advisers with $150M+ AUM",
                "15,000+",
            ),
            ScrapeSource::Sec13f => (
                "SEC 13F Filings",
                "Institutional investors with $100M+ holdings",
                "10,000+",
            ),
            ScrapeSource::Crunchbase => (
                "Crunchbase (requires API key)",
                "VC portfolio data and funding rounds",
                "50,000+",
            ),
        };
        SourceInfo {
            id: self.as_str().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            estimated_records: estimated_records.to_string(),
        }
    }
}

impl FromStr for ScrapeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            // 旧客户端只发 "sec"
            "sec" | "sec_adv" => Ok(ScrapeSource::SecAdv),
            "sec_13f" => Ok(ScrapeSource::Sec13f),
            "crunchbase" => Ok(ScrapeSource::Crunchbase),
            other => Err(format!("unknown scrape source: {}", other)),
        }
    }
}

impl fmt::Display for ScrapeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub estimated_records: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "QUEUED" => Some(JobStatus::Queued),
            "RUNNING" => Some(JobStatus::Running),
            "DONE" => Some(JobStatus::Done),
            "FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// POST /scrape 请求体，字段都可省略
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(rename = "type", default)]
    pub source: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeAccepted {
    pub success: bool,
    pub message: String,
    pub job_id: i32,
    pub status: JobStatus,
    pub estimated_time: String,
}

/// 外部抓取管道回调
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionCallback {
    pub status: String,
    #[serde(default)]
    pub records_ingested: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub id: i32,
    pub source: String,
    pub status: JobStatus,
    pub requested_limit: i64,
    pub records_ingested: i64,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub finished_at: Option<String>,
}

impl JobView {
    pub fn from_model(model: scrape_job::Model) -> Option<Self> {
        Some(Self {
            id: model.id,
            source: model.source,
            status: JobStatus::from_db_str(&model.status)?,
            requested_limit: model.requested_limit,
            records_ingested: model.records_ingested,
            error: model.error_message,
            created_at: rfc3339(model.created_at),
            updated_at: rfc3339(model.updated_at),
            finished_at: model.finished_at.map(rfc3339),
        })
    }
}

fn rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOverview {
    pub available_sources: Vec<SourceInfo>,
    pub last_scrape: Option<JobView>,
    pub next_scheduled: Option<String>,
}
