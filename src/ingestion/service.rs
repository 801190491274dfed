use super::model::{
    CompletionCallback, JobStatus, JobView, ScrapeAccepted, ScrapeOverview, ScrapeRequest,
    ScrapeSource, DEFAULT_SCRAPE_LIMIT, DEFAULT_SOURCE, ESTIMATED_TIME,
};
use crate::storage::repository::ScrapeJobRepository;
use log::{info, warn};
use sea_orm::DatabaseConnection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("{0}")]
    UnknownSource(String),
    #[error("limit must be positive, got {0}")]
    InvalidLimit(i64),
    #[error("invalid job status: {0}")]
    InvalidStatus(String),
    #[error("scrape job {0} not found")]
    NotFound(i32),
    #[error("scrape job {id} is already {status:?}")]
    AlreadyFinished { id: i32, status: JobStatus },
    #[error(transparent)]
    Store(#[from] sea_orm::DbErr),
}

/// 抓取任务只在这里排队和记账，真正的抓取由外部管道完成后回调
pub struct IngestionService;

impl IngestionService {
    pub async fn overview(db: &DatabaseConnection) -> Result<ScrapeOverview, IngestionError> {
        let last_scrape = ScrapeJobRepository::latest_finished(db)
            .await?
            .and_then(JobView::from_model);

        Ok(ScrapeOverview {
            available_sources: ScrapeSource::ALL.iter().map(|s| s.info()).collect(),
            last_scrape,
            next_scheduled: None,
        })
    }

    pub async fn submit(
        db: &DatabaseConnection,
        req: ScrapeRequest,
    ) -> Result<ScrapeAccepted, IngestionError> {
        let source: ScrapeSource = req
            .source
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE)
            .parse()
            .map_err(IngestionError::UnknownSource)?;
        let limit = req.limit.unwrap_or(DEFAULT_SCRAPE_LIMIT);
        if limit <= 0 {
            return Err(IngestionError::InvalidLimit(limit));
        }

        let job = ScrapeJobRepository::create_job(db, source.as_str(), limit).await?;
        info!("✓ 抓取任务已排队: job={} source={} limit={}", job.id, source, limit);

        Ok(ScrapeAccepted {
            success: true,
            message: format!("Scraping job queued for {} with limit {}", source, limit),
            job_id: job.id,
            status: JobStatus::Queued,
            estimated_time: ESTIMATED_TIME.to_string(),
        })
    }

    pub async fn job(db: &DatabaseConnection, id: i32) -> Result<JobView, IngestionError> {
        ScrapeJobRepository::find(db, id)
            .await?
            .and_then(JobView::from_model)
            .ok_or(IngestionError::NotFound(id))
    }

    /// 终态任务不允许再改
    pub async fn complete(
        db: &DatabaseConnection,
        id: i32,
        callback: CompletionCallback,
    ) -> Result<JobView, IngestionError> {
        let next = match callback.status.trim().to_ascii_lowercase().as_str() {
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "failed" => JobStatus::Failed,
            other => return Err(IngestionError::InvalidStatus(other.to_string())),
        };

        let current = Self::job(db, id).await?;
        if current.status.is_terminal() {
            warn!("⚠ 回调被拒绝: job={} 已是 {:?}", id, current.status);
            return Err(IngestionError::AlreadyFinished {
                id,
                status: current.status,
            });
        }

        let updated = ScrapeJobRepository::update_status(
            db,
            id,
            next.as_db_str(),
            next.is_terminal(),
            callback.records_ingested,
            callback.error,
        )
        .await?;

        let Some(updated) = updated else {
            // 检查之后被别的回调抢先结束，或者已被删除
            let current = Self::job(db, id).await?;
            warn!("⚠ 回调被拒绝: job={} 已是 {:?}", id, current.status);
            return Err(IngestionError::AlreadyFinished {
                id,
                status: current.status,
            });
        };
        info!("✓ 抓取任务状态更新: job={} -> {:?}", id, next);

        JobView::from_model(updated).ok_or(IngestionError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_db;

    fn callback(status: &str, records: Option<i64>) -> CompletionCallback {
        CompletionCallback {
            status: status.to_string(),
            records_ingested: records,
            error: None,
        }
    }

    #[tokio::test]
    async fn submit_defaults_to_form_adv() {
        let db = memory_db().await;
        let accepted = IngestionService::submit(&db, ScrapeRequest::default())
            .await
            .unwrap();
        assert!(accepted.success);
        assert_eq!(accepted.status, JobStatus::Queued);
        assert_eq!(accepted.message, "Scraping job queued for sec_adv with limit 100");

        let job = IngestionService::job(&db, accepted.job_id).await.unwrap();
        assert_eq!(job.source, "sec_adv");
        assert_eq!(job.requested_limit, 100);
    }

    #[tokio::test]
    async fn submit_rejects_unknown_source_and_bad_limit() {
        let db = memory_db().await;
        let req = ScrapeRequest {
            source: Some("myspace".into()),
            limit: None,
        };
        assert!(matches!(
            IngestionService::submit(&db, req).await,
            Err(IngestionError::UnknownSource(_))
        ));

        let req = ScrapeRequest {
            source: None,
            limit: Some(0),
        };
        assert!(matches!(
            IngestionService::submit(&db, req).await,
            Err(IngestionError::InvalidLimit(0))
        ));
    }

    #[tokio::test]
    async fn finished_jobs_cannot_be_reopened() {
        let db = memory_db().await;
        let accepted = IngestionService::submit(&db, ScrapeRequest::default())
            .await
            .unwrap();
        let id = accepted.job_id;

        let running = IngestionService::complete(&db, id, callback("running", Some(10)))
            .await
            .unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert!(running.finished_at.is_none());

        let done = IngestionService::complete(&db, id, callback("done", Some(250)))
            .await
            .unwrap();
        assert_eq!(done.status, JobStatus::Done);
        assert_eq!(done.records_ingested, 250);
        assert!(done.finished_at.is_some());

        let err = IngestionService::complete(&db, id, callback("failed", None))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::AlreadyFinished { .. }));

        let overview = IngestionService::overview(&db).await.unwrap();
        assert_eq!(overview.last_scrape.map(|j| j.id), Some(id));
        assert!(overview.next_scheduled.is_none());
    }

    #[tokio::test]
    async fn callback_validates_status_and_job() {
        let db = memory_db().await;
        assert!(matches!(
            IngestionService::complete(&db, 7, callback("done", None)).await,
            Err(IngestionError::NotFound(7))
        ));
        assert!(matches!(
            IngestionService::complete(&db, 7, callback("queued", None)).await,
            Err(IngestionError::InvalidStatus(_))
        ));
    }
}
