use crate::storage::entity::scrape_job::{
    self, ActiveModel as ScrapeJobActiveModel, Entity as ScrapeJob,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

const TERMINAL_STATUSES: [&str; 2] = ["DONE", "FAILED"];

pub struct ScrapeJobRepository;

impl ScrapeJobRepository {
    pub async fn create_job(
        db: &DatabaseConnection,
        source: &str,
        requested_limit: i64,
    ) -> Result<scrape_job::Model, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = ScrapeJobActiveModel {
            source: Set(source.to_string()),
            requested_limit: Set(requested_limit),
            status: Set("QUEUED".to_string()),
            records_ingested: Set(0),
            error_message: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            finished_at: Set(None),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<scrape_job::Model>, sea_orm::DbErr> {
        ScrapeJob::find_by_id(id).one(db).await
    }

    /// 最近一次结束（DONE/FAILED）的任务
    pub async fn latest_finished(
        db: &DatabaseConnection,
    ) -> Result<Option<scrape_job::Model>, sea_orm::DbErr> {
        ScrapeJob::find()
            .filter(scrape_job::Column::FinishedAt.is_not_null())
            .order_by_desc(scrape_job::Column::FinishedAt)
            .order_by_desc(scrape_job::Column::Id)
            .one(db)
            .await
    }

    /// 写入新状态；终态时同时记录 finished_at。
    /// 只改尚未结束的任务，返回 None 表示任务不存在或已经结束。
    pub async fn update_status(
        db: &DatabaseConnection,
        id: i32,
        status: &str,
        terminal: bool,
        records_ingested: Option<i64>,
        error_message: Option<String>,
    ) -> Result<Option<scrape_job::Model>, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let mut update = ScrapeJob::update_many()
            .col_expr(scrape_job::Column::Status, Expr::value(status))
            .col_expr(scrape_job::Column::UpdatedAt, Expr::value(now));
        if let Some(n) = records_ingested {
            update = update.col_expr(scrape_job::Column::RecordsIngested, Expr::value(n));
        }
        if let Some(m) = error_message {
            update = update.col_expr(scrape_job::Column::ErrorMessage, Expr::value(Some(m)));
        }
        if terminal {
            update = update.col_expr(scrape_job::Column::FinishedAt, Expr::value(Some(now)));
        }

        // 检查与写入在同一条 UPDATE 里完成，并发回调不会覆盖终态
        let res = update
            .filter(scrape_job::Column::Id.eq(id))
            .filter(scrape_job::Column::Status.is_not_in(TERMINAL_STATUSES))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Ok(None);
        }

        Self::find(db, id).await
    }
}
