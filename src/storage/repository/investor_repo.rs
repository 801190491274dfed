use crate::directory::focus::derive_focus_flags;
use crate::directory::model::{InvestorDto, InvestorPage, ListParams, NewInvestor};
use crate::storage::entity::investor::{
    self, ActiveModel as InvestorActiveModel, Entity as Investor,
};
use chrono::Utc;
use log::info;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Iterable, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

pub const BULK_BATCH_SIZE: usize = 100;

pub struct InvestorRepository;

/// 把列表参数翻译成 WHERE 条件：各项 AND，search 在三列上 OR
pub fn build_condition(params: &ListParams) -> Condition {
    let mut cond = Condition::all();

    if let Some(t) = &params.investor_type {
        cond = cond.add(investor::Column::InvestorType.eq(t.as_str()));
    }
    if let Some(s) = &params.state {
        cond = cond.add(investor::Column::State.eq(s.as_str()));
    }
    if params.ai_only {
        cond = cond.add(investor::Column::HasAiFocus.eq(true));
    }
    if params.fintech_only {
        cond = cond.add(investor::Column::HasFintechFocus.eq(true));
    }
    if params.music_only {
        cond = cond.add(investor::Column::HasMusicFocus.eq(true));
    }
    if let Some(term) = &params.search {
        // SQLite 的 lower() 只折叠 ASCII，搜索词按同样规则折叠
        let pattern = format!("%{}%", escape_like(&term.to_ascii_lowercase()));
        cond = cond.add(
            Condition::any()
                .add(contains_ci(investor::Column::Name, &pattern))
                .add(contains_ci(investor::Column::Sectors, &pattern))
                .add(contains_ci(investor::Column::InvestmentFocus, &pattern)),
        );
    }

    cond
}

// lower(col) LIKE pattern ESCAPE '\'，不依赖后端 LIKE 的大小写规则
fn contains_ci(col: investor::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl InvestorRepository {
    pub async fn list(
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<InvestorPage, sea_orm::DbErr> {
        let query = Investor::find().filter(build_condition(params));

        let total = query.clone().count(db).await?;
        let models = query
            .order_by_asc(investor::Column::Name)
            .order_by_asc(investor::Column::Id)
            .offset(params.offset)
            .limit(params.limit)
            .all(db)
            .await?;

        Ok(InvestorPage {
            investors: models.into_iter().map(InvestorDto::from).collect(),
            total,
            limit: params.limit,
            offset: params.offset,
        })
    }

    /// 按原样插入一条记录（不查重），返回落库后的行
    pub async fn create(
        db: &DatabaseConnection,
        new: NewInvestor,
    ) -> Result<InvestorDto, sea_orm::DbErr> {
        let now = Utc::now().to_rfc3339();
        let active_model = to_active_model(new, &now, true);
        let model = active_model.insert(db).await?;
        Ok(InvestorDto::from(model))
    }

    /// 批量写入，以 cik 为冲突键整行覆盖；无 cik 的记录直接插入。请求体里的 id 忽略。
    pub async fn bulk_upsert(
        db: &DatabaseConnection,
        batch: Vec<NewInvestor>,
    ) -> Result<u64, sea_orm::DbErr> {
        if batch.is_empty() {
            return Ok(0);
        }
        let now = Utc::now().to_rfc3339();
        let update_cols: Vec<investor::Column> = investor::Column::iter()
            .filter(|c| !matches!(c, investor::Column::Id | investor::Column::Cik))
            .collect();

        let mut written = 0u64;
        let mut rest = batch;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(BULK_BATCH_SIZE));
            let chunk = std::mem::replace(&mut rest, tail);
            let n = chunk.len() as u64;
            let models: Vec<InvestorActiveModel> = chunk
                .into_iter()
                .map(|inv| to_active_model(inv, &now, false))
                .collect();

            Investor::insert_many(models)
                .on_conflict(
                    OnConflict::column(investor::Column::Cik)
                        .update_columns(update_cols.clone())
                        .to_owned(),
                )
                .exec(db)
                .await?;
            written += n;
            info!("bulk upsert: {} records written", written);
        }

        Ok(written)
    }

    /// 用 sectors/investment_focus 重新推导全部关注标记，返回被修改的行数
    pub async fn resync_focus_flags(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let rows = Investor::find()
            .select_only()
            .column(investor::Column::Id)
            .column(investor::Column::Sectors)
            .column(investor::Column::InvestmentFocus)
            .column(investor::Column::HasAiFocus)
            .column(investor::Column::HasFintechFocus)
            .column(investor::Column::HasMusicFocus)
            .into_tuple::<(i32, Option<String>, Option<String>, bool, bool, bool)>()
            .all(db)
            .await?;

        let mut changed = 0u64;
        for (id, sectors, focus, ai, fintech, music) in rows {
            let flags = derive_focus_flags(sectors.as_deref(), focus.as_deref());
            if (flags.ai, flags.fintech, flags.music) == (ai, fintech, music) {
                continue;
            }
            Investor::update_many()
                .col_expr(investor::Column::HasAiFocus, Expr::value(flags.ai))
                .col_expr(investor::Column::HasFintechFocus, Expr::value(flags.fintech))
                .col_expr(investor::Column::HasMusicFocus, Expr::value(flags.music))
                .filter(investor::Column::Id.eq(id))
                .exec(db)
                .await?;
            changed += 1;
        }

        Ok(changed)
    }
}

fn to_active_model(new: NewInvestor, now: &str, keep_id: bool) -> InvestorActiveModel {
    let derived = derive_focus_flags(new.sectors.as_deref(), new.investment_focus.as_deref());
    let data_sources = new.data_sources.unwrap_or_default();

    InvestorActiveModel {
        id: match new.id {
            Some(id) if keep_id => Set(id),
            _ => NotSet,
        },
        cik: Set(new.cik),
        name: Set(new.name.unwrap_or_default()),
        investor_type: Set(new.investor_type),
        address: Set(new.address),
        city: Set(new.city),
        state: Set(new.state),
        country: Set(new.country),
        aum_estimate: Set(new.aum_estimate),
        aum_min: Set(new.aum_min),
        aum_max: Set(new.aum_max),
        investment_focus: Set(new.investment_focus),
        stage_preference: Set(new.stage_preference),
        sectors: Set(new.sectors),
        geography: Set(new.geography),
        check_size_min: Set(new.check_size_min),
        check_size_max: Set(new.check_size_max),
        website: Set(new.website),
        contact_email: Set(new.contact_email),
        phone: Set(new.phone),
        linkedin_url: Set(new.linkedin_url),
        notable_investments: Set(new.notable_investments),
        decision_makers: Set(new.decision_makers),
        investment_thesis: Set(new.investment_thesis),
        recent_activity: Set(new.recent_activity),
        sec_url: Set(new.sec_url),
        crunchbase_url: Set(new.crunchbase_url),
        data_sources_json: Set(
            serde_json::to_string(&data_sources).unwrap_or_else(|_| "[]".to_string()),
        ),
        data_quality_score: Set(new.data_quality_score),
        // 只补省略的标记，提交的值不覆盖
        has_ai_focus: Set(new.has_ai_focus.unwrap_or(derived.ai)),
        has_fintech_focus: Set(new.has_fintech_focus.unwrap_or(derived.fintech)),
        has_music_focus: Set(new.has_music_focus.unwrap_or(derived.music)),
        last_updated: Set(new.last_updated.or_else(|| Some(now.to_string()))),
        scraped_at: Set(new.scraped_at),
    }
}
