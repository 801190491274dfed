use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, nullable)]
    pub cik: Option<String>,
    pub name: String,
    // `type` 是关键字，列名保持原样
    #[sea_orm(column_name = "type", nullable)]
    pub investor_type: Option<String>,
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(nullable)]
    pub state: Option<String>,
    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub aum_estimate: Option<String>,
    #[sea_orm(nullable)]
    pub aum_min: Option<f64>,
    #[sea_orm(nullable)]
    pub aum_max: Option<f64>,
    #[sea_orm(nullable)]
    pub investment_focus: Option<String>,
    #[sea_orm(nullable)]
    pub stage_preference: Option<String>,
    #[sea_orm(nullable)]
    pub sectors: Option<String>, // 逗号分隔，原样保存
    #[sea_orm(nullable)]
    pub geography: Option<String>,
    #[sea_orm(nullable)]
    pub check_size_min: Option<f64>,
    #[sea_orm(nullable)]
    pub check_size_max: Option<f64>,

    #[sea_orm(nullable)]
    pub website: Option<String>,
    #[sea_orm(nullable)]
    pub contact_email: Option<String>,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    #[sea_orm(nullable)]
    pub linkedin_url: Option<String>,
    #[sea_orm(nullable)]
    pub notable_investments: Option<String>,
    #[sea_orm(nullable)]
    pub decision_makers: Option<String>,
    #[sea_orm(nullable)]
    pub investment_thesis: Option<String>,
    #[sea_orm(nullable)]
    pub recent_activity: Option<String>,
    #[sea_orm(nullable)]
    pub sec_url: Option<String>,
    #[sea_orm(nullable)]
    pub crunchbase_url: Option<String>,

    // 来源信息
    pub data_sources_json: String, // JSON array
    #[sea_orm(nullable)]
    pub data_quality_score: Option<f64>,

    // 关注标记（以此为准）
    pub has_ai_focus: bool,
    pub has_fintech_focus: bool,
    pub has_music_focus: bool,

    #[sea_orm(nullable)]
    pub last_updated: Option<String>,
    #[sea_orm(nullable)]
    pub scraped_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
