use crate::directory::model::{DirectoryStats, RankedCounts, TOP_STATES};
use crate::storage::entity::investor::{self, Entity as Investor};
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::BTreeMap;

pub struct StatsRepository;

impl StatsRepository {
    /// 六个聚合并发执行，任一失败则整体失败
    pub async fn stats(db: &DatabaseConnection) -> Result<DirectoryStats, sea_orm::DbErr> {
        let (total_investors, by_type, top_states, ai_investors, fintech_investors, music_investors) =
            tokio::try_join!(
                Investor::find().count(db),
                Self::count_by_type(db),
                Self::top_states(db, TOP_STATES),
                Self::count_flag(db, investor::Column::HasAiFocus),
                Self::count_flag(db, investor::Column::HasFintechFocus),
                Self::count_flag(db, investor::Column::HasMusicFocus),
            )?;

        Ok(DirectoryStats {
            total_investors,
            by_type,
            top_states,
            ai_investors,
            fintech_investors,
            music_investors,
        })
    }

    /// 按 type 分组计数，空值不计
    pub async fn count_by_type(
        db: &DatabaseConnection,
    ) -> Result<BTreeMap<String, u64>, sea_orm::DbErr> {
        let rows = Investor::find()
            .select_only()
            .column(investor::Column::InvestorType)
            .column_as(investor::Column::Id.count(), "count")
            .filter(investor::Column::InvestorType.is_not_null())
            .filter(investor::Column::InvestorType.ne(""))
            .group_by(investor::Column::InvestorType)
            .into_tuple::<(String, i64)>()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(t, n)| (t, n.max(0) as u64))
            .collect())
    }

    /// 计数最多的前 n 个州，计数相同按州名升序
    pub async fn top_states(
        db: &DatabaseConnection,
        n: u64,
    ) -> Result<RankedCounts, sea_orm::DbErr> {
        let rows = Investor::find()
            .select_only()
            .column(investor::Column::State)
            .column_as(investor::Column::Id.count(), "count")
            .filter(investor::Column::State.is_not_null())
            .filter(investor::Column::State.ne(""))
            .group_by(investor::Column::State)
            .order_by(Expr::col(investor::Column::Id).count(), Order::Desc)
            .order_by_asc(investor::Column::State)
            .limit(n)
            .into_tuple::<(String, i64)>()
            .all(db)
            .await?;

        Ok(RankedCounts(
            rows.into_iter().map(|(s, c)| (s, c.max(0) as u64)).collect(),
        ))
    }

    async fn count_flag(
        db: &DatabaseConnection,
        flag: investor::Column,
    ) -> Result<u64, sea_orm::DbErr> {
        Investor::find().filter(flag.eq(true)).count(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::model::NewInvestor;
    use crate::storage::memory_db;
    use crate::storage::repository::InvestorRepository;

    fn investor(name: &str, t: Option<&str>, state: Option<&str>) -> NewInvestor {
        NewInvestor {
            name: Some(name.to_string()),
            investor_type: t.map(str::to_string),
            state: state.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_store_yields_zeroes() {
        let db = memory_db().await;
        let stats = StatsRepository::stats(&db).await.unwrap();
        assert_eq!(stats.total_investors, 0);
        assert!(stats.by_type.is_empty());
        assert!(stats.top_states.is_empty());
        assert_eq!(stats.ai_investors, 0);
    }

    #[tokio::test]
    async fn by_type_groups_and_skips_blank_types() {
        let db = memory_db().await;
        for inv in [
            investor("A", Some("VC"), None),
            investor("B", Some("FO"), None),
            investor("C", Some("VC"), None),
            investor("D", None, None),
        ] {
            InvestorRepository::create(&db, inv).await.unwrap();
        }

        let stats = StatsRepository::stats(&db).await.unwrap();
        assert_eq!(stats.total_investors, 4);
        assert_eq!(stats.by_type.len(), 2);
        assert_eq!(stats.by_type.get("VC"), Some(&2));
        assert_eq!(stats.by_type.get("FO"), Some(&1));
    }

    #[tokio::test]
    async fn top_states_are_ranked_and_capped() {
        let db = memory_db().await;
        let states = [
            "CA", "CA", "CA", "NY", "NY", "TX", "WA", "MA", "IL", "FL", "CO", "GA", "OR", "NV",
        ];
        for (i, s) in states.iter().enumerate() {
            InvestorRepository::create(&db, investor(&format!("Fund {i}"), None, Some(s)))
                .await
                .unwrap();
        }

        let stats = StatsRepository::stats(&db).await.unwrap();
        assert_eq!(stats.top_states.len(), 10);
        let ranked: Vec<&str> = stats.top_states.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(ranked[0], "CA");
        assert_eq!(ranked[1], "NY");
        // 其余计数都是 1，按州名排
        assert_eq!(&ranked[2..], &["CO", "FL", "GA", "IL", "MA", "NV", "OR", "TX"]);
        assert_eq!(stats.top_states.get("CA"), Some(3));
        assert_eq!(stats.top_states.get("WA"), None);
    }

    #[tokio::test]
    async fn flag_counts_follow_stored_flags() {
        let db = memory_db().await;
        let mut ai = investor("AI Fund", None, None);
        ai.has_ai_focus = Some(true);
        ai.has_music_focus = Some(true);
        let mut fin = investor("Fin Fund", None, None);
        fin.sectors = Some("Banking".into());
        for inv in [ai, fin, investor("Plain", None, None)] {
            InvestorRepository::create(&db, inv).await.unwrap();
        }

        let stats = StatsRepository::stats(&db).await.unwrap();
        assert_eq!(stats.ai_investors, 1);
        assert_eq!(stats.fintech_investors, 1);
        assert_eq!(stats.music_investors, 1);
        assert_eq!(stats.total_investors, 3);
    }
}
