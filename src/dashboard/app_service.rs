use super::app_state::AppEvent;
use super::client::DirectoryApi;
use super::commands::AppCommand;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 并发取列表和统计，两者都返回后各自更新；一边失败不影响另一边
pub async fn refresh(api: &dyn DirectoryApi, page_size: u64, tx: &mpsc::UnboundedSender<AppEvent>) {
    let (investors, stats) = tokio::join!(api.fetch_investors(page_size), api.fetch_stats());

    match investors {
        Ok(page) => {
            info!("loaded {} of {} investors", page.investors.len(), page.total);
            let _ = tx.send(AppEvent::Investors(page));
        }
        Err(e) => {
            warn!("fetch investors failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 加载投资人失败: {}", e)));
        }
    }

    match stats {
        Ok(stats) => {
            let _ = tx.send(AppEvent::Stats(stats));
        }
        Err(e) => {
            warn!("fetch stats failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 加载统计失败: {}", e)));
        }
    }

    let _ = tx.send(AppEvent::RefreshDone);
}

pub async fn load_sources(api: &dyn DirectoryApi, tx: &mpsc::UnboundedSender<AppEvent>) {
    match api.fetch_sources().await {
        Ok(overview) => {
            let _ = tx.send(AppEvent::Sources(overview));
        }
        Err(e) => {
            warn!("fetch scrape sources failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 加载数据来源失败: {}", e)));
        }
    }
}

pub async fn submit_scrape(
    api: &dyn DirectoryApi,
    source: &str,
    limit: i64,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match api.submit_scrape(source, limit).await {
        Ok(accepted) => {
            info!("scrape job {} queued for {}", accepted.job_id, source);
            let _ = tx.send(AppEvent::ScrapeQueued(accepted));
        }
        Err(e) => {
            warn!("submit scrape failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 提交抓取任务失败: {}", e)));
        }
    }
}

/// 单后台任务：持有 HTTP 客户端，按顺序处理命令
pub async fn run_actor(
    api: Arc<dyn DirectoryApi>,
    page_size: u64,
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    refresh(api.as_ref(), page_size, &evt_tx).await;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            AppCommand::Refresh => {
                let _ = evt_tx.send(AppEvent::Message("正在刷新...".to_string()));
                refresh(api.as_ref(), page_size, &evt_tx).await;
            }
            AppCommand::LoadSources => load_sources(api.as_ref(), &evt_tx).await,
            AppCommand::Scrape { source, limit } => {
                submit_scrape(api.as_ref(), &source, limit, &evt_tx).await;
                load_sources(api.as_ref(), &evt_tx).await;
            }
            AppCommand::Help | AppCommand::Quit => {}
            AppCommand::Unknown(msg) => {
                let _ = evt_tx.send(AppEvent::Error(format!("✗ {}", msg)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::client::ClientError;
    use crate::directory::{DirectoryStats, InvestorDto, InvestorPage};
    use crate::ingestion::{JobStatus, ScrapeAccepted, ScrapeOverview};
    use async_trait::async_trait;

    struct FakeApi {
        stats_fail: bool,
        investors_fail: bool,
    }

    #[async_trait]
    impl DirectoryApi for FakeApi {
        async fn fetch_investors(&self, limit: u64) -> Result<InvestorPage, ClientError> {
            if self.investors_fail {
                return Err(ClientError::Http("connection refused".into()));
            }
            Ok(InvestorPage {
                investors: vec![InvestorDto::named(1, "Acme Ventures")],
                total: 1,
                limit,
                offset: 0,
            })
        }

        async fn fetch_stats(&self) -> Result<DirectoryStats, ClientError> {
            if self.stats_fail {
                return Err(ClientError::Status {
                    status: 500,
                    message: "database is locked".into(),
                });
            }
            Ok(DirectoryStats {
                total_investors: 1,
                ..Default::default()
            })
        }

        async fn fetch_sources(&self) -> Result<ScrapeOverview, ClientError> {
            Ok(ScrapeOverview {
                available_sources: Vec::new(),
                last_scrape: None,
                next_scheduled: None,
            })
        }

        async fn submit_scrape(
            &self,
            source: &str,
            limit: i64,
        ) -> Result<ScrapeAccepted, ClientError> {
            Ok(ScrapeAccepted {
                success: true,
                message: format!("Scraping job queued for {} with limit {}", source, limit),
                job_id: 9,
                status: JobStatus::Queued,
                estimated_time: "5-10 minutes".into(),
            })
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn stats_failure_still_delivers_investors() {
        let api = FakeApi {
            stats_fail: true,
            investors_fail: false,
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        refresh(&api, 50, &tx).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[0], AppEvent::Investors(p) if p.limit == 50));
        assert!(matches!(&events[1], AppEvent::Error(msg) if msg.contains("database is locked")));
        assert!(matches!(events.last(), Some(AppEvent::RefreshDone)));
        assert!(!events.iter().any(|e| matches!(e, AppEvent::Stats(_))));
    }

    #[tokio::test]
    async fn investors_failure_still_delivers_stats() {
        let api = FakeApi {
            stats_fail: false,
            investors_fail: true,
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        refresh(&api, 100, &tx).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[0], AppEvent::Error(_)));
        assert!(matches!(&events[1], AppEvent::Stats(s) if s.total_investors == 1));
    }

    #[tokio::test]
    async fn actor_refreshes_on_start_and_handles_scrape() {
        let api: Arc<dyn DirectoryApi> = Arc::new(FakeApi {
            stats_fail: false,
            investors_fail: false,
        });
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (evt_tx, mut evt_rx) = mpsc::unbounded_channel();

        cmd_tx
            .send(AppCommand::Scrape {
                source: "sec".into(),
                limit: 10,
            })
            .unwrap();
        drop(cmd_tx);
        run_actor(api, 100, cmd_rx, evt_tx).await;

        let events = drain(&mut evt_rx);
        assert!(matches!(&events[0], AppEvent::Investors(_)));
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::ScrapeQueued(a) if a.job_id == 9)));
        assert!(matches!(events.last(), Some(AppEvent::Sources(_))));
    }
}
