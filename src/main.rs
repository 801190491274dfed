use anyhow::Context;
use log::{info, warn};
use vcintel::api::{create_router, AppState};
use vcintel::config::ServerConfig;
use vcintel::storage::{self, repository::InvestorRepository};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // .env 可选
    if dotenv::dotenv().is_err() {
        eprintln!("⚠ 未找到 .env 文件，直接读取系统环境变量");
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("vcintel", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let config = ServerConfig::from_env();
    info!("正在连接数据库: {}", config.database_url);
    let db = storage::establish_connection(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("数据库连接失败: {}", config.database_url))?;
    info!("✓ 数据库连接成功");

    if config.sync_focus_on_start {
        match InvestorRepository::resync_focus_flags(&db).await {
            Ok(n) => info!("✓ 关注标记已重新推导，修改 {} 行", n),
            Err(e) => warn!("⚠ 关注标记推导失败: {}", e),
        }
    }

    let app = create_router(AppState::new(db));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    info!("✓ 服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("服务异常退出")?;
    Ok(())
}
