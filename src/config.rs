use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://investors.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// 服务端配置，全部来自环境变量（.env 由 main 负责加载）
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub sync_focus_on_start: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            sync_focus_on_start: std::env::var("SYNC_FOCUS_ON_START")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_url: String,
    pub page_size: u64,
    pub timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let api_url = std::env::var("DIRECTORY_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            page_size: env_parse("DASHBOARD_PAGE_SIZE").unwrap_or(100),
            timeout: Duration::from_secs(env_parse("DASHBOARD_TIMEOUT_SECS").unwrap_or(10)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
