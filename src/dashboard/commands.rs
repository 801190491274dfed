use crate::directory::Focus;
use std::str::FromStr;

/// 发往后台 actor 的命令；filter/type/focus 是本地过滤，不经过这里
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Refresh,
    LoadSources,
    Scrape { source: String, limit: i64 },
    Help,
    Quit,
    Unknown(String),
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "refresh" | "r" => Ok(AppCommand::Refresh),
            "sources" => Ok(AppCommand::LoadSources),
            "scrape" => {
                let Some(source) = parts.get(1) else {
                    return Ok(AppCommand::Unknown("用法: scrape <source> [limit]".to_string()));
                };
                let limit = match parts.get(2) {
                    None => 100,
                    Some(raw) => match raw.parse::<i64>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            return Ok(AppCommand::Unknown(format!("无效的 limit: {}", raw)));
                        }
                    },
                };
                Ok(AppCommand::Scrape {
                    source: source.to_string(),
                    limit,
                })
            }
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

/// 本地过滤命令
#[derive(Debug, Clone, PartialEq)]
pub enum LocalFilter {
    Query(String),
    Type(Option<String>),
    Focus(Option<Focus>),
}

impl LocalFilter {
    /// 不是本地过滤命令时返回 None；参数有误时返回 Err(提示)
    pub fn parse(input: &str) -> Option<Result<LocalFilter, String>> {
        let input = input.trim();
        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((h, r)) => (h, r.trim()),
            None => (input, ""),
        };

        match head {
            "filter" => {
                if rest == "clear" {
                    Some(Ok(LocalFilter::Query(String::new())))
                } else {
                    Some(Ok(LocalFilter::Query(rest.to_string())))
                }
            }
            "type" => match rest {
                "" => Some(Err("用法: type <name> | type clear".to_string())),
                "clear" => Some(Ok(LocalFilter::Type(None))),
                name => Some(Ok(LocalFilter::Type(Some(name.to_string())))),
            },
            "focus" => match rest {
                "" | "clear" => Some(Ok(LocalFilter::Focus(None))),
                other => Some(
                    other
                        .parse::<Focus>()
                        .map(|f| LocalFilter::Focus(Some(f)))
                        .map_err(|_| format!("未知的关注领域: {} (ai|fintech|music)", other)),
                ),
            },
            _ => None,
        }
    }
}

pub const HELP_TEXT: &str = "可用命令: filter <text>|clear | type <name>|clear | focus ai|fintech|music|clear | refresh | sources | scrape <source> [limit] | help | quit";
