use super::commands::{AppCommand, LocalFilter, HELP_TEXT};
use crate::directory::{DirectoryStats, Focus, InvestorDto, InvestorPage};
use crate::ingestion::{ScrapeAccepted, ScrapeOverview};
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use std::str::FromStr;
use tokio::sync::mpsc;

pub const MENU_ITEMS: [&str; 4] = ["投资人列表", "详细信息", "统计概览", "数据来源"];

#[derive(PartialEq, Debug, Clone)]
pub enum ViewMode {
    Cards,
    Detail,
    Stats,
    Sources,
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Investors(InvestorPage),
    Stats(DirectoryStats),
    Sources(ScrapeOverview),
    ScrapeQueued(ScrapeAccepted),
    RefreshDone,
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub investors_all: Vec<InvestorDto>,
    pub investor_list: Vec<InvestorDto>,
    pub total_available: u64,
    pub selected_index: usize,
    pub investor_list_state: ListState,
    pub stats: Option<DirectoryStats>,
    pub sources: Option<ScrapeOverview>,
    pub refreshing: bool,
    pub detail_scroll: u16,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub filter_query: String,
    pub filter_type: Option<String>,
    pub filter_focus: Option<Focus>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            view_mode: ViewMode::Cards,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::MainView,
            menu_selected_index: 0,
            investors_all: Vec::new(),
            investor_list: Vec::new(),
            total_available: 0,
            selected_index: 0,
            investor_list_state: {
                let mut s = ListState::default();
                s.select(Some(0));
                s
            },
            stats: None,
            sources: None,
            // 启动时 actor 会先刷新一次
            refreshing: true,
            detail_scroll: 0,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            filter_query: String::new(),
            filter_type: None,
            filter_focus: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    pub fn selected_investor(&self) -> Option<&InvestorDto> {
        self.investor_list.get(self.selected_index)
    }

    /// 命令补全提示
    pub fn get_completion_hint(&self) -> Option<String> {
        let commands = [
            "filter", "type", "focus", "refresh", "sources", "scrape", "help", "quit",
        ];
        let input = self.command_input.trim_start();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let trailing_space = input.ends_with(' ');
        if parts.len() == 1 && !trailing_space {
            return commands
                .iter()
                .find(|c| c.starts_with(parts[0]) && **c != parts[0])
                .map(|c| c[parts[0].len()..].to_string());
        }

        let subs: &[&str] = match parts[0] {
            "focus" => &["ai", "fintech", "music", "clear"],
            "scrape" => &["sec_adv", "sec_13f", "crunchbase"],
            "type" | "filter" => &["clear"],
            _ => return None,
        };
        let cur = if trailing_space {
            ""
        } else {
            parts.get(1).copied().unwrap_or("")
        };
        if parts.len() > 2 || (parts.len() == 2 && trailing_space) {
            return None;
        }
        subs.iter()
            .find(|s| s.starts_with(cur) && **s != cur)
            .map(|s| s[cur.len()..].to_string())
    }

    pub fn clamp_selection(&mut self) {
        if self.selected_index >= self.investor_list.len() {
            self.selected_index = self.investor_list.len().saturating_sub(1);
        }
        self.investor_list_state.select(Some(self.selected_index));
    }

    /// 在已取回的一页上做本地过滤，不请求服务端
    pub fn apply_filters(&mut self) {
        let query = self.filter_query.trim().to_lowercase();
        self.investor_list = self
            .investors_all
            .iter()
            .filter(|inv| {
                if !query.is_empty() {
                    let in_name = inv.name.to_lowercase().contains(&query);
                    let in_sectors = inv
                        .sectors
                        .as_deref()
                        .map(|s| s.to_lowercase().contains(&query))
                        .unwrap_or(false);
                    if !in_name && !in_sectors {
                        return false;
                    }
                }
                if let Some(t) = &self.filter_type {
                    if inv.investor_type.as_deref() != Some(t.as_str()) {
                        return false;
                    }
                }
                if let Some(focus) = self.filter_focus {
                    if !focus.matches(inv) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        if self.selected_index >= self.investor_list.len() {
            self.selected_index = 0;
        }
        self.investor_list_state.select(Some(self.selected_index));
    }

    pub fn apply_local_filter(&mut self, filter: LocalFilter) {
        match filter {
            LocalFilter::Query(q) => self.filter_query = q,
            LocalFilter::Type(t) => self.filter_type = t,
            LocalFilter::Focus(f) => self.filter_focus = f,
        }
        self.apply_filters();
        self.add_log(format!(
            "筛选后 {} / {} 条",
            self.investor_list.len(),
            self.investors_all.len()
        ));
    }

    pub fn request_refresh(&mut self) {
        self.refreshing = true;
        let _ = self.cmd_tx.send(AppCommand::Refresh);
    }

    pub fn request_sources(&mut self) {
        let _ = self.cmd_tx.send(AppCommand::LoadSources);
    }

    /// 后台事件写回界面状态；每类数据只更新自己的区块
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.log_messages.push(msg)
            }
            AppEvent::Investors(page) => {
                self.total_available = page.total;
                self.investors_all = page.investors;
                self.apply_filters();
                self.clamp_selection();
            }
            AppEvent::Stats(stats) => {
                self.stats = Some(stats);
            }
            AppEvent::Sources(overview) => {
                self.sources = Some(overview);
            }
            AppEvent::ScrapeQueued(accepted) => {
                self.log_messages.push(format!(
                    "✓ {} [job {}] 预计 {}",
                    accepted.message, accepted.job_id, accepted.estimated_time
                ));
            }
            AppEvent::RefreshDone => {
                self.refreshing = false;
            }
        }
    }

    fn finish_command(&mut self, cmd: String) {
        self.command_history.push(cmd);
        self.command_history_index = None;
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    /// 执行一条命令行输入，返回 true 表示退出
    fn execute_command(&mut self, cmd_owned: String) -> bool {
        if let Some(parsed) = LocalFilter::parse(&cmd_owned) {
            match parsed {
                Ok(filter) => self.apply_local_filter(filter),
                Err(hint) => self.add_log(format!("⚠ {}", hint)),
            }
            self.finish_command(cmd_owned);
            return false;
        }

        let app_cmd = AppCommand::from_str(&cmd_owned)
            .unwrap_or_else(|_| AppCommand::Unknown(cmd_owned.clone()));
        self.finish_command(cmd_owned);
        match app_cmd {
            AppCommand::Quit => return true,
            AppCommand::Help => self.add_log(HELP_TEXT.to_string()),
            AppCommand::Refresh => self.request_refresh(),
            AppCommand::LoadSources => {
                self.view_mode = ViewMode::Sources;
                self.menu_selected_index = 3;
                self.request_sources();
            }
            AppCommand::Unknown(msg) => self.add_log(format!("✗ {}", msg)),
            other => {
                let _ = self.cmd_tx.send(other);
            }
        }
        false
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            match key {
                KeyCode::Enter => {
                    let cmd_owned = self.command_input.trim().to_string();
                    if cmd_owned.is_empty() {
                        self.command_input.clear();
                        self.command_cursor = 0;
                        self.input_mode = InputMode::Normal;
                        return false;
                    }
                    return self.execute_command(cmd_owned);
                }
                KeyCode::Esc => {
                    self.command_input.clear();
                    self.command_cursor = 0;
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Tab => {
                    if let Some(hint) = self.get_completion_hint() {
                        let insert = format!("{} ", hint);
                        self.command_input.insert_str(self.command_cursor, &insert);
                        self.command_cursor += insert.len();
                    }
                }
                KeyCode::Up => {
                    if self.command_history.is_empty() {
                        return false;
                    }
                    let next = match self.command_history_index {
                        None => self.command_history.len().saturating_sub(1),
                        Some(i) => i.saturating_sub(1),
                    };
                    self.command_history_index = Some(next);
                    if let Some(cmd) = self.command_history.get(next) {
                        self.command_input = cmd.clone();
                        self.command_cursor = self.command_input.len();
                    }
                }
                KeyCode::Down => {
                    let Some(i) = self.command_history_index else {
                        return false;
                    };
                    let next = i + 1;
                    if next >= self.command_history.len() {
                        self.command_history_index = None;
                        self.command_input.clear();
                        self.command_cursor = 0;
                        return false;
                    }
                    self.command_history_index = Some(next);
                    if let Some(cmd) = self.command_history.get(next) {
                        self.command_input = cmd.clone();
                        self.command_cursor = self.command_input.len();
                    }
                }
                KeyCode::Backspace => {
                    if self.command_cursor > 0 {
                        let idx = self.prev_char_boundary();
                        self.command_input.remove(idx);
                        self.command_cursor = idx;
                    }
                }
                KeyCode::Delete => {
                    if self.command_cursor < self.command_input.len() {
                        self.command_input.remove(self.command_cursor);
                    }
                }
                KeyCode::Left => {
                    if self.command_cursor > 0 {
                        self.command_cursor = self.prev_char_boundary();
                    }
                }
                KeyCode::Right => {
                    if let Some(c) = self.command_input[self.command_cursor..].chars().next() {
                        self.command_cursor += c.len_utf8();
                    }
                }
                KeyCode::Home => self.command_cursor = 0,
                KeyCode::End => self.command_cursor = self.command_input.len(),
                KeyCode::Char(c) => {
                    self.command_input.insert(self.command_cursor, c);
                    self.command_cursor += c.len_utf8();
                }
                _ => {}
            }
            return false;
        }

        // 正常模式
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else if self.view_mode == ViewMode::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1);
                } else if self.view_mode == ViewMode::Cards && self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index < MENU_ITEMS.len() - 1 {
                        self.menu_selected_index += 1;
                    }
                } else if self.view_mode == ViewMode::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_add(1);
                } else if self.view_mode == ViewMode::Cards
                    && self.selected_index < self.investor_list.len().saturating_sub(1)
                {
                    self.selected_index += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    self.view_mode = match self.menu_selected_index {
                        0 => ViewMode::Cards,
                        1 => ViewMode::Detail,
                        2 => ViewMode::Stats,
                        _ => ViewMode::Sources,
                    };
                    if self.view_mode == ViewMode::Sources {
                        self.request_sources();
                    }
                    self.detail_scroll = 0;
                    self.focus_area = FocusArea::MainView;
                } else if self.view_mode == ViewMode::Cards && !self.investor_list.is_empty() {
                    self.view_mode = ViewMode::Detail;
                    self.menu_selected_index = 1;
                    self.detail_scroll = 0;
                }
            }
            KeyCode::Char('x') => {
                if self.view_mode == ViewMode::Detail {
                    self.view_mode = ViewMode::Cards;
                    self.menu_selected_index = 0;
                }
            }
            KeyCode::Char('f') => {
                if self.view_mode == ViewMode::Cards {
                    self.filter_focus = match self.filter_focus {
                        None => Some(Focus::Ai),
                        Some(Focus::Ai) => Some(Focus::Fintech),
                        Some(Focus::Fintech) => Some(Focus::Music),
                        Some(Focus::Music) => None,
                    };
                    self.apply_filters();
                }
            }
            _ => {}
        }
        false
    }

    fn prev_char_boundary(&self) -> usize {
        self.command_input[..self.command_cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
