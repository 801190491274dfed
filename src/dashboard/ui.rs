use super::app_state::{App, FocusArea, InputMode, ViewMode, MENU_ITEMS};
use crate::directory::{Focus, InvestorDto};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题栏
            Constraint::Min(0),    // 内容区域
            Constraint::Min(8),    // 命令/日志
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);
}

fn border_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let status = if app.refreshing {
        Span::styled(" 刷新中...", Style::default().fg(Color::Yellow))
    } else {
        Span::raw(format!(
            " - 已载入 {} / 共 {} 家",
            app.investors_all.len(),
            app.total_available
        ))
    };
    let title_text = Line::from(vec![
        Span::styled(
            " 投资机构目录 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        status,
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        )
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = matches!(
                (i, &app.view_mode),
                (0, ViewMode::Cards)
                    | (1, ViewMode::Detail)
                    | (2, ViewMode::Stats)
                    | (3, ViewMode::Sources)
            );

            let style = if is_selected && app.focus_area == FocusArea::Menu {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, text)).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter/c 确认)"
    } else {
        "菜单 (← 切换)"
    };
    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(border_style(app.focus_area == FocusArea::Menu)),
    );
    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    match app.view_mode {
        ViewMode::Cards => render_cards(f, area, app),
        ViewMode::Detail => {
            let lines = match app.selected_investor() {
                Some(inv) => card_lines(inv),
                None => vec![Line::from("没有选中的投资人")],
            };
            let title = if app.focus_area == FocusArea::MainView {
                "详细信息 (↑↓ 滚动, x 返回, ← 菜单)"
            } else {
                "详细信息"
            };
            let paragraph = Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .style(border_style(app.focus_area == FocusArea::MainView)),
                )
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll, 0));
            f.render_widget(paragraph, area);
        }
        ViewMode::Stats => render_stats(f, area, app),
        ViewMode::Sources => render_sources(f, area, app),
    }
}

fn focus_badges(inv: &InvestorDto) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (focus, color) in [
        (Focus::Ai, Color::Magenta),
        (Focus::Fintech, Color::Green),
        (Focus::Music, Color::LightBlue),
    ] {
        if focus.matches(inv) {
            spans.push(Span::styled(
                format!("[{}] ", focus.label()),
                Style::default().fg(color),
            ));
        }
    }
    spans
}

fn render_cards(f: &mut Frame, area: Rect, app: &mut App) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = app
        .investor_list
        .iter()
        .map(|inv| {
            let mut spans = vec![Span::styled(
                format!("{:<32}", inv.name),
                Style::default().fg(Color::White),
            )];
            spans.push(Span::styled(
                format!("{:<4}", inv.state.as_deref().unwrap_or("--")),
                Style::default().fg(Color::Cyan),
            ));
            spans.extend(focus_badges(inv));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut filters = Vec::new();
    if !app.filter_query.is_empty() {
        filters.push(format!("搜索: \"{}\"", app.filter_query));
    }
    if let Some(t) = &app.filter_type {
        filters.push(format!("类型: {}", t));
    }
    if let Some(focus) = app.filter_focus {
        filters.push(format!("关注: {}", focus.label()));
    }
    let filter_info = if filters.is_empty() {
        "全部".to_string()
    } else {
        filters.join(" | ")
    };
    let title = format!(
        "投资人 {}/{} [{}] (f 关注, r 刷新, Enter 详情)",
        app.investor_list.len(),
        app.investors_all.len(),
        filter_info
    );

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(border_style(app.focus_area == FocusArea::MainView)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    app.investor_list_state.select(Some(app.selected_index));
    f.render_stateful_widget(list, halves[0], &mut app.investor_list_state);

    let card = match app.selected_investor() {
        Some(inv) => card_lines(inv),
        None if app.refreshing => vec![Line::from("正在加载...")],
        None => vec![Line::from("没有符合条件的投资人")],
    };
    let paragraph = Paragraph::new(card)
        .block(Block::default().borders(Borders::ALL).title("卡片"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, halves[1]);
}

fn field_line(label: &str, value: Option<String>) -> Option<Line<'static>> {
    value.filter(|v| !v.is_empty()).map(|v| {
        Line::from(vec![
            Span::styled(
                format!("{}: ", label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(v),
        ])
    })
}

fn money(v: Option<f64>) -> Option<String> {
    v.map(|x| {
        if x >= 1e9 {
            format!("${:.1}B", x / 1e9)
        } else if x >= 1e6 {
            format!("${:.1}M", x / 1e6)
        } else {
            format!("${:.0}", x)
        }
    })
}

fn range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (money(min), money(max)) {
        (Some(a), Some(b)) => Some(format!("{} - {}", a, b)),
        (Some(a), None) => Some(format!("{}+", a)),
        (None, Some(b)) => Some(format!("≤ {}", b)),
        (None, None) => None,
    }
}

fn card_lines(inv: &InvestorDto) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        inv.name.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    let badges = focus_badges(inv);
    if !badges.is_empty() {
        lines.push(Line::from(badges));
    }
    lines.push(Line::from(""));

    let location = [inv.city.as_deref(), inv.state.as_deref(), inv.country.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let fields = [
        ("类型", inv.investor_type.clone()),
        ("CIK", inv.cik.clone()),
        ("地区", Some(location)),
        ("AUM", inv.aum_estimate.clone().or_else(|| range(inv.aum_min, inv.aum_max))),
        ("单笔", range(inv.check_size_min, inv.check_size_max)),
        ("阶段", inv.stage_preference.clone()),
        ("行业", inv.sectors.clone()),
        ("投资方向", inv.investment_focus.clone()),
        ("地域", inv.geography.clone()),
        ("代表项目", inv.notable_investments.clone()),
        ("决策人", inv.decision_makers.clone()),
        ("投资逻辑", inv.investment_thesis.clone()),
        ("近期动态", inv.recent_activity.clone()),
        ("网站", inv.website.clone()),
        ("邮箱", inv.contact_email.clone()),
        ("电话", inv.phone.clone()),
        ("LinkedIn", inv.linkedin_url.clone()),
        ("SEC", inv.sec_url.clone()),
        ("Crunchbase", inv.crunchbase_url.clone()),
    ];
    lines.extend(fields.into_iter().filter_map(|(l, v)| field_line(l, v)));

    lines.push(Line::from(""));
    let sources = if inv.data_sources.is_empty() {
        "-".to_string()
    } else {
        inv.data_sources.join(", ")
    };
    lines.push(Line::from(Span::styled(
        format!(
            "来源: {}  质量: {}  更新: {}",
            sources,
            inv.data_quality_score
                .map(|s| format!("{:.0}", s))
                .unwrap_or_else(|| "N/A".to_string()),
            inv.last_updated.as_deref().unwrap_or("-")
        ),
        Style::default().fg(Color::Gray),
    )));
    lines
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(
            "--- 目录概览 ---",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match &app.stats {
        None => lines.push(Line::from("暂无统计数据，按 r 刷新")),
        Some(stats) => {
            lines.push(Line::from(format!(
                "  投资人总数: {:>6}",
                stats.total_investors
            )));
            lines.push(Line::from(Span::styled(
                format!("  AI/ML     : {:>6}", stats.ai_investors),
                Style::default().fg(Color::Magenta),
            )));
            lines.push(Line::from(Span::styled(
                format!("  Fintech   : {:>6}", stats.fintech_investors),
                Style::default().fg(Color::Green),
            )));
            lines.push(Line::from(Span::styled(
                format!("  Music Tech: {:>6}", stats.music_investors),
                Style::default().fg(Color::LightBlue),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "--- 按类型 ---",
                Style::default().fg(Color::Yellow),
            )));
            for (t, n) in &stats.by_type {
                lines.push(Line::from(format!("  {:<28} {:>6}", t, n)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "--- 前十州 ---",
                Style::default().fg(Color::Yellow),
            )));
            for (s, n) in stats.top_states.iter() {
                lines.push(Line::from(format!("  {:<4} {:>6}", s, n)));
            }
        }
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("统计概览")
            .style(border_style(app.focus_area == FocusArea::MainView)),
    );
    f.render_widget(paragraph, area);
}

fn render_sources(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(
            "--- 数据来源 ---",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match &app.sources {
        None => lines.push(Line::from("正在加载...")),
        Some(overview) => {
            for src in &overview.available_sources {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<12}", src.id), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{:<32}", src.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("约 {}", src.estimated_records),
                        Style::default().fg(Color::Green),
                    ),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("            {}", src.description),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::from(""));
            let last = match &overview.last_scrape {
                Some(job) => format!(
                    "上次抓取: #{} {} {:?} ({} 条) {}",
                    job.id,
                    job.source,
                    job.status,
                    job.records_ingested,
                    job.finished_at.as_deref().unwrap_or("")
                ),
                None => "上次抓取: 无".to_string(),
            };
            lines.push(Line::from(last));
            lines.push(Line::from(format!(
                "下次计划: {}",
                overview.next_scheduled.as_deref().unwrap_or("未安排")
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "提示: 输入 /scrape <source> [limit] 提交抓取任务",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("数据来源")
            .style(border_style(app.focus_area == FocusArea::MainView)),
    );
    f.render_widget(paragraph, area);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }
        vec![
            Line::from(spans),
            Line::from("Enter执行 Esc取消 Tab补全 ←→光标 ↑↓历史"),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("命令: ", Style::default().fg(Color::Yellow)),
                Span::raw("(按 / 进入命令模式)"),
            ]),
            Line::from("/命令 r刷新 f关注 ←→切换 ↑↓导航 Enter/c确认 x返回 q退出"),
        ]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式"
            } else {
                "命令输入"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 最新的在顶部，最多 20 条
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
