use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use brasileirao_terminal::analysis::{DimensionBreakdown, OutcomePercentages};
use brasileirao_terminal::cache::DatasetCache;
use brasileirao_terminal::config;
use brasileirao_terminal::demo;
use brasileirao_terminal::export;
use brasileirao_terminal::outcome::Outcome;
use brasileirao_terminal::provider;
use brasileirao_terminal::state::{
    AppState, Delta, ProviderCommand, Screen, TeamStats, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(
        dataset: Arc<brasileirao_terminal::dataset::Dataset>,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        Self {
            state: AppState::new(dataset),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('j') | KeyCode::Down => match self.state.screen {
                Screen::Matches => self.state.scroll_matches_down(),
                Screen::Overview => self.state.select_next(),
                Screen::Team => {
                    self.state.select_next();
                    self.state.open_team();
                }
            },
            KeyCode::Char('k') | KeyCode::Up => match self.state.screen {
                Screen::Matches => self.state.scroll_matches_up(),
                Screen::Overview => self.state.select_prev(),
                Screen::Team => {
                    self.state.select_prev();
                    self.state.open_team();
                }
            },
            KeyCode::Char('d') | KeyCode::Enter => {
                if self.state.screen == Screen::Overview {
                    self.state.open_team();
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.back_to_overview(),
            KeyCode::Char('m') => self.state.open_matches(),
            KeyCode::Char('r') => self.request_reload(),
            KeyCode::Char('e') => self.run_export(),
            _ => {}
        }
    }

    fn request_reload(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state
                .push_log("[INFO] Demo dataset is in-memory; nothing to reload");
            return;
        };
        if tx.send(ProviderCommand::ReloadDataset).is_err() {
            self.state.push_log("[WARN] Reload request failed");
        } else {
            self.state.push_log("[INFO] Reload requested");
        }
    }

    fn run_export(&mut self) {
        let path = config::app_config().export_path.clone();
        match export::export_report(&path, &self.state.dataset) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} matches, {} clubs to {}",
                report.matches,
                report.teams,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = config::app_config();

    // Load before the terminal goes raw; a missing dataset is fatal here.
    let (initial, watcher) = if config.demo {
        (Arc::new(demo::demo_dataset(demo::DEFAULT_SEED)), None)
    } else {
        let cache = DatasetCache::load(&config.csv_path).with_context(|| {
            format!(
                "cannot start without dataset {} (set BRASILEIRAO_CSV, or BRASILEIRAO_DEMO=1 for synthetic data)",
                config.csv_path.display()
            )
        })?;
        let snapshot = cache.snapshot();
        (snapshot, Some(cache))
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let cmd_tx = match watcher {
        Some(cache) => {
            provider::spawn_dataset_provider(
                cache,
                tx,
                cmd_rx,
                Duration::from_secs(config.poll_secs),
            );
            Some(cmd_tx)
        }
        None => None,
    };

    let mut app = App::new(initial, cmd_tx);
    let report = app.state.dataset.report.clone();
    app.state.push_log(format!(
        "[INFO] Dataset ready: {} matches ({} rows rejected)",
        app.state.dataset.matches.len(),
        report.rows_rejected
    ));
    for warning in report.warnings.iter().take(3) {
        app.state.push_log(format!("[WARN] {warning}"));
    }

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Overview => render_overview(frame, chunks[1], &app.state),
        Screen::Team => render_team(frame, chunks[1], &app.state),
        Screen::Matches => render_matches(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Overview => format!(
            "BRASILEIRAO TERMINAL | {} matches | {} clubs",
            state.overview.totals.matches,
            state.teams.len()
        ),
        Screen::Team => {
            let team = state
                .team_view
                .as_ref()
                .map(|view| view.team.as_str())
                .unwrap_or("-");
            format!("BRASILEIRAO TERMINAL | {team}")
        }
        Screen::Matches => {
            let scope = match &state.matches_team {
                Some(team) => format!("{team} matches"),
                None => "Match list".to_string(),
            };
            format!(
                "BRASILEIRAO TERMINAL | {scope} ({})",
                state.visible_matches().len()
            )
        }
    };
    let line1 = format!("  ,--.  {}", title);
    let line2 = " ( () )".to_string();
    let line3 = "  `--'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Overview => {
            "j/k/↑/↓ Club | Enter/d Open club | m Matches | r Reload | e Export | ? Help | q Quit"
                .to_string()
        }
        Screen::Team => {
            "j/k Cycle club | b/Esc Overview | m Matches | e Export | ? Help | q Quit".to_string()
        }
        Screen::Matches => "j/k/↑/↓ Scroll | b/Esc Back | e Export | ? Help | q Quit".to_string(),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(40)])
        .split(area);

    render_club_picker(frame, columns[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Min(12),
            Constraint::Length(5),
        ])
        .split(columns[1]);

    render_league_metrics(frame, right[0], state);
    render_top_winners(frame, right[1], state);
    render_dimension_grid(frame, right[2], &state.overview.dimensions);
    render_console(frame, right[3], state);
}

fn render_club_picker(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Clubs").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.teams.is_empty() {
        let empty = Paragraph::new("No clubs loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height == 0 {
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.selected, state.teams.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let selected = idx == state.selected;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let marker = if selected { ">" } else { " " };
        let row = Paragraph::new(format!("{marker} {}", state.teams[idx])).style(style);
        frame.render_widget(row, row_area);
    }
}

fn render_league_metrics(frame: &mut Frame, area: Rect, state: &AppState) {
    let totals = &state.overview.totals;
    let goals_per_match = totals
        .goals_per_match()
        .map(|avg| format!("{avg:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let span = match (totals.first_date, totals.last_date) {
        (Some(first), Some(last)) => format!(
            "{} .. {}",
            first.format("%d/%m/%Y"),
            last.format("%d/%m/%Y")
        ),
        _ => "no dates".to_string(),
    };
    let text = format!(
        "Matches {} | Goals {} | Goals/match {}\nSpan {} | Rows rejected {}",
        totals.matches, totals.goals, goals_per_match, span, state.dataset.report.rows_rejected
    );
    let metrics =
        Paragraph::new(text).block(Block::default().title("League").borders(Borders::ALL));
    frame.render_widget(metrics, area);
}

fn render_top_winners(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<String> = if state.overview.top_winners.is_empty() {
        vec!["No wins recorded".to_string()]
    } else {
        state
            .overview
            .top_winners
            .iter()
            .enumerate()
            .map(|(idx, winner)| format!("{}. {:<18} {:>3}", idx + 1, winner.team, winner.wins))
            .collect()
    };
    let winners = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Most wins").borders(Borders::ALL));
    frame.render_widget(winners, area);
}

fn render_dimension_grid(frame: &mut Frame, area: Rect, dimensions: &[DimensionBreakdown]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    for (row_idx, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row_area);
        for (col_idx, cell) in cells.iter().enumerate() {
            if let Some(entry) = dimensions.get(row_idx * 2 + col_idx) {
                render_dimension_panel(frame, *cell, entry);
            }
        }
    }
}

fn render_dimension_panel(frame: &mut Frame, area: Rect, entry: &DimensionBreakdown) {
    let block = Block::default().title(entry.title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let Some(pct) = entry.breakdown.percentages() else {
        let empty =
            Paragraph::new("Insufficient data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let summary = format!(
        "W {:.1}%  D {:.1}%  L {:.1}%  ({} matches)",
        pct.win, pct.draw, pct.loss, entry.breakdown.population
    );
    frame.render_widget(Paragraph::new(summary), parts[0]);
    frame.render_widget(outcome_bar_chart(&pct), parts[1]);
}

fn outcome_bar_chart(pct: &OutcomePercentages) -> BarChart<'static> {
    let win = Bar::default()
        .value(pct.win.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Green));
    let draw = Bar::default()
        .value(pct.draw.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Yellow));
    let loss = Bar::default()
        .value(pct.loss.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Red));

    BarChart::default()
        .data(BarGroup::default().bars(&[win, draw, loss]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100)
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let console = Paragraph::new(console_text(state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_team(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(view) = &state.team_view else {
        let empty =
            Paragraph::new("No club selected").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(area);

    render_team_summary(frame, rows[0], view);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(40)])
        .split(rows[1]);

    render_home_away_table(frame, columns[0], view);
    render_dimension_grid(frame, columns[1], &view.dimensions);

    render_console(frame, rows[2], state);
}

fn render_team_summary(frame: &mut Frame, area: Rect, view: &TeamStats) {
    let summary = &view.summary;
    let win_rate = summary
        .percentage(Outcome::Win)
        .map(|pct| format!("{pct:.1}%"))
        .unwrap_or_else(|| "-".to_string());
    let text = format!(
        "Played {} | W {} D {} L {} | Win rate {}",
        summary.population, summary.wins, summary.draws, summary.losses, win_rate
    );
    let block = Block::default()
        .title(view.team.as_str())
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_home_away_table(frame: &mut Frame, area: Rect, view: &TeamStats) {
    let mut lines = vec![format!("{:<8} {:>5} {:>5}", "Outcome", "Home", "Away")];
    for row in &view.split.rows {
        lines.push(format!(
            "{:<8} {:>5} {:>5}",
            row.outcome.label(),
            row.home,
            row.away
        ));
    }
    let table = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Home/Away").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = match_columns();
    render_match_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let matches = state.visible_matches();
    if matches.is_empty() {
        let empty =
            Paragraph::new("No matches loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let total = matches.len();
    let max_start = total.saturating_sub(visible);
    let start = (state.matches_scroll as usize).min(max_start);
    let end = (start + visible).min(total);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let record = matches[idx];
        let round = record
            .round
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let date = record
            .date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        let score = format!("{}-{}", record.home_score, record.away_score);
        let possession = pair_text(record.home_possession, record.away_possession, "%");
        let shots = pair_text(record.home_shots, record.away_shots, "");
        let on_target = pair_text(
            record.home_shots_on_target,
            record.away_shots_on_target,
            "",
        );

        let sep_style = Style::default().fg(Color::DarkGray);
        render_cell_text(frame, cols[0], &round, Style::default());
        render_cell_text(frame, cols[1], &date, Style::default());
        render_vseparator(frame, cols[2], sep_style);
        render_cell_text(frame, cols[3], &record.home, Style::default());
        render_cell_text(frame, cols[4], &score, Style::default());
        render_cell_text(frame, cols[5], &record.away, Style::default());
        render_vseparator(frame, cols[6], sep_style);
        render_cell_text(frame, cols[7], &record.winner, Style::default());
        render_cell_text(frame, cols[8], &possession, Style::default());
        render_cell_text(frame, cols[9], &shots, Style::default());
        render_cell_text(frame, cols[10], &on_target, Style::default());
    }
}

fn match_columns() -> [Constraint; 11] {
    [
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(1),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(1),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Min(8),
    ]
}

fn render_match_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Rd", style);
    render_cell_text(frame, cols[1], "Date", style);
    render_cell_text(frame, cols[3], "Home", style);
    render_cell_text(frame, cols[4], "Score", style);
    render_cell_text(frame, cols[5], "Away", style);
    render_cell_text(frame, cols[7], "Winner", style);
    render_cell_text(frame, cols[8], "Poss", style);
    render_cell_text(frame, cols[9], "Shots", style);
    render_cell_text(frame, cols[10], "On tgt", style);
}

fn pair_text(home: Option<f64>, away: Option<f64>, suffix: &str) -> String {
    match (home, away) {
        (Some(h), Some(a)) => format!("{h:.0}{suffix}-{a:.0}{suffix}"),
        _ => "-".to_string(),
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn render_vseparator(frame: &mut Frame, area: Rect, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let mut text = String::new();
    for i in 0..area.height {
        if i > 0 {
            text.push('\n');
        }
        text.push('│');
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Brasileirao Terminal - Help",
        "",
        "Global:",
        "  j/k or ↑/↓   Move / scroll",
        "  Enter / d    Open selected club",
        "  b / Esc      Back to overview",
        "  m            Match list",
        "  r            Reload dataset",
        "  e            Export workbook",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Each chart panel counts only the matches where",
        "its statistic picks a side; ties and missing",
        "numbers leave that match out of the panel.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
