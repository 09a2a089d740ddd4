use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

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
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use npl_admin::api::HttpApi;
use npl_admin::config::Config;
use npl_admin::leaderboard::LeaderboardScope;
use npl_admin::matches::MatchFormFocus;
use npl_admin::players::{PlayerField, PlayersMode};
use npl_admin::state::{AppState, Command, Delta, Notice, NoticeKind, Screen, apply_delta};
use npl_admin::stats_editor::{EditorPhase, StatField};
use npl_admin::worker::spawn_worker;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<Command>,
}

impl App {
    fn new(state: AppState, cmd_tx: mpsc::Sender<Command>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn dispatch(&mut self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Network worker is gone; request dropped");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.notice = None;
            }
            return;
        }
        if self.state.matches.pending_calculate.is_some() {
            let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            if let Some(cmd) = self.state.confirm_calculate(confirmed) {
                self.dispatch(cmd);
            }
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.in_text_entry() {
            self.on_text_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('1') => self.state.screen = Screen::Matches,
            KeyCode::Char('2') => self.state.screen = Screen::Players,
            KeyCode::Char('3') => {
                let cmd = self.state.open_leaderboard();
                self.dispatch(cmd);
            }
            _ => match self.state.screen {
                Screen::Matches => self.on_matches_key(key),
                Screen::Squad => self.on_squad_key(key),
                Screen::Stats => self.on_stats_key(key),
                Screen::Players => self.on_players_key(key),
                Screen::Leaderboard => self.on_leaderboard_key(key),
            },
        }
    }

    fn in_text_entry(&self) -> bool {
        match self.state.screen {
            Screen::Matches => self.state.matches.form_active,
            Screen::Stats => self.state.stats.cursor.is_editing(),
            Screen::Players => self.state.players.mode != PlayersMode::Browse,
            Screen::Squad | Screen::Leaderboard => false,
        }
    }

    fn on_text_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Matches => self.on_match_form_key(key),
            Screen::Stats => self.on_stats_input_key(key),
            Screen::Players => self.on_player_panel_key(key),
            Screen::Squad | Screen::Leaderboard => {}
        }
    }

    fn on_matches_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.matches.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.matches.move_selection(-1),
            KeyCode::Char('r') => {
                self.state.matches.loading = true;
                self.dispatch(Command::LoadMatches);
                self.dispatch(Command::LoadTeams);
            }
            KeyCode::Char('a') => {
                let teams = self.state.matches.teams.clone();
                self.state.matches.form.reset(&teams);
                self.state.matches.form_active = true;
            }
            KeyCode::Char('e') => {
                if let Some(row) = self.state.matches.selected_match().cloned() {
                    self.state.matches.form.start_edit(&row);
                    self.state.matches.form_active = true;
                }
            }
            KeyCode::Char('x') => {
                if let Some(cmd) = self.state.delete_selected_match() {
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('c') => {
                self.state.request_calculate();
            }
            KeyCode::Char('p') => {
                if let Some(id) = self.state.matches.selected_match().map(|m| m.id) {
                    let cmd = self.state.open_squad(id);
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if let Some(id) = self.state.matches.selected_match().map(|m| m.id) {
                    let cmd = self.state.open_stats(id);
                    self.dispatch(cmd);
                }
            }
            _ => {}
        }
    }

    fn on_match_form_key(&mut self, key: KeyEvent) {
        let matches = &mut self.state.matches;
        let date_focused = matches.form.focus == MatchFormFocus::Date;
        match key.code {
            KeyCode::Esc => matches.cancel_form(),
            KeyCode::Tab => matches.form.focus = matches.form.focus.next(),
            KeyCode::Left => matches.form.cycle_team(&matches.teams, -1),
            KeyCode::Right => matches.form.cycle_team(&matches.teams, 1),
            KeyCode::Backspace if date_focused => {
                matches.form.date.pop();
            }
            KeyCode::Char(c) if date_focused => matches.form.date.push(c),
            KeyCode::Enter => match self.state.submit_match_form() {
                Ok(cmd) => self.dispatch(cmd),
                Err(err) => self.state.notice = Some(Notice::error("Match form", err.to_string())),
            },
            _ => {}
        }
    }

    fn on_squad_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.squad.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.squad.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.state.squad.toggle_at_cursor();
            }
            KeyCode::Char('s') => match self.state.save_squad() {
                Some(cmd) => self.dispatch(cmd),
                None => self.state.push_log("[INFO] Squad is still loading"),
            },
            KeyCode::Char('r') => {
                if let Some(id) = self.state.squad.match_id() {
                    let cmd = self.state.open_squad(id);
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Matches,
            _ => {}
        }
    }

    fn on_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.stats.move_row(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.stats.move_row(-1),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.state.stats.move_field(-1)
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.state.stats.move_field(1),
            KeyCode::Enter | KeyCode::Char('e') => {
                self.state.stats.begin_cell_edit();
            }
            KeyCode::Char('s') => match self.state.save_stats() {
                Ok(cmd) => self.dispatch(cmd),
                Err(err) => self.state.push_log(format!("[WARN] {err}")),
            },
            KeyCode::Char('r') => {
                if let Some(cmd) = self.state.retry_stats() {
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Matches,
            _ => {}
        }
    }

    fn on_stats_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.stats.cursor.input = None,
            KeyCode::Backspace => {
                if let Some(input) = self.state.stats.cursor.input.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.state.stats.cursor.input.as_mut() {
                    input.push(c);
                }
            }
            KeyCode::Enter | KeyCode::Tab => {
                if let Err(err) = self.state.stats.commit_cell_edit() {
                    self.state.push_log(format!("[WARN] {err}"));
                } else if key.code == KeyCode::Tab {
                    self.state.stats.move_field(1);
                }
            }
            _ => {}
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.players.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.players.move_selection(-1),
            KeyCode::Char('f') => self.state.players.open_filter(),
            KeyCode::Char('a') => self.state.players.open_form(false),
            KeyCode::Char('e') => self.state.players.open_form(true),
            KeyCode::Char('x') => {
                if let Some(cmd) = self.state.delete_selected_player() {
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('r') => {
                let cmd = self.state.apply_player_filter();
                self.dispatch(cmd);
            }
            _ => {}
        }
    }

    fn on_player_panel_key(&mut self, key: KeyEvent) {
        let players = &mut self.state.players;
        match key.code {
            KeyCode::Esc => players.close_panel(),
            KeyCode::Tab | KeyCode::Down => players.cycle_focus(1),
            KeyCode::BackTab | KeyCode::Up => players.cycle_focus(-1),
            KeyCode::Left if players.focus.is_picker() => players.cycle_picker(-1),
            KeyCode::Right if players.focus.is_picker() => players.cycle_picker(1),
            KeyCode::Backspace => {
                if let Some(text) = players.focused_text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = players.focused_text_mut() {
                    text.push(c);
                }
            }
            KeyCode::Enter => {
                if players.mode == PlayersMode::Filter {
                    let cmd = self.state.apply_player_filter();
                    self.dispatch(cmd);
                    return;
                }
                match self.state.submit_player_form() {
                    Ok(cmd) => self.dispatch(cmd),
                    Err(err) => {
                        self.state.notice = Some(Notice::error("Player form", err.to_string()))
                    }
                }
            }
            _ => {}
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        let cmd = match key.code {
            KeyCode::Char('h') | KeyCode::Left => Some(self.state.cycle_leaderboard_scope(-1)),
            KeyCode::Char('l') | KeyCode::Right => Some(self.state.cycle_leaderboard_scope(1)),
            KeyCode::Char('n') => self.state.leaderboard.next_page().map(Command::LoadLeaderboard),
            KeyCode::Char('p') => self.state.leaderboard.prev_page().map(Command::LoadLeaderboard),
            KeyCode::Char('r') => Some(Command::LoadLeaderboard(
                self.state.leaderboard.begin_load(),
            )),
            KeyCode::Char('b') | KeyCode::Esc => {
                self.state.screen = Screen::Matches;
                None
            }
            _ => None,
        };
        if let Some(cmd) = cmd {
            self.dispatch(cmd);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let api = Arc::new(HttpApi::from_config(&config)?);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_worker(api, tx, cmd_rx);

    let mut state = AppState::with_leaderboard_page(config.leaderboard_page);
    state.push_log(format!("[INFO] Backend {}", config.api_base));
    let startup = state.initial_commands();
    let mut app = App::new(state, cmd_tx);
    for cmd in startup {
        app.dispatch(cmd);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

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
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Matches => render_matches(frame, chunks[1], &app.state),
        Screen::Squad => render_squad(frame, chunks[1], &app.state),
        Screen::Stats => render_stats(frame, chunks[1], &app.state),
        Screen::Players => render_players(frame, chunks[1], &app.state),
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(app)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
    if let Some(id) = app.state.matches.pending_calculate {
        render_popup(
            frame,
            "Confirm",
            &format!("Calculate results for match {id}?\n\ny Yes   any other key No"),
            Color::Yellow,
        );
    }
    if let Some(notice) = &app.state.notice {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        let body = format!("{}\n\nEnter to dismiss", notice.body);
        render_popup(frame, &notice.title, &body, color);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Matches => "NPL ADMIN | Matches".to_string(),
        Screen::Squad => match state.squad.info() {
            Some(info) => format!(
                "NPL ADMIN | Squad | {} vs {}",
                info.team1_name, info.team2_name
            ),
            None => "NPL ADMIN | Squad".to_string(),
        },
        Screen::Stats => match state.stats.match_id() {
            Some(id) => format!("NPL ADMIN | Enter / Edit Player Stats | Match {id}"),
            None => "NPL ADMIN | Player Stats".to_string(),
        },
        Screen::Players => "NPL ADMIN | Players".to_string(),
        Screen::Leaderboard => format!("NPL ADMIN | {}", state.leaderboard.title()),
    };
    let line1 = format!("   _   {title}");
    let line2 = "  (_)  fantasy cricket".to_string();
    let line3 = "  /|\\".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(app: &App) -> String {
    let state = &app.state;
    match state.screen {
        Screen::Matches if state.matches.form_active => {
            "Tab Field | ←/→ Team | Enter Save | Esc Cancel".to_string()
        }
        Screen::Matches => {
            "j/k Move | a Add | e Edit | x Delete | p Squad | s/Enter Stats | c Calculate | r Reload | 2 Players | 3 Leaderboard | ? Help | q Quit".to_string()
        }
        Screen::Squad => "j/k Move | Space Toggle | s Save | r Reload | b Back | q Quit".to_string(),
        Screen::Stats if state.stats.cursor.is_editing() => {
            "Type value | Enter Apply | Tab Apply+Next | Esc Cancel".to_string()
        }
        Screen::Stats => {
            "↑/↓ Row | ←/→ Field | Enter Edit | s Save | r Reload | b Back | q Quit".to_string()
        }
        Screen::Players if state.players.mode != PlayersMode::Browse => {
            "Tab Field | ←/→ Pick | Enter Apply | Esc Close".to_string()
        }
        Screen::Players => {
            "j/k Move | f Filter | a Add | e Edit | x Delete | r Reload | 1 Matches | q Quit"
                .to_string()
        }
        Screen::Leaderboard => {
            "←/→ Match | n/p Page | r Reload | b Back | q Quit".to_string()
        }
    }
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let matches = &state.matches;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let form = &matches.form;
    let focus_style = |focus: MatchFormFocus| {
        if matches.form_active && form.focus == focus {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        }
    };
    let date = if form.date.is_empty() {
        "YYYY-MM-DD".to_string()
    } else {
        form.date.clone()
    };
    let action = if form.is_editing() { "Update" } else { "Add" };
    let line = Line::from(vec![
        Span::raw("Date "),
        Span::styled(format!("[{date}]"), focus_style(MatchFormFocus::Date)),
        Span::raw("  Team 1 "),
        Span::styled(
            format!("[{}]", matches.team_name(form.team1)),
            focus_style(MatchFormFocus::Team1),
        ),
        Span::raw("  Team 2 "),
        Span::styled(
            format!("[{}]", matches.team_name(form.team2)),
            focus_style(MatchFormFocus::Team2),
        ),
        Span::raw(format!("  <{action}>")),
    ]);
    let form_title = if matches.form_active {
        "Match form"
    } else {
        "Match form (a to add, e to edit)"
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().title(form_title).borders(Borders::ALL)),
        sections[0],
    );

    let block = Block::default().title("Matches").borders(Borders::ALL);
    if matches.matches.is_empty() {
        let msg = if matches.loading {
            "Loading matches..."
        } else {
            "No matches yet"
        };
        frame.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            sections[1],
        );
        return;
    }

    let visible = sections[1].height.saturating_sub(2) as usize;
    let (start, end) = visible_range(matches.selected, matches.matches.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let m = &matches.matches[idx];
            let text = format!(" {:>4}  {}", m.id, m.label());
            if idx == matches.selected {
                Line::styled(text, Style::default().fg(Color::White).bg(Color::DarkGray))
            } else {
                Line::raw(text)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), sections[1]);
}

fn render_squad(frame: &mut Frame, area: Rect, state: &AppState) {
    let squad = &state.squad;
    let block = Block::default()
        .title(format!("Squad ({} playing)", squad.selected_count()))
        .borders(Borders::ALL);

    if !squad.is_loaded() {
        let msg = match squad.load_error() {
            Some(err) => format!("Loading...\n\nLast attempt failed: {err}\nPress r to retry."),
            None => "Loading...".to_string(),
        };
        frame.render_widget(Paragraph::new(msg).block(block), area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(squad.cursor, squad.players().len(), visible);
    let rows: Vec<Row> = (start..end)
        .map(|idx| {
            let p = &squad.players()[idx];
            let mark = if squad.is_selected(&p.player_id) {
                "[x]"
            } else {
                "[ ]"
            };
            let row = Row::new(vec![
                Cell::from(p.player_name.clone()),
                Cell::from(p.team_name.clone()),
                Cell::from(mark),
            ]);
            if idx == squad.cursor {
                row.style(Style::default().fg(Color::White).bg(Color::DarkGray))
            } else {
                row
            }
        })
        .collect();
    let header = Row::new(vec!["Player", "Team", "Playing"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Min(16),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let stats = &state.stats;
    let mut title = if stats.saves_in_flight() > 0 {
        "Player Stats (saving...)".to_string()
    } else {
        "Player Stats".to_string()
    };
    if let Some(hint) = stats.reload_hint() {
        title = format!("{title} | {hint}");
    }
    let block = Block::default().title(title).borders(Borders::ALL);

    if stats.phase() == EditorPhase::Loading {
        let msg = match stats.load_error() {
            Some(err) => format!(
                "Loading players...\n\nLast attempt failed: {err}\nPress r to retry."
            ),
            None => "Loading players...".to_string(),
        };
        frame.render_widget(
            Paragraph::new(msg).wrap(Wrap { trim: true }).block(block),
            area,
        );
        return;
    }

    if stats.records().is_empty() {
        frame.render_widget(
            Paragraph::new("No playing players for this match. Pick the squad first.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let cursor = &stats.cursor;
    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(cursor.row, stats.records().len(), visible);
    let rows: Vec<Row> = (start..end)
        .map(|idx| {
            let record = &stats.records()[idx];
            let mut cells = vec![
                Cell::from(record.player_name.clone()),
                Cell::from(record.team_name.clone()),
            ];
            for field in StatField::ALL {
                let selected = idx == cursor.row && field == cursor.field;
                let cell = match (&cursor.input, selected) {
                    (Some(input), true) => Cell::from(format!("{input}_"))
                        .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                    (None, true) => Cell::from(record.get(field).to_string())
                        .style(Style::default().fg(Color::Black).bg(Color::Cyan)),
                    _ => Cell::from(record.get(field).to_string()),
                };
                cells.push(cell);
            }
            let row = Row::new(cells);
            if idx == cursor.row {
                row.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                row
            }
        })
        .collect();

    let mut header_cells = vec![Cell::from("Player"), Cell::from("Team")];
    header_cells.extend(StatField::ALL.iter().map(|f| Cell::from(f.label())));
    let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

    let mut widths = vec![Constraint::Min(18), Constraint::Min(12)];
    widths.extend(StatField::ALL.iter().map(|_| Constraint::Length(9)));
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let players = &state.players;
    let panel_height = if players.mode == PlayersMode::Browse {
        0
    } else {
        7
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(panel_height), Constraint::Min(1)])
        .split(area);

    if players.mode != PlayersMode::Browse {
        let (title, fields): (&str, &[PlayerField]) = match players.mode {
            PlayersMode::Filter => ("Filter players", &PlayerField::FILTERS),
            _ if players.form.is_editing() => ("Edit player", &PlayerField::FORM),
            _ => ("Add player", &PlayerField::FORM),
        };
        let lines: Vec<Line> = fields
            .iter()
            .map(|field| {
                let style = if *field == players.focus {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{:<10} ", field.label())),
                    Span::styled(format!("[{}]", players.field_display(*field)), style),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
            sections[0],
        );
    }

    let block = Block::default().title("Players").borders(Borders::ALL);
    if players.players.is_empty() {
        let msg = if players.loading {
            "Loading players..."
        } else {
            "No players match"
        };
        frame.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            sections[1],
        );
        return;
    }

    let visible = sections[1].height.saturating_sub(2) as usize;
    let (start, end) = visible_range(players.selected, players.players.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let p = &players.players[idx];
            let text = format!(" {:<8} {}", p.player_id, p.label());
            if idx == players.selected {
                Line::styled(text, Style::default().fg(Color::White).bg(Color::DarkGray))
            } else {
                Line::raw(text)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), sections[1]);
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let board = &state.leaderboard;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    let mut filter_lines = vec![scope_line(
        "All Matches",
        board.scope() == LeaderboardScope::Overall,
    )];
    for m in &state.matches.matches {
        filter_lines.push(scope_line(
            &m.teams,
            board.scope() == LeaderboardScope::Match(m.id),
        ));
    }
    frame.render_widget(
        Paragraph::new(filter_lines)
            .block(Block::default().title("Filter by Match").borders(Borders::ALL)),
        columns[0],
    );

    let block = Block::default()
        .title(format!("{} (from #{})", board.title(), board.offset() + 1))
        .borders(Borders::ALL);
    if board.is_loading() {
        frame.render_widget(Paragraph::new("Loading leaderboard...").block(block), columns[1]);
        return;
    }
    if board.rows().is_empty() {
        let msg = board
            .load_error()
            .map(|err| format!("No data available\n\n{err}"))
            .unwrap_or_else(|| "No data available".to_string());
        frame.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            columns[1],
        );
        return;
    }

    let rows: Vec<Row> = board
        .rows()
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(format!("#{}", row.rank)),
                Cell::from(row.username.clone()),
                Cell::from(Line::from(row.points_label()).alignment(Alignment::Right)),
            ])
        })
        .collect();
    let header =
        Row::new(vec!["Rank", "User", "Points"]).style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, columns[1]);
}

fn scope_line(label: &str, active: bool) -> Line<'static> {
    if active {
        Line::styled(
            format!("> {label}"),
            Style::default().add_modifier(Modifier::BOLD),
        )
    } else {
        Line::raw(format!("  {label}"))
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
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

fn render_popup(frame: &mut Frame, title: &str, body: &str, color: Color) {
    let popup_area = centered_rect(50, 30, frame.size());
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(body.to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NPL Admin - Help",
        "",
        "Global:",
        "  1            Matches",
        "  2            Players",
        "  3            Leaderboard",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Matches:",
        "  a / e / x    Add, edit, delete",
        "  p            Squad for selected match",
        "  s / Enter    Stats for selected match",
        "  c            Calculate results",
        "",
        "Stats:",
        "  arrows       Move between cells",
        "  Enter / e    Edit cell (blank = 0)",
        "  s            Save every row",
        "  r            Reload / retry",
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
