use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};

use scorecast_terminal::combobox::Combobox;
use scorecast_terminal::config::AppConfig;
use scorecast_terminal::predict::{PredictionRequest, PredictionResponse};
use scorecast_terminal::provider;
use scorecast_terminal::state::{AppState, Delta, Field, ProviderCommand, Screen, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Form => self.on_form_key(key, now),
            Screen::Result => self.on_result_key(key),
        }
    }

    fn on_form_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(ch) => self.state.focused().push_char(ch, now),
            KeyCode::Backspace => self.state.focused().pop_char(now),
            KeyCode::Down => self.state.focused().cursor_down(),
            KeyCode::Up => self.state.focused().cursor_up(),
            KeyCode::Tab | KeyCode::BackTab => self.switch_field(now),
            KeyCode::Enter => {
                if self.state.focused().is_open() {
                    // No-op when the list is open without a cursored row.
                    if let Some(team) = self.state.focused().commit() {
                        self.state.push_log(format!(
                            "[INFO] Selected {} ({})",
                            team.name, team.country
                        ));
                    }
                } else {
                    self.submit();
                }
            }
            KeyCode::Esc => {
                if self.state.focused().is_open() {
                    self.state.focused().on_escape();
                } else {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    fn on_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Esc => {
                self.state.reset_flow();
                self.state.push_log("[INFO] Flow reset");
            }
            _ => {}
        }
    }

    fn switch_field(&mut self, now: Instant) {
        self.state.focused().on_tab();
        self.state.focused().on_focus_lost(now);
        self.state.focus = self.state.focus.other();
        self.state.focused().on_focus();
    }

    fn submit(&mut self) {
        if self.state.predicting {
            return;
        }
        let request = PredictionRequest::new(
            self.state.home.query(),
            self.state.away.query(),
            self.state.home.committed_logo().map(str::to_string),
            self.state.away.committed_logo().map(str::to_string),
        );
        let Some(request) = request else {
            self.state
                .push_log("[WARN] Both teams are required before predicting");
            return;
        };
        self.state.error = None;
        self.state.predicting = true;
        self.state.last_request = Some(request.clone());
        if self.cmd_tx.send(ProviderCommand::Predict(request)).is_err() {
            self.state.predicting = false;
            self.state.push_log("[ERROR] Prediction worker unavailable");
        }
    }

    /// Fires debounced lookups whose deadline has passed.
    fn poll_comboboxes(&mut self, now: Instant) {
        for field in [Field::Home, Field::Away] {
            if let Some(request) = self.state.field(field).poll(now) {
                let _ = self.cmd_tx.send(ProviderCommand::Search {
                    field,
                    seq: request.seq,
                    query: request.query,
                });
            }
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Missing GEMINI_API_KEY is fatal before the terminal is touched.
    let config = AppConfig::from_env()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(config, tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.state
        .push_log("[INFO] Pick two teams, Enter to predict");
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
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
    let tick_rate = Duration::from_millis(50);

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.poll_comboboxes(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key, Instant::now());
                }
            }
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
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Form => render_form(frame, chunks[1], &app.state),
        Screen::Result => render_result(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Form => "SCORECAST | AI match predictor",
        Screen::Result => "SCORECAST | Prediction",
    };
    format!("  ⚽ {title}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Form => {
            "Type to search | Tab Switch field | ↑/↓ Move | Enter Select/Predict | Esc Close/Quit"
                .to_string()
        }
        Screen::Result => "r/Esc New prediction | q Quit".to_string(),
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(5)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let status = Paragraph::new(status_text(state)).style(status_style(state));
    frame.render_widget(status, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_combobox(frame, columns[0], state, Field::Home);
    render_combobox(frame, columns[1], state, Field::Away);
}

fn status_text(state: &AppState) -> String {
    if state.predicting {
        return "Predicting... submit is disabled until the reply lands".to_string();
    }
    if let Some(error) = &state.error {
        return format!("Prediction failed: {error}");
    }
    "Pick a home and an away team, then press Enter".to_string()
}

fn status_style(state: &AppState) -> Style {
    if state.error.is_some() && !state.predicting {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_combobox(frame: &mut Frame, area: Rect, state: &AppState, field: Field) {
    let combobox = match field {
        Field::Home => &state.home,
        Field::Away => &state.away,
    };
    let focused = state.focus == field;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let mut title = field.label().to_string();
    if combobox.is_loading() {
        title.push_str(" (searching...)");
    }
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input_text = if focused {
        format!("{}▏", combobox.query())
    } else {
        combobox.query().to_string()
    };
    let input = Paragraph::new(input_text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(input, chunks[0]);

    render_suggestions(frame, chunks[1], combobox);
}

fn render_suggestions(frame: &mut Frame, area: Rect, combobox: &Combobox) {
    if !combobox.is_open() {
        if combobox.no_results() {
            let hint = Paragraph::new("No teams found. You can type any team name.")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, area);
        }
        return;
    }

    let visible = area.height as usize;
    for (i, team) in combobox.suggestions().iter().take(visible).enumerate() {
        let row = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        let selected = combobox.cursor() == i as isize;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let line = format!("{} {}  {}", team.logo, team.name, team.country);
        frame.render_widget(Paragraph::new(line).style(style), row);
    }
}

fn render_result(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(prediction) = &state.prediction else {
        let empty = Paragraph::new("No prediction yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(1),
        ])
        .split(area);

    let summary = Paragraph::new(summary_text(state, prediction))
        .block(Block::default().title("Match").borders(Borders::ALL));
    frame.render_widget(summary, chunks[0]);

    let chart_block = Block::default().title("Win / Draw / Away %").borders(Borders::ALL);
    let chart_area = chart_block.inner(chunks[1]);
    frame.render_widget(chart_block, chunks[1]);
    frame.render_widget(probability_chart(prediction), chart_area);

    let factors = Paragraph::new(factors_text(prediction))
        .block(Block::default().title("Key factors").borders(Borders::ALL));
    frame.render_widget(factors, chunks[2]);
}

fn summary_text(state: &AppState, prediction: &PredictionResponse) -> String {
    let (home, away, home_logo, away_logo) = match &state.last_request {
        Some(req) => (
            req.home_team.as_str(),
            req.away_team.as_str(),
            req.home_team_logo.as_deref().unwrap_or(""),
            req.away_team_logo.as_deref().unwrap_or(""),
        ),
        None => ("Home", "Away", "", ""),
    };
    let matchup = format!("{home_logo} {home}  vs  {away} {away_logo}");
    format!(
        "{}\nPredicted score: {} - {}\nWinner: {}\nConfidence: {}",
        matchup.trim(),
        prediction.predicted_home,
        prediction.predicted_away,
        prediction.winner.label(),
        prediction.confidence.label(),
    )
}

fn probability_chart(prediction: &PredictionResponse) -> BarChart<'static> {
    let probs = &prediction.probabilities;
    let home = Bar::default()
        .value(probs.home.round() as u64)
        .text_value(format!("H {:.0}%", probs.home))
        .style(Style::default().fg(Color::Green));
    let draw = Bar::default()
        .value(probs.draw.round() as u64)
        .text_value(format!("D {:.0}%", probs.draw))
        .style(Style::default().fg(Color::Yellow));
    let away = Bar::default()
        .value(probs.away.round() as u64)
        .text_value(format!("A {:.0}%", probs.away))
        .style(Style::default().fg(Color::Red));

    BarChart::default()
        .data(BarGroup::default().bars(&[home, draw, away]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100)
}

fn factors_text(prediction: &PredictionResponse) -> String {
    prediction
        .key_factors
        .iter()
        .enumerate()
        .map(|(i, factor)| format!("{}. {}", i + 1, factor))
        .collect::<Vec<_>>()
        .join("\n")
}
