//! Interactive terminal quiz

use anyhow::Result;
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::quiz::QuizEnv;
use crate::catalog::Rgb;
use crate::export::{
    share, ArtifactExporter, ExportError, Osc52Clipboard, ShareOutcome, SharePayload,
};
use crate::reporters::ResultReport;
use crate::session::{Effect, Event, SessionDriver, Stage};

/// Upper bound on how long the loop sleeps waiting for input
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Poll interval while an export is running
const EXPORT_POLL: Duration = Duration::from_millis(50);

/// Option keys: 1-9 and a-i both pick the n-th option
const OPTION_KEYS: [char; 9] = ['1', '2', '3', '4', '5', '6', '7', '8', '9'];
const OPTION_LETTERS: [char; 9] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i'];

type ExportResult = Result<PathBuf, ExportError>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    text: String,
    is_error: bool,
}

pub struct App {
    env: QuizEnv,
    driver: SessionDriver,
    name_input: String,
    commitment_input: String,
    option_state: ListState,
    scroll: u16,
    notice: Option<Notice>,
    exporter: Arc<ArtifactExporter>,
    runtime: Option<tokio::runtime::Runtime>,
    export_rx: Option<mpsc::Receiver<ExportResult>>,
    ticks: u64,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(env: QuizEnv) -> Self {
        let driver = SessionDriver::new(env.new_session());
        let exporter = Arc::new(ArtifactExporter::with_options(env.config.raster_options()));
        let mut option_state = ListState::default();
        option_state.select(Some(0));
        Self {
            env,
            driver,
            name_input: String::new(),
            commitment_input: String::new(),
            option_state,
            scroll: 0,
            notice: None,
            exporter,
            runtime: None,
            export_rx: None,
            ticks: 0,
            should_quit: false,
        }
    }

    fn stage(&self) -> Stage {
        self.driver.session().stage()
    }

    /// Apply a session event, surfacing rejections in the footer
    fn dispatch(&mut self, event: Event) {
        match self.driver.dispatch(event) {
            Ok(effects) => {
                self.notice = None;
                self.handle_effects(effects);
            }
            Err(e) => self.error(e.to_string()),
        }
        self.sync_highlight();
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if effect == Effect::ResetView {
                self.scroll = 0;
            }
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
        });
    }

    /// Point the option highlight at the current answer, if any
    fn sync_highlight(&mut self) {
        let session = self.driver.session();
        if session.stage() != Stage::Quiz {
            return;
        }
        let answered = session.current_answer().and_then(|answer| {
            self.env
                .catalog
                .question(session.cursor())?
                .options
                .iter()
                .position(|o| o.brain_type == answer)
        });
        self.option_state.select(Some(answered.unwrap_or(0)));
    }

    fn option_count(&self) -> usize {
        self.env
            .catalog
            .question(self.driver.session().cursor())
            .map_or(0, |q| q.options.len())
    }

    fn select_option(&mut self, index: usize) {
        let Some(brain_type) = self
            .env
            .catalog
            .question(self.driver.session().cursor())
            .and_then(|q| q.options.get(index))
            .map(|o| o.brain_type)
        else {
            return;
        };
        self.option_state.select(Some(index));
        self.dispatch(Event::Select(brain_type));
    }

    fn move_highlight(&mut self, down: bool) {
        let count = self.option_count();
        if count == 0 {
            return;
        }
        let current = self.option_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.option_state.select(Some(next));
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::Esc {
            self.should_quit = true;
            return;
        }

        match self.stage() {
            Stage::Intro => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.dispatch(Event::Start),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },

            Stage::NameCapture => match key.code {
                KeyCode::Enter => self.dispatch(Event::SubmitName(self.name_input.clone())),
                KeyCode::Backspace => {
                    self.name_input.pop();
                }
                KeyCode::Char(c) => self.name_input.push(c),
                _ => {}
            },

            Stage::Quiz => match key.code {
                KeyCode::Char(c) if OPTION_KEYS.contains(&c) || OPTION_LETTERS.contains(&c) => {
                    let index = OPTION_KEYS
                        .iter()
                        .chain(OPTION_LETTERS.iter())
                        .position(|k| *k == c)
                        .map_or(0, |i| i % OPTION_KEYS.len());
                    self.select_option(index);
                }
                KeyCode::Up | KeyCode::Char('k') => self.move_highlight(false),
                KeyCode::Down | KeyCode::Char('j') => self.move_highlight(true),
                KeyCode::Char(' ') => self.select_option(self.option_state.selected().unwrap_or(0)),
                KeyCode::Left | KeyCode::Char('p') => self.dispatch(Event::Previous),
                KeyCode::Right | KeyCode::Char('n') => self.dispatch(Event::Next),
                KeyCode::Enter => {
                    if self.driver.session().current_answer().is_none() {
                        self.select_option(self.option_state.selected().unwrap_or(0));
                    } else {
                        self.dispatch(Event::Next);
                    }
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },

            Stage::Scoring => {
                if key.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }

            Stage::Result => self.on_result_key(key),
        }
    }

    fn on_result_key(&mut self, key: KeyEvent) {
        // Ctrl-R restarts even while the commitment box has focus
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            return self.reset();
        }
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            _ if !self.driver.session().declaration_visible() => match key.code {
                KeyCode::Enter => {
                    self.dispatch(Event::SubmitCommitment(self.commitment_input.clone()));
                    if self.driver.session().declaration_visible() {
                        self.info("Declaration issued. s: save card  h: share  e: edit");
                    }
                }
                KeyCode::Backspace => {
                    self.commitment_input.pop();
                }
                KeyCode::Char(c) => self.commitment_input.push(c),
                _ => {}
            },
            KeyCode::Char('s') => self.start_export(),
            KeyCode::Char('h') => self.share(),
            KeyCode::Char('e') => self.dispatch(Event::EditCommitment),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.dispatch(Event::Reset);
        if self.stage() == Stage::Intro {
            self.name_input.clear();
            self.commitment_input.clear();
            self.scroll = 0;
        }
    }

    fn report(&self) -> Option<ResultReport> {
        self.env.report(self.driver.session()).ok()
    }

    fn share(&mut self) {
        let Some(report) = self.report() else {
            return;
        };
        let payload = SharePayload::new(
            &report.display_name,
            &report.primary.name,
            self.env.config.share_url(),
        )
        .with_title(self.env.config.share_title());

        let mut clipboard = Osc52Clipboard::new(io::stdout());
        let outcome = share(None, &mut clipboard, &payload);
        match outcome.notice() {
            Some(text) if matches!(outcome, ShareOutcome::Failed(_)) => {
                self.error(text)
            }
            Some(text) => self.info(text),
            None => {}
        }
    }

    /// Kick off a background save; the result arrives through `export_rx`
    fn start_export(&mut self) {
        let declaration = match self.env.declaration(self.driver.session()) {
            Ok(d) => d,
            Err(e) => return self.error(e.to_string()),
        };
        // The exporter flag is only raised once the task runs, so a pending
        // receiver counts as busy too
        if self.export_rx.is_some() || self.exporter.is_busy() {
            return self.error(ExportError::Busy.to_string());
        }
        if self.runtime.is_none() {
            match tokio::runtime::Runtime::new() {
                Ok(rt) => self.runtime = Some(rt),
                Err(e) => return self.error(format!("Could not start export worker: {e}")),
            }
        }
        let Some(runtime) = &self.runtime else {
            return;
        };

        let (tx, rx) = mpsc::channel();
        let exporter = Arc::clone(&self.exporter);
        let dir = self.env.config.output_dir().to_path_buf();
        runtime.spawn(async move {
            let result = exporter.save(&declaration, &dir).await;
            // The receiver is gone only when the app already quit
            let _ = tx.send(result);
        });
        self.export_rx = Some(rx);
        self.info("Saving declaration card...");
    }

    /// Pick up a finished export, if any
    fn collect_export(&mut self) {
        let Some(rx) = &self.export_rx else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Err(ExportError::Worker(
                "export task ended without a result".to_string(),
            )),
        };
        self.export_rx = None;
        match result {
            Ok(path) => self.info(format!("Saved {}", path.display())),
            Err(e) => {
                warn!("Card export failed: {}", e);
                self.error(format!("Could not save the card, try again ({e})"));
            }
        }
    }

    /// Advance timers by real elapsed time
    fn tick(&mut self, elapsed: Duration) {
        self.ticks = self.ticks.wrapping_add(1);
        match self.driver.advance(elapsed) {
            Ok(effects) => self.handle_effects(effects),
            Err(e) => self.error(e.to_string()),
        }
        self.sync_highlight();
        self.collect_export();
    }

    fn poll_timeout(&self) -> Duration {
        let mut timeout = IDLE_POLL;
        if let Some(due) = self.driver.timeline().next_due_in() {
            timeout = timeout.min(due);
        }
        if self.export_rx.is_some() || self.stage() == Stage::Scoring {
            timeout = timeout.min(EXPORT_POLL);
        }
        timeout
    }
}

pub(crate) fn run(env: QuizEnv) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(env);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(app.poll_timeout())? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        let now = Instant::now();
        app.tick(now.duration_since(last_tick));
        last_tick = now;

        if app.should_quit {
            debug!("Leaving quiz at the {} stage", app.stage());
            return Ok(());
        }
    }
}

fn profile_color(hex: &str) -> Color {
    let rgb = Rgb::from_hex(hex).unwrap_or(Rgb::INDIGO);
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(format!(
        " braintype | C.O.D.E Brain Type Diagnosis | {}",
        app.stage()
    ))
    .style(Style::default().fg(Color::Cyan).bold())
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    match app.stage() {
        Stage::Intro => render_intro(f, chunks[1], app),
        Stage::NameCapture => render_name(f, chunks[1], app),
        Stage::Quiz => render_quiz(f, chunks[1], app),
        Stage::Scoring => render_scoring(f, chunks[1], app),
        Stage::Result => render_result(f, chunks[1], app),
    }

    let footer = match &app.notice {
        Some(notice) => Paragraph::new(format!(" {}", notice.text)).style(if notice.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        }),
        None => Paragraph::new(help_line(app)).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(footer, chunks[2]);
}

fn help_line(app: &App) -> &'static str {
    match app.stage() {
        Stage::Intro => " Enter:Start  q:Quit",
        Stage::NameCapture => " Type your name  Enter:Continue  Esc:Quit",
        Stage::Quiz => " 1-9/a-i:Answer  j/k:Move  ←/p:Back  →/n:Next  Enter:Next/Submit  q:Quit",
        Stage::Scoring => " Analyzing...  q:Quit",
        Stage::Result if app.driver.session().declaration_visible() => {
            " s:Save card  h:Share  e:Edit  r/Ctrl-R:Restart  ↑/↓:Scroll  q:Quit"
        }
        Stage::Result => {
            " Type your commitment  Enter:Issue declaration  Ctrl-R:Restart  ↑/↓:Scroll  Esc:Quit"
        }
    }
}

fn render_intro(f: &mut Frame, area: Rect, app: &App) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "THE LAST IMMERSION",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(Span::styled(
            "Brain Type Diagnosis (C.O.D.E)",
            Style::default().bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "{} questions reveal how your brain prefers to learn, remember and decide.",
            app.env.catalog.len()
        )),
        Line::from("Are you a Cheetah, an Owl, a Dolphin or an Elephant?"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to begin",
            Style::default().fg(Color::Cyan),
        )),
    ];
    let intro = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(intro, area);
}

fn render_name(f: &mut Frame, area: Rect, app: &App) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "What should we call you?",
            Style::default().bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(app.name_input.as_str()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]),
    ];
    let prompt = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Name "));
    f.render_widget(prompt, area);
}

fn render_quiz(f: &mut Frame, area: Rect, app: &mut App) {
    let session = app.driver.session();
    let cursor = session.cursor();
    let total = session.question_count();
    let current = session.current_answer();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((cursor + 1) as f64 / total.max(1) as f64)
        .label(format!(
            "Question {}/{}  ({} answered)",
            cursor + 1,
            total,
            session.answers().answered_count()
        ));
    f.render_widget(progress, chunks[0]);

    let Some(question) = app.env.catalog.question(cursor) else {
        return;
    };
    let question_text = Paragraph::new(question.text.as_str())
        .style(Style::default().bold())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
    f.render_widget(question_text, chunks[1]);

    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let chosen = current == Some(option.brain_type);
            let marker = if chosen { "●" } else { "○" };
            let style = if chosen {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{marker} "), style),
                Span::styled(option.label.as_str(), style),
            ]))
        })
        .collect();

    let title = if session.is_last_question() && current.is_some() {
        " Enter to see your result "
    } else {
        " Options "
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, chunks[2], &mut app.option_state);
}

fn render_scoring(f: &mut Frame, area: Rect, app: &App) {
    let dots = ".".repeat((app.ticks % 4) as usize);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Analyzing {}'s brain{dots}", app.driver.session().display_name()),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from("Matching your answers against the four C.O.D.E profiles"),
    ];
    let scoring = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(scoring, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.report() else {
        return;
    };
    let accent = profile_color(&report.primary.color);
    let bold = Style::default().bold();
    let dim = Style::default().fg(Color::DarkGray);

    let mut text = vec![
        Line::from(vec![
            Span::styled(report.primary.name.clone(), Style::default().fg(accent).bold()),
            Span::styled(format!("  {}", report.primary.english_name), dim),
        ]),
        Line::from(report.primary.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            format!("C.O.D.E BALANCE (out of {})", report.question_count),
            bold,
        )),
    ];

    let n = report.question_count.max(1);
    for (brain_type, count) in report.tally.iter() {
        let filled = count * 20 / n;
        let color = profile_color(&app.env.catalog.profile(brain_type).color);
        text.push(Line::from(vec![
            Span::raw(format!("  {:<9} ", brain_type.as_str().to_uppercase())),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
            Span::styled("░".repeat(20 - filled), dim),
            Span::raw(format!(" {count:>2}/{}", report.question_count)),
        ]));
    }

    text.push(Line::from(""));
    text.push(Line::from(vec![
        Span::styled("Secondary engine: ", bold),
        Span::raw(report.secondary_name.clone()),
    ]));
    text.push(Line::from(format!("  {}", report.secondary_line())));
    text.push(Line::from(vec![
        Span::styled("Best chemistry: ", bold),
        Span::raw(report.primary.chemistry.partner.clone()),
    ]));
    text.push(Line::from(Span::styled(
        format!("  \"{}\"", report.primary.chemistry.synergy),
        dim,
    )));
    text.push(Line::from(vec![
        Span::styled("Blind spot: ", bold),
        Span::raw(report.primary.blind_spot.clone()),
    ]));

    for (title, list) in report.strategies() {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(title.to_uppercase(), bold)));
        for item in list {
            text.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(accent)),
                Span::raw(item.clone()),
            ]));
        }
    }

    text.push(Line::from(""));
    text.push(Line::from(Span::styled("RECOMMENDED ACTION", bold)));
    text.push(Line::from(format!("  {}", report.primary.recommended_action)));
    text.push(Line::from(""));

    let session = app.driver.session();
    if session.declaration_visible() {
        text.push(Line::from(Span::styled(
            "LIMITLESS BRAIN DECLARATION",
            Style::default().fg(accent).bold(),
        )));
        text.push(Line::from(format!("  I, {}, commit to:", session.display_name())));
        text.push(Line::from(Span::styled(
            format!("  \"{}\"", session.commitment()),
            Style::default().fg(accent),
        )));
    } else {
        text.push(Line::from(Span::styled("YOUR COMMITMENT", bold)));
        text.push(Line::from(Span::styled(
            "  One small but powerful promise, at least 5 characters",
            dim,
        )));
        text.push(Line::from(vec![
            Span::styled("  > ", Style::default().fg(accent)),
            Span::raw(app.commitment_input.as_str()),
            Span::styled("▏", Style::default().fg(accent)),
        ]));
    }

    let title = format!(" {}'s result ", session.display_name());
    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(result, area);
}
