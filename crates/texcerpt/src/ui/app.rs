//! Application loop for the TUI.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::assemble::DocumentAssembler;
use crate::app::build::{self, BuildOutput};
use crate::app::navigation::{ImportOutcome, Navigator, Screen};
use crate::infra::config::Config;
use crate::infra::latex::PdfLatex;
use crate::infra::opener;
use crate::ui::components::diagnostics::{Diagnostics, DiagnosticsState};
use crate::ui::components::path_prompt::{PathPrompt, PathPromptState};
use crate::ui::components::section_list::SectionList;
use crate::ui::components::section_preview::SectionPreview;
use crate::ui::keymap::{KeyMap, triggers};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    config: Config,
    keymap: KeyMap,
    navigator: Navigator,
    prompt: PathPromptState,
    diagnostics: DiagnosticsState,
    status: Option<StatusMessage>,
    pending_generate: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(config: Config) -> Self {
        Self {
            keymap: KeyMap::from_config(&config.keybindings),
            config,
            navigator: Navigator::new(),
            prompt: PathPromptState::default(),
            diagnostics: DiagnosticsState::default(),
            status: None,
            pending_generate: false,
            should_quit: false,
        }
    }

    /// Launch the terminal UI and enter the event loop, importing `initial` first if given.
    pub fn run(&mut self, initial: Option<&Path>) -> Result<()> {
        if let Some(path) = initial {
            self.import(&path.display().to_string());
        }

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            // The "Compiling" status has been drawn; run the blocking build now.
            if self.pending_generate {
                self.pending_generate = false;
                self.run_generate();
                continue;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev);
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(size);

        match self.navigator.screen() {
            Screen::Import(state) => {
                PathPrompt.render(frame, layout[0], &self.prompt, state.notice.as_deref());
            }
            Screen::Selection(state) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(layout[0]);
                SectionList.render(frame, columns[0], state);

                let current = state.current();
                let selected = current.is_some_and(|section| state.selection.contains(&section.title));
                SectionPreview.render(current, selected, columns[1], frame.buffer_mut());
            }
        }

        frame.render_widget(self.hints(), layout[1]);
        self.render_status(frame, layout[2]);
        Diagnostics.render(frame, size, &self.diagnostics);
    }

    fn hints(&self) -> Paragraph<'static> {
        let key = |text: String| Span::styled(text, Style::default().fg(Color::Cyan));
        let spans = match self.navigator.screen() {
            Screen::Import(_) => vec![
                key("↵".into()),
                Span::raw(" import · "),
                key("esc".into()),
                Span::raw(" quit"),
            ],
            Screen::Selection(_) => {
                let bindings = &self.config.keybindings;
                vec![
                    key(format!("{}/{}", bindings.down, bindings.up)),
                    Span::raw(" move · "),
                    key(bindings.select.clone()),
                    Span::raw(" toggle · "),
                    key("a".into()),
                    Span::raw(" all · "),
                    key(format!("{}/↵", bindings.generate)),
                    Span::raw(" generate · "),
                    key("esc".into()),
                    Span::raw(" back · "),
                    key("q".into()),
                    Span::raw(" quit"),
                ]
            }
        };
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = message.unwrap_or_else(|| {
            Line::styled("Ready", Style::default().fg(Color::DarkGray))
        });
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key_event(key),
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.diagnostics.is_open() {
            self.handle_diagnostics_key(key);
            return;
        }

        match self.navigator.screen() {
            Screen::Import(_) => self.handle_import_key(key),
            Screen::Selection(_) => self.handle_selection_key(key),
        }
    }

    fn handle_diagnostics_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.diagnostics.close(),
            KeyCode::Down | KeyCode::Char('j') => self.diagnostics.scroll_down(1),
            KeyCode::Up | KeyCode::Char('k') => self.diagnostics.scroll_up(1),
            KeyCode::PageDown => self.diagnostics.scroll_down(10),
            KeyCode::PageUp => self.diagnostics.scroll_up(10),
            _ => {}
        }
    }

    fn handle_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                let input = self.prompt.take_input();
                let input = input.trim();
                if !input.is_empty() {
                    self.import(input);
                }
            }
            KeyCode::Backspace => {
                self.prompt.pop_char();
            }
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.prompt.push_char(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_selection_key(&mut self, key: KeyEvent) {
        if triggers(&self.keymap.generate, &key) {
            self.request_generate();
            return;
        }
        if triggers(&self.keymap.select, &key) {
            self.toggle_current();
            return;
        }

        let Some(state) = self.navigator.selection_state_mut() else {
            return;
        };
        if triggers(&self.keymap.down, &key) {
            state.move_down();
            return;
        }
        if triggers(&self.keymap.up, &key) {
            state.move_up();
            return;
        }

        match key.code {
            KeyCode::Down => state.move_down(),
            KeyCode::Up => state.move_up(),
            KeyCode::Char('a') => state.toggle_all(),
            KeyCode::Enter => self.request_generate(),
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Import `raw` as a path. On failure the input is restored so it can be corrected.
    fn import(&mut self, raw: &str) {
        let path = expand_home(raw);
        match self.navigator.import_file(&path) {
            Ok(ImportOutcome::Loaded { sections }) => {
                tracing::info!(path = %path.display(), sections, "imported document");
                self.set_status(
                    StatusLevel::Success,
                    format!("Loaded {sections} sections from {}", path.display()),
                );
            }
            Ok(ImportOutcome::NoSections) => self.prompt.set_input(raw),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "import failed");
                self.prompt.set_input(raw);
            }
        }
    }

    fn back(&mut self) {
        let source = self
            .navigator
            .selection_state()
            .map(|state| state.source.display().to_string());
        if self.navigator.back()
            && let Some(source) = source
        {
            self.prompt.set_input(source);
        }
    }

    fn toggle_current(&mut self) {
        let Some(state) = self.navigator.selection_state_mut() else {
            return;
        };
        if let Some((title, selected)) = state.toggle_current() {
            let verb = if selected { "Selected" } else { "Removed" };
            self.set_status(StatusLevel::Info, format!("{verb} {title}"));
        }
    }

    fn request_generate(&mut self) {
        let Some(state) = self.navigator.selection_state() else {
            return;
        };
        if state.selection.is_empty() {
            self.set_status(StatusLevel::Error, "Select at least one section first");
            return;
        }
        let count = state.selection.len();
        self.set_status(StatusLevel::Info, format!("Compiling {count} sections…"));
        self.pending_generate = true;
    }

    fn run_generate(&mut self) {
        if let Err(err) = self.generate() {
            tracing::error!(error = %format!("{err:#}"), "generate failed");
            self.set_status(StatusLevel::Error, format!("{err:#}"));
        }
    }

    fn generate(&mut self) -> Result<()> {
        let Some(state) = self.navigator.selection_state() else {
            return Ok(());
        };
        let assembler = DocumentAssembler::from_config(&self.config);
        let compiler = PdfLatex::from_config(&self.config);
        let result = build::generate(&state.table, &state.selection, &assembler, &compiler);
        let source = state.source.clone();

        match result {
            Ok(output) => self.finish_build(output, &source),
            Err(err) => {
                if let Some(diagnostics) = err.diagnostics() {
                    self.diagnostics.open(diagnostics);
                    self.set_status(StatusLevel::Error, "Compilation failed");
                    Ok(())
                } else {
                    Err(err.into())
                }
            }
        }
    }

    fn finish_build(&mut self, output: BuildOutput, source: &Path) -> Result<()> {
        let pdf = match self.config.ui.output_dir() {
            Some(dir) => build::publish(&output.pdf, &build::timestamped_output(dir, source)?)?,
            None => output.pdf.pdf_path.clone(),
        };
        let count = output.document.titles.len();

        if self.config.ui.open_after_build()
            && let Err(err) = opener::open(&pdf)
        {
            tracing::warn!(error = %err, "failed to open viewer");
            self.set_status(
                StatusLevel::Info,
                format!("Built {} (could not open viewer)", pdf.display()),
            );
            return Ok(());
        }

        self.set_status(
            StatusLevel::Success,
            format!("Built {} from {count} sections", pdf.display()),
        );
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs_next::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Error,
}
