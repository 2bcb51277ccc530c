//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - The [`Viewer`] that owns all study state
//! - A [`DisplayDocument`] laid out from the viewer's current tree
//!
//! The App converts terminal events to [`ViewerEvent`]s, hands them to the
//! viewer, and lays out the tree again whenever the viewer re-renders.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{Frame, Terminal};

use chuleta_core::speech::RATE_STEP;
use chuleta_core::{
    Intent, Notice, NoticeLevel, Reaction, View, Viewer, ViewerEvent, EXPORT_FILE_NAME,
};

use crate::display::{layout, DisplayDocument};
use crate::theme::{self, DIM_GRAY, ERROR_RED, INPUT_GREEN, SUCCESS_GREEN, TITLE_ORANGE, WARNING_YELLOW};
use crate::widgets::{TextBlock, TextBlockState};

/// Width of the section menu
pub const NAV_WIDTH: u16 = 26;

/// Idle wake-up interval (expires notices, reaps finished speech)
const TICK: Duration = Duration::from_millis(250);

/// How long a notice stays in the status bar
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// What typed characters go to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Keys move focus, scroll and trigger commands
    Browse,
    /// Keys edit the search term (filtered live)
    Search,
    /// Keys edit the quiz answer
    Answer,
    /// Keys edit the path of a file to import
    Import,
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// State owner and event router
    viewer: Viewer,

    // === Display State ===
    /// Layout of the current tree
    document: DisplayDocument,
    /// Scroll state of the content area
    content: TextBlockState,
    /// Focused target index
    focus: Option<usize>,
    /// Highlighted menu entry
    nav_cursor: Option<usize>,
    /// Latest notice and when it was raised
    status: Option<(Notice, Instant)>,
    /// Terminal size
    size: (u16, u16),

    // === Input State ===
    /// Current input mode
    mode: InputMode,
    /// Text being edited in the input line
    input_buffer: String,
}

impl App {
    /// Create an App around a ready viewer
    #[must_use]
    pub fn new(viewer: Viewer, size: (u16, u16)) -> Self {
        let mut app = Self {
            running: true,
            viewer,
            document: DisplayDocument::default(),
            content: TextBlockState::default(),
            focus: None,
            nav_cursor: None,
            status: None,
            size,
            mode: InputMode::Browse,
            input_buffer: String::new(),
        };
        app.content.viewport_height = usize::from(content_height(size));
        app.relayout();
        app.focus = (!app.document.targets.is_empty()).then_some(0);
        app
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(Event::Mouse(mouse))) => self.handle_mouse(mouse),
                        Some(Ok(Event::Resize(w, h))) => self.handle_resize(w, h),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => self.running = false,
                    }
                }

                _ = tokio::time::sleep(TICK) => {
                    self.viewer.tick();
                    self.expire_status();
                }
            }

            terminal.draw(|frame| self.draw(frame))?;
        }

        self.viewer.shutdown();
        Ok(())
    }

    // =========================================================================
    // Input handling
    // =========================================================================

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }
        match self.mode {
            InputMode::Browse => self.handle_browse_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::Answer => self.handle_answer_key(key),
            InputMode::Import => self.handle_import_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,

            // Focus
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Left => self.move_focus(-1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_focused(),

            // Scrolling
            KeyCode::Down | KeyCode::Char('j') => self.content.scroll(1),
            KeyCode::Up | KeyCode::Char('k') => self.content.scroll(-1),
            KeyCode::PageDown => self.content.scroll(self.half_page()),
            KeyCode::PageUp => self.content.scroll(-self.half_page()),
            KeyCode::Home | KeyCode::Char('g') => self.content.scroll_to_top(),

            // Navigation
            KeyCode::Char('n') => self.step_nav(1),
            KeyCode::Char('p') => self.step_nav(-1),
            KeyCode::Char('h') => {
                self.send(ViewerEvent::Navigate(View::Home));
            }
            KeyCode::Char('z') => {
                self.send(ViewerEvent::Navigate(View::Quiz));
            }

            // Search
            KeyCode::Char('/') => {
                self.input_buffer = self.viewer.state().search_term.clone();
                self.mode = InputMode::Search;
            }

            // Quiz
            KeyCode::Char('a') => {
                if let Some(question) = self.viewer.tree().quiz().and_then(|q| q.question.as_ref()) {
                    self.input_buffer = question.answer_field.clone();
                    self.mode = InputMode::Answer;
                }
            }
            KeyCode::Char('s') => {
                self.send(ViewerEvent::CycleQuizSource);
            }
            KeyCode::Char('+' | '=') => {
                self.send(ViewerEvent::AdjustQuizCount(1));
            }
            KeyCode::Char('-') => {
                self.send(ViewerEvent::AdjustQuizCount(-1));
            }

            // Speech
            KeyCode::Char('v') => {
                self.send(ViewerEvent::CycleVoice);
            }
            KeyCode::Char('>') => {
                self.send(ViewerEvent::AdjustRate(RATE_STEP));
            }
            KeyCode::Char('<') => {
                self.send(ViewerEvent::AdjustRate(-RATE_STEP));
            }

            // Transfer
            KeyCode::Char('i') => {
                if self.viewer.state().current_view.section_id().is_some() {
                    self.input_buffer.clear();
                    self.mode = InputMode::Import;
                } else {
                    self.set_status(Notice::warning("Open a section (n/p) to import into it"));
                }
            }
            KeyCode::Char('e') => {
                self.send(ViewerEvent::Export {
                    path: PathBuf::from(EXPORT_FILE_NAME),
                });
            }

            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Browse,
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.send(ViewerEvent::Search(String::new()));
                self.mode = InputMode::Browse;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.send(ViewerEvent::Search(self.input_buffer.clone()));
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.send(ViewerEvent::Search(self.input_buffer.clone()));
            }
            _ => {}
        }
    }

    fn handle_answer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.send(ViewerEvent::QuizSubmit);
            }
            KeyCode::Esc => self.mode = InputMode::Browse,
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.send(ViewerEvent::QuizInput(self.input_buffer.clone()));
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.send(ViewerEvent::QuizInput(self.input_buffer.clone()));
            }
            _ => {}
        }
    }

    fn handle_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let path = std::mem::take(&mut self.input_buffer);
                self.mode = InputMode::Browse;
                let section_id = self.viewer.state().current_view.section_id().map(str::to_string);
                if let (Some(section_id), false) = (section_id, path.trim().is_empty()) {
                    self.send(ViewerEvent::Import {
                        section_id,
                        path: PathBuf::from(path.trim()),
                    });
                }
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.mode = InputMode::Browse;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    /// Handle mouse input
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.content.scroll(-3),
            MouseEventKind::ScrollDown => self.content.scroll(3),
            _ => {}
        }
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.content.viewport_height = usize::from(content_height(self.size));
        self.relayout();
    }

    // =========================================================================
    // Viewer interaction
    // =========================================================================

    fn send(&mut self, event: ViewerEvent) -> Reaction {
        let previous_view = self.viewer.state().current_view.clone();
        let reaction = self.viewer.handle_event(event);

        if let Some(notice) = self.viewer.take_notices().pop() {
            self.set_status(notice);
        }
        match reaction {
            Reaction::Rerendered => self.after_render(&previous_view),
            Reaction::Stale => tracing::debug!("Activated element is no longer on screen"),
            Reaction::Unchanged => {}
        }
        reaction
    }

    fn after_render(&mut self, previous_view: &View) {
        self.relayout();

        let view = self.viewer.state().current_view.clone();
        if let Some(idx) = self.viewer.tree().nav.iter().position(|n| n.active) {
            self.nav_cursor = Some(idx);
        }
        if view != *previous_view {
            let top = view
                .section_id()
                .and_then(|id| self.document.anchor_line(id))
                .unwrap_or(0);
            self.content.scroll_to(top);
            self.focus = self.document.targets.iter().position(|t| t.line >= top);
        }

        if self.mode == InputMode::Answer {
            match self.viewer.tree().quiz().and_then(|q| q.question.as_ref()) {
                Some(question) => self.input_buffer = question.answer_field.clone(),
                None => {
                    self.input_buffer.clear();
                    self.mode = InputMode::Browse;
                }
            }
        }
    }

    fn relayout(&mut self) {
        self.document = layout(self.viewer.tree(), content_width(self.size));
        self.content.total_lines = self.document.lines.len();
        self.focus = match self.document.targets.len() {
            0 => None,
            len => self.focus.map(|f| f.min(len - 1)),
        };
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.document.targets.len();
        if len == 0 {
            return;
        }
        let next = match self.focus {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        self.focus = Some(next);
        if let Some(target) = self.document.targets.get(next) {
            self.content.reveal(target.line);
        }
    }

    fn activate_focused(&mut self) {
        let Some(intent) = self.focused_intent().cloned() else {
            return;
        };
        self.send(ViewerEvent::Activate(intent));
    }

    fn step_nav(&mut self, delta: isize) {
        let len = self.viewer.tree().nav.len();
        if len == 0 {
            return;
        }
        let next = match self.nav_cursor {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.nav_cursor = Some(next);
        let intent = self.viewer.tree().nav[next].intent.clone();
        self.send(ViewerEvent::Activate(intent));
    }

    fn set_status(&mut self, notice: Notice) {
        self.status = Some((notice, Instant::now()));
    }

    fn expire_status(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, raised)| raised.elapsed() >= NOTICE_TTL)
        {
            self.status = None;
        }
    }

    fn half_page(&self) -> i32 {
        i32::from(content_height(self.size) / 2).max(1)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Intent of the focused element
    #[must_use]
    pub fn focused_intent(&self) -> Option<&Intent> {
        self.focus
            .and_then(|idx| self.document.targets.get(idx))
            .map(|t| &t.intent)
    }

    /// The laid-out document
    #[must_use]
    pub fn document(&self) -> &DisplayDocument {
        &self.document
    }

    /// The viewer
    #[must_use]
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Current input mode
    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Text in the input line
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// First visible content line
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.content.scroll_offset
    }

    /// Notice currently in the status bar
    #[must_use]
    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref().map(|(notice, _)| notice)
    }

    /// Whether the event loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Draw one frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
            .split(frame.area());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAV_WIDTH), Constraint::Min(1)])
            .split(rows[0]);

        self.draw_nav(frame, columns[0]);
        self.draw_content(frame, columns[1]);
        self.draw_input(frame, rows[1]);
        self.draw_status(frame, rows[2]);
    }

    fn draw_nav(&self, frame: &mut Frame, area: Rect) {
        let buf = frame.buffer_mut();
        let width = area.width.saturating_sub(2) as usize;

        buf.set_string(
            area.x + 1,
            area.y,
            "Chuleta",
            Style::default().fg(TITLE_ORANGE).add_modifier(Modifier::BOLD),
        );

        for (i, entry) in self.viewer.tree().nav.iter().enumerate() {
            let y = area.y + 2 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let marker = if entry.active { "▸ " } else { "  " };
            let label: String = format!("{marker}{}", entry.title)
                .chars()
                .take(width)
                .collect();
            let mut style = if entry.active {
                Style::default().fg(TITLE_ORANGE)
            } else {
                Style::default()
            };
            if self.nav_cursor == Some(i) {
                style = style.add_modifier(Modifier::BOLD);
            }
            buf.set_string(area.x + 1, y, &label, style);
        }

        // Separator
        let x = area.x + area.width.saturating_sub(1);
        for y in area.y..area.y + area.height {
            buf.set_string(x, y, "│", Style::default().fg(DIM_GRAY));
        }
    }

    fn draw_content(&mut self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line<'static>> = self
            .document
            .lines
            .iter()
            .map(|line| {
                let spans: Vec<Span<'static>> = line
                    .spans
                    .iter()
                    .map(|span| {
                        let style = theme::style_for(span.role);
                        let style = if span.target.is_some() && span.target == self.focus {
                            theme::focused(style)
                        } else {
                            style
                        };
                        Span::styled(span.text.clone(), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(1),
            ..area
        };
        frame.render_stateful_widget(TextBlock::new(&lines), inner, &mut self.content);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let (label, text, style) = match self.mode {
            InputMode::Browse => {
                let term = &self.viewer.state().search_term;
                if term.is_empty() {
                    ("", String::new(), Style::default())
                } else {
                    ("Filter: ", term.clone(), Style::default().fg(DIM_GRAY))
                }
            }
            InputMode::Search => ("Search: ", format!("{}_", self.input_buffer), Style::default().fg(INPUT_GREEN)),
            InputMode::Answer => ("Answer: ", format!("{}_", self.input_buffer), Style::default().fg(INPUT_GREEN)),
            InputMode::Import => (
                "Import file: ",
                format!("{}_", self.input_buffer),
                Style::default().fg(INPUT_GREEN),
            ),
        };
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(DIM_GRAY)),
            Span::styled(text, style),
        ]);
        frame.buffer_mut().set_line(area.x + 1, area.y, &line, area.width.saturating_sub(1));
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match self.status() {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Info => SUCCESS_GREEN,
                    NoticeLevel::Warning => WARNING_YELLOW,
                    NoticeLevel::Error => ERROR_RED,
                };
                (format!(" {}", notice.text), Style::default().fg(color))
            }
            None => {
                let speaker = self.viewer.speaker();
                let voice = speaker.voice().map_or("default", |v| v.name.as_str());
                (
                    format!(
                        " Tab focus | Enter activate | / search | n/p sections | z quiz | a answer | v voice ({voice}) | </> rate ({:.2}) | q quit",
                        speaker.rate()
                    ),
                    Style::default().fg(DIM_GRAY),
                )
            }
        };
        let clipped: String = text.chars().take(area.width as usize).collect();
        frame.buffer_mut().set_string(area.x, area.y, &clipped, style);
    }
}

/// Columns available to the content area
#[must_use]
pub fn content_width(size: (u16, u16)) -> u16 {
    size.0.saturating_sub(NAV_WIDTH + 1)
}

/// Rows available to the content area
fn content_height(size: (u16, u16)) -> u16 {
    size.1.saturating_sub(2)
}
