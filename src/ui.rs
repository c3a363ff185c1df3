//! TUI module using ratatui.
//!
//! A single URL input, `Enter` to summarise, and a result pane rendered in
//! place. While a request runs the input is locked and a spinner is shown.

use crate::agent::{Summarizer, Summary};
use crate::loader::ContentLoader;
use crate::pipeline::{Orchestrator, Stage, Submission};
use crate::source::SourceKind;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

const TITLE: &str = " urlsumma: summarise a YouTube video or website ";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const POLL_INTERVAL: Duration = Duration::from_millis(80);

/// Progress reported by the request task
enum Update {
    Stage(Stage),
    Finished(Submission),
    /// The request task panicked
    Crashed(String),
}

/// What the result pane shows
enum Output {
    Empty,
    Summary {
        summary: Summary,
        kind: Option<SourceKind>,
    },
    Error(String),
}

/// Line-editing state for the URL input
#[derive(Debug, Default)]
pub struct InputLine {
    value: String,
    /// Cursor position in chars
    cursor: usize,
}

impl InputLine {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

struct App<L, S> {
    orchestrator: Arc<Orchestrator<L, S>>,
    input: InputLine,
    stage: Stage,
    busy: bool,
    output: Output,
    scroll: u16,
    tick: usize,
    updates_tx: UnboundedSender<Update>,
    updates_rx: UnboundedReceiver<Update>,
    quit: bool,
}

impl<L, S> App<L, S>
where
    L: ContentLoader + 'static,
    S: Summarizer + 'static,
{
    fn new(orchestrator: Arc<Orchestrator<L, S>>) -> Self {
        let (updates_tx, updates_rx) = unbounded_channel();
        Self {
            orchestrator,
            input: InputLine::default(),
            stage: Stage::Idle,
            busy: false,
            output: Output::Empty,
            scroll: 0,
            tick: 0,
            updates_tx,
            updates_rx,
            quit: false,
        }
    }

    fn submit(&mut self) {
        let raw = self.input.value().to_string();
        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.updates_tx.clone();

        self.busy = true;
        self.output = Output::Empty;
        self.scroll = 0;

        let request_tx = tx.clone();
        let request = tokio::spawn(async move {
            let stage_tx = request_tx.clone();
            let submission = orchestrator
                .submit(&raw, move |stage| {
                    let _ = stage_tx.send(Update::Stage(stage));
                })
                .await;
            let _ = request_tx.send(Update::Finished(submission));
        });

        tokio::spawn(async move {
            if let Err(e) = request.await {
                let _ = tx.send(Update::Crashed(e.to_string()));
            }
        });
    }

    fn drain_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            match update {
                Update::Stage(stage) => self.stage = stage,
                Update::Finished(submission) => {
                    self.output = match submission.outcome {
                        Ok(summary) => Output::Summary {
                            summary,
                            kind: submission.kind,
                        },
                        Err(e) => Output::Error(e.user_message()),
                    };
                    self.busy = false;
                    self.stage = Stage::Idle;
                }
                Update::Crashed(reason) => {
                    self.output = Output::Error(format!("The request stopped unexpectedly: {reason}"));
                    self.busy = false;
                    self.stage = Stage::Idle;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        // Input is locked until the running request finishes
        if self.busy {
            return;
        }

        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear()
            }
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            KeyCode::PageDown | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let [header, input, output, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            ))),
            header,
        );

        self.render_input(frame, input);
        self.render_output(frame, output);
        self.render_status(frame, status);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let style = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(self.input.value())
            .style(style)
            .block(Block::bordered().title(" URL "));
        frame.render_widget(widget, area);

        if !self.busy {
            let x = area.x + 1 + self.input.cursor() as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_output(&self, frame: &mut Frame, area: Rect) {
        let (title, text) = match &self.output {
            Output::Empty => (" Summary ".to_string(), Text::default()),
            Output::Summary { summary, kind } => {
                let source = kind.map(|k| format!(" of {k}")).unwrap_or_default();
                let title = format!(
                    " Summary{source} ({}, {}) ",
                    summary.model,
                    summary.created_at.with_timezone(&Local).format("%H:%M:%S")
                );
                let text = Text::styled(summary.text.clone(), Style::default().fg(Color::Green));
                (title, text)
            }
            Output::Error(message) => (
                " Error ".to_string(),
                Text::styled(message.clone(), Style::default().fg(Color::Red)),
            ),
        };

        let widget = Paragraph::new(text)
            .block(Block::bordered().title(title))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(widget, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = if self.busy {
            Line::from(vec![
                Span::styled(
                    SPINNER[self.tick % SPINNER.len()],
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!(" Waiting.. ({})", self.stage)),
            ])
        } else {
            Line::from(Span::styled(
                "Enter: summarise  Ctrl-U: clear  Up/Down: scroll  Esc: quit",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI until the user quits
pub async fn run<L, S>(orchestrator: Arc<Orchestrator<L, S>>) -> anyhow::Result<()>
where
    L: ContentLoader + 'static,
    S: Summarizer + 'static,
{
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, App::new(orchestrator)).await;
    ratatui::restore();
    result
}

async fn event_loop<L, S>(terminal: &mut DefaultTerminal, mut app: App<L, S>) -> anyhow::Result<()>
where
    L: ContentLoader + 'static,
    S: Summarizer + 'static,
{
    while !app.quit {
        app.drain_updates();
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.tick = app.tick.wrapping_add(1);
        tokio::task::yield_now().await;
    }

    debug!("leaving TUI");
    Ok(())
}
