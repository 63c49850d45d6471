//! Terminal Application
//!
//! A thin display client for the engine:
//! 1. Converts terminal key presses into engine keys (`s p q k`)
//! 2. Applies engine events to a local copy of the board
//! 3. Redraws at most ~30 times per second, two cells per character
//!
//! The app exits when the engine closes its event stream.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use gol_engine::{Board, CellState, Event, State};

use crate::interrupt::{Interrupt, InterruptAction, InterruptGuard, WARN_MESSAGE};

/// Minimum time between redraws
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Events applied per wakeup before yielding to input and redraw
const EVENT_BUDGET: usize = 4096;

/// Why the app stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppExit {
    /// The engine finished and closed the stream
    Finished,
    /// The user pressed Ctrl+C twice
    ForceQuit,
}

/// Local view of the board, kept current from engine events
#[derive(Clone, Debug)]
pub struct BoardView {
    board: Board,
    completed_turns: u64,
    alive: Option<usize>,
    state: State,
    message: Option<String>,
}

impl BoardView {
    /// View starting from the initial board
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            completed_turns: 0,
            alive: None,
            state: State::Executing,
            message: None,
        }
    }

    /// The board as last reported
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Latest turn seen
    #[must_use]
    pub fn completed_turns(&self) -> u64 {
        self.completed_turns
    }

    /// Fold one event into the view
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::CellFlipped { cell, .. } => {
                let current = self.board.get(cell.x, cell.y);
                let flipped = CellState::from_alive(!current.is_alive());
                self.board.set(cell.x, cell.y, flipped);
            }
            Event::TurnComplete { completed_turns } => self.completed_turns = *completed_turns,
            Event::AliveCellsCount {
                completed_turns,
                cells_count,
            } => {
                self.completed_turns = *completed_turns;
                self.alive = Some(*cells_count);
            }
            Event::StateChange { new_state, .. } => self.state = *new_state,
            Event::ImageOutputComplete { filename, .. } => {
                self.message = Some(format!("saved {filename}"));
            }
            Event::FinalTurnComplete {
                completed_turns,
                board,
            } => {
                self.board = Board::clone(board);
                self.completed_turns = *completed_turns;
                self.alive = Some(board.alive_count());
            }
        }
    }

    /// Show a transient status message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Board rows as half-block text, two cells per character row
    ///
    /// Output is cropped to `columns` x `rows` characters.
    #[must_use]
    pub fn half_block_rows(&self, columns: usize, rows: usize) -> Vec<String> {
        let width = self.board.width().min(columns);
        let height = self.board.height();

        (0..rows.min(height.div_ceil(2)))
            .map(|row| {
                let top = row * 2;
                let bottom = top + 1;
                (0..width)
                    .map(|x| {
                        let upper = self.board.get(x, top).is_alive();
                        let lower = bottom < height && self.board.get(x, bottom).is_alive();
                        match (upper, lower) {
                            (true, true) => '█',
                            (true, false) => '▀',
                            (false, true) => '▄',
                            (false, false) => ' ',
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// One-line status: turn, alive count, state, last message
    #[must_use]
    pub fn status_line(&self) -> String {
        let alive = self
            .alive
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let mut status = format!(
            " turn {} | alive {} | {} | s save  p pause  q quit  k kill",
            self.completed_turns, alive, self.state
        );
        if let Some(ref message) = self.message {
            status.push_str(" | ");
            status.push_str(message);
        }
        status
    }

    /// Draw the board and the status line
    pub fn draw(&self, frame: &mut Frame) {
        let [board_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        let lines: Vec<Line> = self
            .half_block_rows(board_area.width as usize, board_area.height as usize)
            .into_iter()
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(lines), board_area);

        let style = match self.state {
            State::Paused => Style::default().fg(Color::Yellow),
            State::Executing => Style::default().fg(Color::DarkGray),
            State::Quitting => Style::default().fg(Color::Magenta),
        };
        frame.render_widget(Paragraph::new(self.status_line()).style(style), status_area);
    }
}

/// Control keys on their way to the engine
///
/// The engine's key queue is bounded. Keys that do not fit wait here in
/// order until a slot frees, so a `q` typed during a long turn still arrives.
#[derive(Debug)]
struct KeyForwarder {
    keys: mpsc::Sender<char>,
    pending: VecDeque<char>,
}

impl KeyForwarder {
    fn new(keys: mpsc::Sender<char>) -> Self {
        Self {
            keys,
            pending: VecDeque::new(),
        }
    }

    /// Queue `key` if the engine understands it
    fn push(&mut self, key: char) {
        if matches!(key, 's' | 'p' | 'q' | 'k') {
            self.pending.push_back(key);
        }
    }

    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Deliver the oldest pending key once the engine has room for it
    ///
    /// Cancel safe: a key leaves `pending` only after it is sent.
    async fn flush_one(&mut self) {
        let Some(&key) = self.pending.front() else {
            return;
        };
        match self.keys.reserve().await {
            Ok(permit) => {
                permit.send(key);
                self.pending.pop_front();
            }
            Err(_) => {
                tracing::debug!(dropped = self.pending.len(), "Engine stopped reading keys");
                self.pending.clear();
            }
        }
    }
}

/// Main application state
pub struct App {
    view: BoardView,
    keys: KeyForwarder,
    guard: InterruptGuard,
    dirty: bool,
}

impl App {
    /// App showing `board` and sending key presses to `keys`
    #[must_use]
    pub fn new(board: Board, keys: mpsc::Sender<char>) -> Self {
        Self {
            view: BoardView::new(board),
            keys: KeyForwarder::new(keys),
            guard: InterruptGuard::default(),
            dirty: true,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut events: mpsc::Receiver<Event>,
    ) -> io::Result<AppExit> {
        let mut input = EventStream::new();
        let mut frames = interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                // Terminal input - highest priority
                maybe_input = input.next() => {
                    if let Some(Ok(TermEvent::Key(key))) = maybe_input {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                            if self.on_ctrl_c() == InterruptAction::ForceQuit {
                                return Ok(AppExit::ForceQuit);
                            }
                        } else if let KeyCode::Char(c) = key.code {
                            self.keys.push(c);
                        }
                    }
                }

                () = self.keys.flush_one(), if self.keys.has_pending() => {}

                maybe_event = events.recv() => match maybe_event {
                    Some(event) => {
                        self.view.apply(&event);
                        for _ in 0..EVENT_BUDGET {
                            match events.try_recv() {
                                Ok(event) => self.view.apply(&event),
                                Err(_) => break,
                            }
                        }
                        self.dirty = true;
                    }
                    None => {
                        terminal.draw(|frame| self.view.draw(frame))?;
                        return Ok(AppExit::Finished);
                    }
                },

                _ = frames.tick() => {
                    if self.dirty {
                        terminal.draw(|frame| self.view.draw(frame))?;
                        self.dirty = false;
                    }
                }
            }
        }
    }

    fn on_ctrl_c(&mut self) -> InterruptAction {
        let action = self.guard.on_signal(Interrupt::CtrlC, Instant::now());
        if action == InterruptAction::Warn {
            self.view.set_message(WARN_MESSAGE);
            self.dirty = true;
        }
        action
    }
}
