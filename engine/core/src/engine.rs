//! Engine Driver
//!
//! Ties the coordinator, broadcaster and control handler into one run.
//!
//! # Turn Boundary
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ service queued keys (s / p / q / k)                      │
//!   │ turn limit reached? ──────────────────────► finish       │
//!   │ run_turn ─► CellFlipped… TurnComplete ─► poll ticker     │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! An orderly finish (turn limit or `q`) emits `FinalTurnComplete`, writes a
//! snapshot and emits `ImageOutputComplete`, then `StateChange(Quitting)`.
//! `k` stops without any of these. Either way the event sender is dropped
//! when `run` returns, which closes the stream for consumers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::broadcaster::EventBroadcaster;
use crate::config::{ConfigError, EngineConfig};
use crate::control::{ControlHandler, ControlSignal};
use crate::coordinator::TurnCoordinator;
use crate::error::EngineError;
use crate::events::{Event, State};
use crate::snapshot::{PgmSnapshotWriter, SnapshotSink};

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The turn limit was reached
    Completed,
    /// Stopped by `q`
    Quit,
    /// Stopped by `k`, without final events
    Killed,
}

/// Summary returned when a run ends without error
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Turns finished in total
    pub completed_turns: u64,
    /// Live cells on the last board
    pub alive_count: usize,
    /// Why the run stopped
    pub outcome: RunOutcome,
}

enum Flow {
    Continue,
    Stop(RunOutcome),
}

/// One simulation run
pub struct Engine<S: SnapshotSink> {
    config: EngineConfig,
    coordinator: TurnCoordinator,
    events: mpsc::Sender<Event>,
    control: ControlHandler,
    snapshots: S,
}

impl<S: SnapshotSink> Engine<S> {
    /// Validate `config` against `board` and prepare a run
    pub fn new(
        config: EngineConfig,
        board: Board,
        events: mpsc::Sender<Event>,
        keys: mpsc::Receiver<char>,
        snapshots: S,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if board.width() != config.image_width || board.height() != config.image_height {
            return Err(ConfigError::Invalid(format!(
                "board is {}x{} but configuration expects {}x{}",
                board.width(),
                board.height(),
                config.image_width,
                config.image_height
            ))
            .into());
        }

        let coordinator = TurnCoordinator::new(board, config.threads);
        Ok(Self {
            config,
            coordinator,
            events,
            control: ControlHandler::new(keys),
            snapshots,
        })
    }

    /// Run until the turn limit, `q`, `k`, or a fatal error
    pub async fn run(self) -> Result<RunSummary, EngineError> {
        let Self {
            config,
            coordinator,
            events,
            control,
            snapshots,
        } = self;

        info!(
            threads = config.threads,
            workers = coordinator.strips().len(),
            width = config.image_width,
            height = config.image_height,
            turns = config.turns,
            "Engine starting"
        );

        let mut driver = Driver {
            broadcaster: EventBroadcaster::new(events, config.tick_interval),
            turn_limit: config.turns,
            coordinator,
            control,
            snapshots,
        };

        let result = driver.drive().await;
        driver.coordinator.terminate();

        match &result {
            Ok(summary) => info!(
                turns = summary.completed_turns,
                alive = summary.alive_count,
                outcome = ?summary.outcome,
                "Engine stopped"
            ),
            Err(e) => warn!(
                turns = driver.coordinator.completed_turns(),
                error = %e,
                "Engine failed"
            ),
        }
        result
    }
}

/// Run `board` with `config`, writing snapshots under `config.output_dir`
pub async fn run(
    config: EngineConfig,
    board: Board,
    events: mpsc::Sender<Event>,
    keys: mpsc::Receiver<char>,
) -> Result<RunSummary, EngineError> {
    let snapshots = PgmSnapshotWriter::new(config.output_dir.clone());
    Engine::new(config, board, events, keys, snapshots)?
        .run()
        .await
}

struct Driver<S> {
    coordinator: TurnCoordinator,
    broadcaster: EventBroadcaster,
    control: ControlHandler,
    snapshots: S,
    turn_limit: u64,
}

impl<S: SnapshotSink> Driver<S> {
    async fn drive(&mut self) -> Result<RunSummary, EngineError> {
        let outcome = loop {
            if let Flow::Stop(outcome) = self.service_controls().await? {
                break outcome;
            }

            if self.coordinator.completed_turns() >= self.turn_limit {
                break RunOutcome::Completed;
            }

            let turn = self.coordinator.run_turn().await?;
            self.broadcaster.publish_turn(&turn).await?;
            self.broadcaster
                .poll_alive_count(turn.completed_turns, turn.alive_count)
                .await?;
        };

        if outcome != RunOutcome::Killed {
            self.finish().await?;
        }

        Ok(RunSummary {
            completed_turns: self.coordinator.completed_turns(),
            alive_count: self.coordinator.board().alive_count(),
            outcome,
        })
    }

    /// Handle queued keys one at a time
    ///
    /// `p` hands the queue to the paused loop, so keys are never read ahead.
    async fn service_controls(&mut self) -> Result<Flow, EngineError> {
        while let Some(signal) = self.control.try_next() {
            let flow = match signal {
                ControlSignal::Save => {
                    self.save().await?;
                    Flow::Continue
                }
                ControlSignal::PauseToggle => self.paused().await?,
                ControlSignal::Quit => Flow::Stop(RunOutcome::Quit),
                ControlSignal::KillAll => Flow::Stop(RunOutcome::Killed),
            };
            if let Flow::Stop(_) = flow {
                return Ok(flow);
            }
        }
        Ok(Flow::Continue)
    }

    async fn paused(&mut self) -> Result<Flow, EngineError> {
        let turn = self.coordinator.completed_turns();
        self.coordinator.pause();
        self.broadcaster.state_change(turn, State::Paused).await?;
        info!(turn = turn, "Paused");

        loop {
            tokio::select! {
                signal = self.control.next_while_paused() => match signal {
                    ControlSignal::PauseToggle => {
                        self.coordinator.resume();
                        self.broadcaster.state_change(turn, State::Executing).await?;
                        info!(turn = turn, "Resumed");
                        return Ok(Flow::Continue);
                    }
                    ControlSignal::Save => self.save().await?,
                    ControlSignal::Quit => return Ok(Flow::Stop(RunOutcome::Quit)),
                    ControlSignal::KillAll => return Ok(Flow::Stop(RunOutcome::Killed)),
                },
                () = self.broadcaster.next_tick() => {
                    let alive = self.coordinator.board().alive_count();
                    self.broadcaster.report_alive_count(turn, alive).await?;
                }
            }
        }
    }

    /// Snapshot the current board; failures are logged, not fatal
    async fn save(&mut self) -> Result<(), EngineError> {
        let turn = self.coordinator.completed_turns();
        let board = Arc::clone(self.coordinator.board());

        match self.snapshots.write_snapshot(&board, turn).await {
            Ok(name) => {
                debug!(turn = turn, name = %name, "Snapshot saved");
                self.broadcaster.image_output(turn, name).await
            }
            Err(e) => {
                warn!(turn = turn, error = %e, "Snapshot failed, continuing");
                Ok(())
            }
        }
    }

    async fn finish(&mut self) -> Result<(), EngineError> {
        self.coordinator.terminate();
        let turn = self.coordinator.completed_turns();
        let board = Arc::clone(self.coordinator.board());

        self.broadcaster.final_turn(turn, board).await?;
        self.save().await?;
        self.broadcaster.state_change(turn, State::Quitting).await
    }
}
