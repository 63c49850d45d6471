//! Turn Coordinator
//!
//! Owns the authoritative board between turns and advances it one
//! generation at a time by fanning strips out to workers.
//!
//! # Turn Lifecycle
//!
//! ```text
//!           run_turn()                 all strips arrived
//!   Idle ─────────────────► RunningTurn ──────────────────► Assembling
//!    ▲  │                        │ worker failed                 │
//!    │  │ pause()                ▼                               │
//!    │  ▼                     Terminal ◄──── terminate() ────────┤
//!   Paused                                                       │
//!    │  resume()                                                 │
//!    └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Philosophy
//!
//! Workers never see the live board. Each receives a copy of its rows and
//! two halo rows, computes on the blocking pool, and hands back only its own
//! rows. The coordinator publishes a new board only after every strip has
//! reported, so a turn is never observed half-applied.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::barrier::StripBarrier;
use crate::board::{Board, Cell};
use crate::error::EngineError;
use crate::strip::{compute_strip, partition, Strip, StripInput, StripOutput};

/// Per-strip computation run on the blocking pool
pub type StripWorker = fn(&StripInput) -> StripOutput;

/// Where the coordinator is in its turn lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// Between turns, ready to start one
    Idle,
    /// Strips dispatched, waiting on the barrier
    RunningTurn,
    /// All strips in, building the next board
    Assembling,
    /// Suspended between turns
    Paused,
    /// No further turns will run
    Terminal,
}

/// Result of one completed turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Turns finished, including this one
    pub completed_turns: u64,
    /// Cells that changed state, row-major
    pub flipped: Vec<Cell>,
    /// Live cells on the new board
    pub alive_count: usize,
}

/// Drives turns over a fixed set of strips
#[derive(Debug)]
pub struct TurnCoordinator {
    board: Arc<Board>,
    strips: Vec<Strip>,
    worker: StripWorker,
    completed_turns: u64,
    phase: TurnPhase,
}

impl TurnCoordinator {
    /// Coordinator for `board` split across `workers` strips
    ///
    /// The worker count is clamped to the board height.
    #[must_use]
    pub fn new(board: Board, workers: usize) -> Self {
        Self::with_worker(board, workers, compute_strip)
    }

    /// Coordinator that computes each strip with `worker`
    #[must_use]
    pub fn with_worker(board: Board, workers: usize, worker: StripWorker) -> Self {
        let strips = partition(board.height(), workers);
        debug!(
            width = board.width(),
            height = board.height(),
            strips = strips.len(),
            "Turn coordinator ready"
        );

        Self {
            board: Arc::new(board),
            strips,
            worker,
            completed_turns: 0,
            phase: TurnPhase::Idle,
        }
    }

    /// The board after `completed_turns` turns
    #[must_use]
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Turns finished so far
    #[must_use]
    pub fn completed_turns(&self) -> u64 {
        self.completed_turns
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The strips each turn is split into
    #[must_use]
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    /// Advance the board by one turn
    ///
    /// Any failure leaves the coordinator `Terminal` with the previous board
    /// still in place.
    pub async fn run_turn(&mut self) -> Result<TurnOutcome, EngineError> {
        if self.phase != TurnPhase::Idle {
            return Err(EngineError::NotIdle { phase: self.phase });
        }

        self.phase = TurnPhase::RunningTurn;
        match self.advance().await {
            Ok(outcome) => {
                self.phase = TurnPhase::Idle;
                Ok(outcome)
            }
            Err(e) => {
                self.phase = TurnPhase::Terminal;
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<TurnOutcome, EngineError> {
        let worker = self.worker;
        let mut workers = JoinSet::new();
        for strip in &self.strips {
            let input = StripInput::gather(&self.board, *strip);
            workers.spawn_blocking(move || worker(&input));
        }

        let mut barrier = StripBarrier::new(self.strips.len());
        while let Some(joined) = workers.join_next().await {
            let output = joined.map_err(|e| EngineError::WorkerFailed {
                reason: e.to_string(),
            })?;
            barrier.arrive(output)?;
        }

        self.phase = TurnPhase::Assembling;
        let width = self.board.width();
        let height = self.board.height();
        let mut cells = Vec::with_capacity(width * height);
        for output in barrier.into_outputs()? {
            cells.extend(output.rows);
        }

        let next = Board::from_cells(width, height, cells)?;
        let flipped = self.board.flipped_cells(&next);
        let alive_count = next.alive_count();

        self.board = Arc::new(next);
        self.completed_turns += 1;

        trace!(
            turn = self.completed_turns,
            flipped = flipped.len(),
            alive = alive_count,
            "Turn complete"
        );

        Ok(TurnOutcome {
            completed_turns: self.completed_turns,
            flipped,
            alive_count,
        })
    }

    /// Suspend turns; returns whether the transition happened
    pub fn pause(&mut self) -> bool {
        self.transition(TurnPhase::Idle, TurnPhase::Paused)
    }

    /// Resume turns; returns whether the transition happened
    pub fn resume(&mut self) -> bool {
        self.transition(TurnPhase::Paused, TurnPhase::Idle)
    }

    /// Stop for good
    pub fn terminate(&mut self) {
        if self.phase != TurnPhase::Terminal {
            debug!(from = ?self.phase, turn = self.completed_turns, "Coordinator terminated");
            self.phase = TurnPhase::Terminal;
        }
    }

    fn transition(&mut self, from: TurnPhase, to: TurnPhase) -> bool {
        if self.phase == from {
            debug!(from = ?from, to = ?to, turn = self.completed_turns, "Phase change");
            self.phase = to;
            true
        } else {
            warn!(
                current = ?self.phase,
                requested = ?to,
                "Ignoring illegal phase transition"
            );
            false
        }
    }
}
