//! Engine Events
//!
//! Everything the engine reports to the outside world flows through one
//! bounded queue as an [`Event`]. Consumers (a renderer, a test harness, a
//! file writer) match exhaustively on the variant.
//!
//! # Ordering
//!
//! For a single turn the engine emits every `CellFlipped` (row-major) before
//! that turn's `TurnComplete`. Across turns, `completed_turns` never goes
//! backwards. `FinalTurnComplete` is the last board-bearing event of a run.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};

/// Execution state reported through [`Event::StateChange`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Turns are suspended
    Paused,
    /// Turns are running
    Executing,
    /// The run is shutting down
    Quitting,
}

impl State {
    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paused => "Paused",
            Self::Executing => "Executing",
            Self::Quitting => "Quitting",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Events from the engine to its consumers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Periodic live-cell count, never reported for turn 0
    AliveCellsCount {
        /// Turns finished when the count was taken
        completed_turns: u64,
        /// Live cells on the board after `completed_turns` turns
        cells_count: usize,
    },

    /// A board snapshot was written
    ImageOutputComplete {
        /// Turn the snapshot was taken at
        completed_turns: u64,
        /// Artifact name, `{width}x{height}x{turns}`
        filename: String,
    },

    /// Execution state changed
    StateChange {
        /// Turns finished at the time of the change
        completed_turns: u64,
        /// The new state
        new_state: State,
    },

    /// A cell changed state during the turn
    CellFlipped {
        /// The turn that produced the flip
        completed_turns: u64,
        /// Coordinate of the flipped cell
        cell: Cell,
    },

    /// A turn finished
    TurnComplete {
        /// Turns finished so far
        completed_turns: u64,
    },

    /// The run finished; carries the final board
    FinalTurnComplete {
        /// Turns finished in total
        completed_turns: u64,
        /// The last assembled board
        board: Arc<Board>,
    },
}

impl Event {
    /// Turn counter carried by every variant
    #[must_use]
    pub fn completed_turns(&self) -> u64 {
        match self {
            Self::AliveCellsCount {
                completed_turns, ..
            }
            | Self::ImageOutputComplete {
                completed_turns, ..
            }
            | Self::StateChange {
                completed_turns, ..
            }
            | Self::CellFlipped {
                completed_turns, ..
            }
            | Self::TurnComplete { completed_turns }
            | Self::FinalTurnComplete {
                completed_turns, ..
            } => *completed_turns,
        }
    }

    /// Live cells of the final board, row-major
    #[must_use]
    pub fn final_alive_cells(&self) -> Option<Vec<Cell>> {
        match self {
            Self::FinalTurnComplete { board, .. } => Some(board.alive_cells()),
            _ => None,
        }
    }
}

/// One-line summary; per-turn noise (flips, turn ticks) renders empty
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AliveCellsCount { cells_count, .. } => write!(f, "Alive Cells {cells_count}"),
            Self::ImageOutputComplete { filename, .. } => {
                write!(f, "File {filename} Output Complete")
            }
            Self::StateChange { new_state, .. } => write!(f, "{new_state}"),
            Self::CellFlipped { .. } | Self::TurnComplete { .. } => Ok(()),
            Self::FinalTurnComplete { board, .. } => {
                write!(f, "Final Turn Complete ({} alive)", board.alive_count())
            }
        }
    }
}
