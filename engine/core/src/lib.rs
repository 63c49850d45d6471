//! Game of Life Engine - Headless Parallel Simulation
//!
//! This crate runs Conway's Game of Life on a toroidal board, splitting each
//! turn across strip workers, and talks to the outside world only through
//! two bounded queues: key presses in, events out. It knows nothing about
//! terminals or rendering.
//!
//! # Architecture
//!
//! ```text
//!        keys (s/p/q/k)                         Event stream
//!   ─────────────────────┐               ┌─────────────────────────►
//!                        ▼               │
//! ┌──────────────────────────────────────┴────────────────────────┐
//! │                           Engine                              │
//! │  ┌────────────────┐  ┌──────────────────┐  ┌───────────────┐  │
//! │  │ ControlHandler │  │ TurnCoordinator  │  │  Broadcaster  │  │
//! │  │                │  │  (owns Board)    │  │ (+2s ticker)  │  │
//! │  └────────────────┘  └────────┬─────────┘  └───────────────┘  │
//! │                      halo rows│ ▲ strip rows                  │
//! │            ┌──────────┬───────┴─┴┬──────────┐                 │
//! │            │ strip 0  │ strip 1  │ strip N  │ blocking pool   │
//! │            └──────────┴──────────┴──────────┘                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Board`]: the grid and the transition rule
//! - [`TurnCoordinator`]: advances the board one turn at a time
//! - [`Event`]: everything the engine reports
//! - [`Engine`]: a full run, from first turn to final events
//! - [`EngineConfig`]: run parameters
//!
//! # Quick Start
//!
//! ```ignore
//! use gol_engine::{run, Board, EngineConfig, Event};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = EngineConfig::new(8, 64, 64, 100);
//!     let board = Board::random(64, 64, 7, 0.25);
//!
//!     let (events_tx, mut events_rx) = mpsc::channel(config.event_capacity);
//!     let (_keys_tx, keys_rx) = mpsc::channel(config.control_capacity);
//!
//!     let engine = tokio::spawn(run(config, board, events_tx, keys_rx));
//!     while let Some(event) = events_rx.recv().await {
//!         if let Event::FinalTurnComplete { completed_turns, board } = event {
//!             println!("{completed_turns}: {} alive", board.alive_count());
//!         }
//!     }
//!     engine.await.unwrap().unwrap();
//! }
//! ```

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod barrier;
pub mod board;
pub mod broadcaster;
pub mod config;
pub mod control;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;
pub mod pgm;
pub mod snapshot;
pub mod strip;

pub use board::{Board, BoardError, Cell, CellState};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    EngineConfig,
};
pub use control::ControlSignal;
pub use coordinator::{StripWorker, TurnCoordinator, TurnOutcome, TurnPhase};
pub use engine::{run, Engine, RunOutcome, RunSummary};
pub use error::EngineError;
pub use events::{Event, State};
pub use pgm::{load_board, PgmError};
pub use snapshot::{MemorySnapshotSink, PgmSnapshotWriter, SnapshotError, SnapshotSink};
