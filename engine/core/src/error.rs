//! Engine Errors
//!
//! Turn progression and assembly failures surface here and terminate the
//! run. Snapshot failures are deliberately absent: they are logged and the
//! simulation carries on.

use thiserror::Error;

use crate::barrier::BarrierError;
use crate::board::BoardError;
use crate::config::ConfigError;
use crate::coordinator::TurnPhase;

/// Fatal engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected at startup, before any turn runs
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The assembled strips did not form a valid board
    #[error("board assembly failed: {0}")]
    Board(#[from] BoardError),

    /// A strip worker panicked or was cancelled
    #[error("strip worker failed: {reason}")]
    WorkerFailed {
        /// Panic or cancellation description
        reason: String,
    },

    /// Workers broke the one-result-per-strip contract
    #[error(transparent)]
    Barrier(#[from] BarrierError),

    /// A turn was requested outside the `Idle` phase
    #[error("cannot start a turn while the coordinator is {phase:?}")]
    NotIdle {
        /// Phase at the time of the request
        phase: TurnPhase,
    },

    /// The event consumer hung up
    #[error("event channel closed by consumer")]
    EventChannelClosed,
}
