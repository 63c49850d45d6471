//! Event Broadcaster
//!
//! Single producer for the outbound event queue, plus the free-running
//! alive-count ticker.
//!
//! The ticker is sampled only at turn boundaries (or awaited directly while
//! paused), so every reported count matches a fully assembled board. Ticks
//! that elapse while a long turn runs collapse into one report.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::trace;

use crate::board::Board;
use crate::coordinator::TurnOutcome;
use crate::error::EngineError;
use crate::events::{Event, State};

/// Sends engine events and owns the alive-count ticker
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct EventBroadcaster {
    tx: mpsc::Sender<Event>,
    ticker: Interval,
}

impl EventBroadcaster {
    /// Broadcaster whose first tick fires one `tick_interval` from now
    #[must_use]
    pub fn new(tx: mpsc::Sender<Event>, tick_interval: Duration) -> Self {
        let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { tx, ticker }
    }

    /// Send one event, waiting for queue capacity
    pub async fn emit(&self, event: Event) -> Result<(), EngineError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| EngineError::EventChannelClosed)
    }

    /// Flips for the turn in row-major order, then `TurnComplete`
    pub async fn publish_turn(&self, outcome: &TurnOutcome) -> Result<(), EngineError> {
        let completed_turns = outcome.completed_turns;
        for cell in &outcome.flipped {
            self.emit(Event::CellFlipped {
                completed_turns,
                cell: *cell,
            })
            .await?;
        }
        self.emit(Event::TurnComplete { completed_turns }).await
    }

    /// Report the count if a tick has elapsed since the last report
    ///
    /// Never waits on the ticker. Returns whether a count was sent.
    pub async fn poll_alive_count(
        &mut self,
        completed_turns: u64,
        cells_count: usize,
    ) -> Result<bool, EngineError> {
        if self.ticker.tick().now_or_never().is_none() {
            return Ok(false);
        }
        self.report_alive_count(completed_turns, cells_count).await
    }

    /// Wait for the next tick
    pub async fn next_tick(&mut self) {
        self.ticker.tick().await;
    }

    /// Send `AliveCellsCount` unless no turn has completed yet
    pub async fn report_alive_count(
        &self,
        completed_turns: u64,
        cells_count: usize,
    ) -> Result<bool, EngineError> {
        if completed_turns == 0 {
            trace!("Tick before first turn, count suppressed");
            return Ok(false);
        }
        self.emit(Event::AliveCellsCount {
            completed_turns,
            cells_count,
        })
        .await?;
        Ok(true)
    }

    /// Announce a state change
    pub async fn state_change(&self, completed_turns: u64, new_state: State) -> Result<(), EngineError> {
        self.emit(Event::StateChange {
            completed_turns,
            new_state,
        })
        .await
    }

    /// Announce a written snapshot
    pub async fn image_output(&self, completed_turns: u64, filename: String) -> Result<(), EngineError> {
        self.emit(Event::ImageOutputComplete {
            completed_turns,
            filename,
        })
        .await
    }

    /// Announce the end of the run with the final board
    pub async fn final_turn(&self, completed_turns: u64, board: Arc<Board>) -> Result<(), EngineError> {
        self.emit(Event::FinalTurnComplete {
            completed_turns,
            board,
        })
        .await
    }
}
