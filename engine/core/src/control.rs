//! Control Handler
//!
//! Interprets single-character key presses from the inbound queue.
//!
//! | Key | Signal        | Effect                                   |
//! |-----|---------------|------------------------------------------|
//! | `s` | `Save`        | snapshot the current board               |
//! | `p` | `PauseToggle` | suspend or resume turns                  |
//! | `q` | `Quit`        | orderly finish with final events         |
//! | `k` | `KillAll`     | stop immediately, no final events        |
//!
//! Anything else is ignored.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A recognised control key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    /// Write a snapshot of the current board
    Save,
    /// Suspend or resume turns
    PauseToggle,
    /// Finish in an orderly way
    Quit,
    /// Stop immediately
    KillAll,
}

impl ControlSignal {
    /// Map a key press to a signal
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            's' => Some(Self::Save),
            'p' => Some(Self::PauseToggle),
            'q' => Some(Self::Quit),
            'k' => Some(Self::KillAll),
            _ => None,
        }
    }

    /// The key that produces this signal
    #[must_use]
    pub fn key(&self) -> char {
        match self {
            Self::Save => 's',
            Self::PauseToggle => 'p',
            Self::Quit => 'q',
            Self::KillAll => 'k',
        }
    }
}

/// Reads key presses and yields control signals
#[derive(Debug)]
pub struct ControlHandler {
    keys: mpsc::Receiver<char>,
    closed: bool,
}

impl ControlHandler {
    /// Handler over the inbound key queue
    #[must_use]
    pub fn new(keys: mpsc::Receiver<char>) -> Self {
        Self {
            keys,
            closed: false,
        }
    }

    /// Whether the key sender has gone away
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next queued signal without waiting
    pub fn try_next(&mut self) -> Option<ControlSignal> {
        loop {
            match self.keys.try_recv() {
                Ok(key) => match ControlSignal::from_key(key) {
                    Some(signal) => return Some(signal),
                    None => debug!(key = ?key, "Ignoring unrecognised key"),
                },
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if !self.closed {
                        debug!("Key channel closed");
                        self.closed = true;
                    }
                    return None;
                }
            }
        }
    }

    /// Every signal currently queued, in arrival order
    pub fn drain_pending(&mut self) -> Vec<ControlSignal> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for a signal while paused
    ///
    /// A closed key channel yields `Quit`, since nothing could ever resume.
    pub async fn next_while_paused(&mut self) -> ControlSignal {
        while let Some(key) = self.keys.recv().await {
            match ControlSignal::from_key(key) {
                Some(signal) => return signal,
                None => debug!(key = ?key, "Ignoring unrecognised key"),
            }
        }

        self.closed = true;
        warn!("Key channel closed while paused, quitting");
        ControlSignal::Quit
    }
}
