//! Interrupt Guard
//!
//! The first interrupt only warns. A second one inside the window
//! force-quits the process; after the window lapses the next interrupt warns
//! again. SIGINT and SIGTERM share one guard, so any mix of the two counts.
//!
//! ```text
//!            interrupt / Warn
//!   Idle ─────────────────────────► Armed { until }
//!    ▲                                 │  interrupt before `until`
//!    │ interrupt after `until` / Warn  ▼
//!    └──────────────────────────── ForceQuit
//! ```

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

/// Window in which a second interrupt force-quits
pub const FORCE_QUIT_WINDOW: Duration = Duration::from_secs(4);

/// Printed on the first interrupt
pub const WARN_MESSAGE: &str = "Press Ctrl+C again to force quit";

/// Printed when force-quitting
pub const FORCE_QUIT_MESSAGE: &str = "Force quit by the user";

/// What the caller should do about an interrupt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptAction {
    /// Tell the user a second interrupt will quit
    Warn,
    /// Exit now
    ForceQuit,
}

/// A process signal fed to the guard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// SIGINT, or Ctrl+C outside raw mode
    CtrlC,
    /// SIGTERM
    Terminate,
}

impl Interrupt {
    /// Signal name for logs
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CtrlC => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GuardState {
    Idle,
    Armed { until: Instant },
}

/// Two-stage Ctrl+C handling
#[derive(Clone, Debug)]
pub struct InterruptGuard {
    window: Duration,
    state: GuardState,
}

impl Default for InterruptGuard {
    fn default() -> Self {
        Self::new(FORCE_QUIT_WINDOW)
    }
}

impl InterruptGuard {
    /// Guard with a custom window
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: GuardState::Idle,
        }
    }

    /// Whether a second interrupt at `now` would force-quit
    #[must_use]
    pub fn is_armed(&self, now: Instant) -> bool {
        matches!(self.state, GuardState::Armed { until } if now < until)
    }

    /// Record an interrupt received at `now`
    pub fn on_interrupt(&mut self, now: Instant) -> InterruptAction {
        if self.is_armed(now) {
            self.state = GuardState::Idle;
            InterruptAction::ForceQuit
        } else {
            self.state = GuardState::Armed {
                until: now + self.window,
            };
            InterruptAction::Warn
        }
    }

    /// Record a process signal received at `now`
    pub fn on_signal(&mut self, signal: Interrupt, now: Instant) -> InterruptAction {
        let action = self.on_interrupt(now);
        match action {
            InterruptAction::Warn => {
                warn!(signal = signal.name(), "Signal received, waiting for confirmation");
            }
            InterruptAction::ForceQuit => info!(signal = signal.name(), "Force quit"),
        }
        action
    }
}

/// Failed to install a signal handler
#[derive(Debug, Error)]
#[error("failed to install {signal} handler: {source}")]
pub struct SignalError {
    signal: &'static str,
    source: std::io::Error,
}

/// Watch process signals for the lifetime of the program
///
/// Every SIGINT and SIGTERM goes through the same guard.
pub async fn watch_interrupts() -> Result<(), SignalError> {
    let mut guard = InterruptGuard::default();

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(|source| SignalError {
            signal: "SIGTERM",
            source,
        })?;

    loop {
        #[cfg(unix)]
        let signal = next_interrupt(&mut sigterm).await?;
        #[cfg(not(unix))]
        let signal = next_interrupt().await?;

        match guard.on_signal(signal, Instant::now()) {
            InterruptAction::Warn => eprintln!("\n{WARN_MESSAGE}"),
            InterruptAction::ForceQuit => {
                eprintln!("\n{FORCE_QUIT_MESSAGE}");
                std::process::exit(0);
            }
        }
    }
}

#[cfg(unix)]
async fn next_interrupt(
    sigterm: &mut tokio::signal::unix::Signal,
) -> Result<Interrupt, SignalError> {
    tokio::select! {
        result = tokio::signal::ctrl_c() => result
            .map(|()| Interrupt::CtrlC)
            .map_err(|source| SignalError { signal: "SIGINT", source }),
        _ = sigterm.recv() => Ok(Interrupt::Terminate),
    }
}

#[cfg(not(unix))]
async fn next_interrupt() -> Result<Interrupt, SignalError> {
    tokio::signal::ctrl_c()
        .await
        .map(|()| Interrupt::CtrlC)
        .map_err(|source| SignalError {
            signal: "Ctrl+C",
            source,
        })
}
