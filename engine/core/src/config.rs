//! Engine Configuration
//!
//! Simulation parameters plus queue headroom and ticker cadence, loaded from
//! an optional TOML file at `~/.config/gol/engine.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! threads = 8
//! image_width = 512
//! image_height = 512
//! turns = 10000000000
//! event_capacity = 1000
//! control_capacity = 10
//! tick_interval_ms = 2000
//! output_dir = "out"
//! ```
//!
//! # Environment Variables
//!
//! - `GOL_THREADS`: worker count
//! - `GOL_WIDTH`, `GOL_HEIGHT`: board dimensions
//! - `GOL_TURNS`: turn limit
//! - `GOL_OUTPUT_DIR`: snapshot directory
//!
//! Unparsable values are ignored and the lower-priority value stands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strip::effective_workers;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Default worker count
pub const DEFAULT_THREADS: usize = 8;

/// Default board side length
pub const DEFAULT_DIMENSION: usize = 512;

/// Default turn limit
pub const DEFAULT_TURNS: u64 = 10_000_000_000;

/// Default outbound event queue capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Default inbound key queue capacity
pub const DEFAULT_CONTROL_CAPACITY: usize = 10;

/// Default alive-count ticker period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Runtime parameters for one simulation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Requested strip workers (clamped to the board height)
    pub threads: usize,
    /// Board width in cells
    pub image_width: usize,
    /// Board height in cells
    pub image_height: usize,
    /// Number of turns to run before stopping
    pub turns: u64,
    /// Outbound event queue capacity
    pub event_capacity: usize,
    /// Inbound key queue capacity
    pub control_capacity: usize,
    /// Alive-count ticker period
    pub tick_interval: Duration,
    /// Where snapshots are written
    pub output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            image_width: DEFAULT_DIMENSION,
            image_height: DEFAULT_DIMENSION,
            turns: DEFAULT_TURNS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            control_capacity: DEFAULT_CONTROL_CAPACITY,
            tick_interval: DEFAULT_TICK_INTERVAL,
            output_dir: PathBuf::from("out"),
        }
    }
}

impl EngineConfig {
    /// Defaults with the given board parameters
    #[must_use]
    pub fn new(threads: usize, image_width: usize, image_height: usize, turns: u64) -> Self {
        Self {
            threads,
            image_width,
            image_height,
            turns,
            ..Self::default()
        }
    }

    /// Set the worker count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the turn limit
    #[must_use]
    pub fn with_turns(mut self, turns: u64) -> Self {
        self.turns = turns;
        self
    }

    /// Set the ticker period
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the outbound event queue capacity
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the snapshot directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Worker count actually used for this board
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        effective_workers(self.image_height, self.threads)
    }

    /// Reject parameters no run could start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "board dimensions must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if self.event_capacity == 0 || self.control_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue capacities must be at least 1".into(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[engine]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Worker count
    pub threads: Option<usize>,

    /// Board width in cells
    pub image_width: Option<usize>,

    /// Board height in cells
    pub image_height: Option<usize>,

    /// Turn limit
    pub turns: Option<u64>,

    /// Outbound event queue capacity
    pub event_capacity: Option<usize>,

    /// Inbound key queue capacity
    pub control_capacity: Option<usize>,

    /// Alive-count ticker period in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Snapshot directory
    pub output_dir: Option<String>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Engine parameters
    pub engine: EngineToml,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default configuration file path
///
/// Returns `~/.config/gol/engine.toml` (or the XDG equivalent).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gol").join("engine.toml"))
}

/// Load configuration from the default location
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path, then apply the environment
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config_from_path(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let file: ConfigFile = toml::from_str(&content)?;
            apply_toml_config(&mut config, &file.engine);

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_with(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) {
    if let Some(threads) = toml.threads {
        config.threads = threads;
    }
    if let Some(width) = toml.image_width {
        config.image_width = width;
    }
    if let Some(height) = toml.image_height {
        config.image_height = height;
    }
    if let Some(turns) = toml.turns {
        config.turns = turns;
    }
    if let Some(capacity) = toml.event_capacity {
        config.event_capacity = capacity;
    }
    if let Some(capacity) = toml.control_capacity {
        config.control_capacity = capacity;
    }
    if let Some(ms) = toml.tick_interval_ms {
        config.tick_interval = Duration::from_millis(ms);
    }
    if let Some(ref dir) = toml.output_dir {
        config.output_dir = PathBuf::from(dir);
    }
}

/// Overlay environment variables using `lookup` as the source
fn apply_env_with(config: &mut EngineConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(threads) = lookup("GOL_THREADS").and_then(|v| v.parse().ok()) {
        config.threads = threads;
    }
    if let Some(width) = lookup("GOL_WIDTH").and_then(|v| v.parse().ok()) {
        config.image_width = width;
    }
    if let Some(height) = lookup("GOL_HEIGHT").and_then(|v| v.parse().ok()) {
        config.image_height = height;
    }
    if let Some(turns) = lookup("GOL_TURNS").and_then(|v| v.parse().ok()) {
        config.turns = turns;
    }
    if let Some(dir) = lookup("GOL_OUTPUT_DIR") {
        if !dir.is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values supplied on the command line, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Worker count
    pub threads: Option<usize>,
    /// Board width
    pub image_width: Option<usize>,
    /// Board height
    pub image_height: Option<usize>,
    /// Turn limit
    pub turns: Option<u64>,
    /// Snapshot directory
    pub output_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the worker count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Override both board dimensions
    #[must_use]
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }

    /// Override the turn limit
    #[must_use]
    pub fn with_turns(mut self, turns: u64) -> Self {
        self.turns = Some(turns);
        self
    }

    /// Override the snapshot directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Apply the overrides to `config`
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(width) = self.image_width {
            config.image_width = width;
        }
        if let Some(height) = self.image_height {
            config.image_height = height;
        }
        if let Some(turns) = self.turns {
            config.turns = turns;
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
