//! Game of Life Entry Point
//!
//! Usage:
//!   gol [OPTIONS]
//!
//! Options:
//!   -t, --threads <N>     Strip workers (default: 8)
//!   -w, --width <CELLS>   Board width (default: 512)
//!   -h, --height <CELLS>  Board height (default: 512)
//!   --turns <N>           Turns to run (default: 10000000000)
//!   --headless            Print events instead of drawing the board
//!   --random <SEED>       Start from a seeded soup instead of an image

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{error, info};

use gol_engine::{
    load_board, load_config, load_config_from_path, Board, ConfigOverrides, EngineConfig, Event,
};
use gol_tui::headless;
use gol_tui::interrupt::{watch_interrupts, FORCE_QUIT_MESSAGE};
use gol_tui::{App, AppExit};

/// Density of `--random` boards
const RANDOM_DENSITY: f64 = 0.25;

/// Parallel Game of Life
#[derive(Parser, Debug)]
#[command(name = "gol")]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Number of strip workers
    #[arg(short = 't', long, value_name = "N")]
    threads: Option<usize>,

    /// Board width in cells
    #[arg(short = 'w', long, value_name = "CELLS")]
    width: Option<usize>,

    /// Board height in cells
    #[arg(short = 'h', long, value_name = "CELLS")]
    height: Option<usize>,

    /// Number of turns to run
    #[arg(long, value_name = "N")]
    turns: Option<u64>,

    /// Print events to stdout instead of drawing the board
    #[arg(long)]
    headless: bool,

    /// Directory holding `{width}x{height}.pgm` input images
    #[arg(long, value_name = "DIR", default_value = "images")]
    images: PathBuf,

    /// Directory snapshots are written to
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Start from a seeded random board instead of an image
    #[arg(long, value_name = "SEED")]
    random: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "GOL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (terminal mode logs nowhere otherwise)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            threads: self.threads,
            image_width: self.width,
            image_height: self.height,
            turns: self.turns,
            output_dir: self.out.clone(),
        }
    }
}

/// Initialize logging
///
/// Headless runs log to stderr. Terminal runs log only to `--log-file`, so
/// the alternate screen stays clean.
fn init_logging(args: &Args) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gol=info,gol_tui=info,gol_engine=info"));

    if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

fn resolve_config(args: &Args) -> Result<EngineConfig> {
    let loaded = match args.config {
        Some(ref path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            load_config_from_path(Some(path.as_path()))
        }
        None => load_config(),
    };

    let mut config = loaded.context("failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn initial_board(args: &Args, config: &EngineConfig) -> Result<Board> {
    let (width, height) = (config.image_width, config.image_height);
    if let Some(seed) = args.random {
        return Ok(Board::random(width, height, seed, RANDOM_DENSITY));
    }

    let path = args.images.join(format!("{width}x{height}.pgm"));
    load_board(&path, width, height)
        .await
        .with_context(|| format!("failed to load initial board from {}", path.display()))
}

fn parameters(config: &EngineConfig) -> String {
    [
        ("Threads", config.threads.to_string()),
        ("Width", config.image_width.to_string()),
        ("Height", config.image_height.to_string()),
        ("Turns", config.turns.to_string()),
    ]
    .iter()
    .map(|(label, value)| format!("{label:<10} {value}\n"))
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = resolve_config(&args)?;
    print!("{}", parameters(&config));

    let board = initial_board(&args, &config).await?;

    let (events_tx, events_rx) = mpsc::channel::<Event>(config.event_capacity);
    let (keys_tx, keys_rx) = mpsc::channel::<char>(config.control_capacity);

    tokio::spawn(async {
        if let Err(e) = watch_interrupts().await {
            error!(error = %e, "Signal handling unavailable");
        }
    });

    let engine = tokio::spawn(gol_engine::run(config, board.clone(), events_tx, keys_rx));

    if args.headless {
        headless::forward_stdin(keys_tx);
        headless::print_events(events_rx, io::stdout()).await?;
    } else if run_terminal(board, events_rx, keys_tx).await? == AppExit::ForceQuit {
        println!("{FORCE_QUIT_MESSAGE}");
        std::process::exit(0);
    }

    let summary = engine.await.context("engine task panicked")??;
    info!(
        turns = summary.completed_turns,
        alive = summary.alive_count,
        outcome = ?summary.outcome,
        "Run finished"
    );
    Ok(())
}

async fn run_terminal(
    board: Board,
    events: mpsc::Receiver<Event>,
    keys: mpsc::Sender<char>,
) -> Result<AppExit> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("terminal mode requires a TTY, use --headless instead");
    }

    // Restore the terminal before printing a panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(board, keys);
    let result = app.run(&mut terminal, events).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_h_is_height() {
        let args = Args::try_parse_from(["gol", "-t", "4", "-w", "64", "-h", "32", "--headless"])
            .unwrap();
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.width, Some(64));
        assert_eq!(args.height, Some(32));
        assert!(args.headless);
    }

    #[test]
    fn test_overrides_only_set_flags() {
        let args = Args::try_parse_from(["gol", "--turns", "100", "--out", "snaps"]).unwrap();
        let mut config = EngineConfig::default();
        args.overrides().apply(&mut config);

        assert_eq!(config.turns, 100);
        assert_eq!(config.output_dir, PathBuf::from("snaps"));
        assert_eq!(config.threads, 8);
        assert_eq!(config.image_width, 512);
    }

    #[test]
    fn test_parameter_banner() {
        let config = EngineConfig::new(8, 512, 512, 100);
        assert_eq!(
            parameters(&config),
            "Threads    8\nWidth      512\nHeight     512\nTurns      100\n"
        );
    }

    #[test]
    fn test_help_flag_is_long_only() {
        let err = Args::try_parse_from(["gol", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
