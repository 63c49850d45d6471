//! Game of Life front ends
//!
//! Surfaces for the engine in `gol_engine`:
//!
//! - **App**: full-screen terminal view with live key controls
//! - **Headless**: event log on stdout, key presses from stdin
//! - **Interrupt**: two-stage Ctrl+C handling shared by both

pub mod app;
pub mod headless;
pub mod interrupt;

pub use app::{App, AppExit, BoardView};
pub use interrupt::{Interrupt, InterruptAction, InterruptGuard};
