//! Board Model
//!
//! The authoritative cell grid plus the pure transition rule. Nothing here
//! knows about workers or channels; the strip workers and the turn
//! coordinator build on these primitives.
//!
//! # Topology
//!
//! Both axes wrap (toroidal topology): the left neighbour of column 0 is
//! column `width - 1`, and likewise vertically. Every cell therefore has
//! exactly eight neighbours and there are no edge or corner special cases.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Dead cell
    #[default]
    Dead,
    /// Live cell
    Alive,
}

impl CellState {
    /// Build a state from a liveness flag
    #[must_use]
    pub fn from_alive(alive: bool) -> Self {
        if alive {
            Self::Alive
        } else {
            Self::Dead
        }
    }

    /// Whether the cell is alive
    #[must_use]
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// A cell coordinate (`x` is the column, `y` the row)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl Cell {
    /// Create a coordinate
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The transition rule.
///
/// A live cell with 2 or 3 live neighbours survives; a dead cell with exactly
/// 3 live neighbours is born; everything else is dead next turn.
#[must_use]
pub fn next_state(current: CellState, alive_neighbours: u8) -> CellState {
    match (current, alive_neighbours) {
        (CellState::Alive, 2 | 3) | (CellState::Dead, 3) => CellState::Alive,
        _ => CellState::Dead,
    }
}

/// Errors building a board from raw data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Width or height is zero
    #[error("board dimensions must be positive, got {width}x{height}")]
    EmptyDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Cell buffer does not match the dimensions
    #[error("expected {expected} cells, got {actual}")]
    SizeMismatch {
        /// `width * height`
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// A text row has a different width than the first row
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        /// Offending row
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        actual: usize,
    },
}

/// A fixed-size rectangular grid of cells, stored row-major
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Board {
    /// Create an all-dead board
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Dead; width * height],
        }
    }

    /// Create a board from a row-major cell buffer
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<CellState>,
    ) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyDimensions { width, height });
        }
        if cells.len() != width * height {
            return Err(BoardError::SizeMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a board with the given cells alive. Coordinates wrap.
    #[must_use]
    pub fn from_alive(width: usize, height: usize, alive: &[Cell]) -> Self {
        let mut board = Self::new(width, height);
        for cell in alive {
            board.set(cell.x, cell.y, CellState::Alive);
        }
        board
    }

    /// Parse a board from text rows; `#`, `O` and `*` are alive, anything
    /// else is dead.
    ///
    /// ```
    /// use gol_engine::Board;
    ///
    /// let blinker = Board::from_rows(&[".....", "..#..", "..#..", "..#..", "....."]).unwrap();
    /// assert_eq!(blinker.alive_count(), 3);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(BoardError::RaggedRows {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            cells.extend(
                row.chars()
                    .map(|c| CellState::from_alive(matches!(c, '#' | 'O' | '*'))),
            );
        }
        Self::from_cells(width, rows.len(), cells)
    }

    /// Seeded random soup; the same seed always yields the same board
    #[must_use]
    pub fn random(width: usize, height: usize, seed: u64, density: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let density = density.clamp(0.0, 1.0);
        let cells = (0..width * height)
            .map(|_| CellState::from_alive(rng.gen_bool(density)))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Board width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell buffer
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y % self.height) * self.width + (x % self.width)
    }

    /// State of the cell at `(x, y)`; coordinates wrap
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[self.index(x, y)]
    }

    /// Set the cell at `(x, y)`; coordinates wrap
    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        let idx = self.index(x, y);
        self.cells[idx] = state;
    }

    /// One row of cells; the row index wraps
    #[must_use]
    pub fn row(&self, y: usize) -> &[CellState] {
        let start = (y % self.height) * self.width;
        &self.cells[start..start + self.width]
    }

    /// Number of live cells
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Coordinates of every live cell, row-major
    #[must_use]
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }

    /// Live neighbours of `(x, y)` using wrapped coordinates
    #[must_use]
    pub fn alive_neighbours(&self, x: usize, y: usize) -> u8 {
        let (w, h) = (self.width, self.height);
        let mut count = 0;
        for dy in [h - 1, 0, 1] {
            for dx in [w - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.get(x + dx, y + dy).is_alive() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Next state of the cell at `(x, y)`
    #[must_use]
    pub fn next_cell_state(&self, x: usize, y: usize) -> CellState {
        next_state(self.get(x, y), self.alive_neighbours(x, y))
    }

    /// Sequential reference step of the whole board
    #[must_use]
    pub fn step(&self) -> Self {
        let mut next = Self::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                next.set(x, y, self.next_cell_state(x, y));
            }
        }
        next
    }

    /// Cells whose state differs between `self` and `next`, row-major
    #[must_use]
    pub fn flipped_cells(&self, next: &Board) -> Vec<Cell> {
        debug_assert_eq!((self.width, self.height), (next.width, next.height));
        self.cells
            .iter()
            .zip(&next.cells)
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }
}

/// Small boards print as a grid so test failures are readable
impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width > 64 || self.height > 64 {
            return f
                .debug_struct("Board")
                .field("width", &self.width)
                .field("height", &self.height)
                .field("alive", &self.alive_count())
                .finish();
        }
        writeln!(f, "Board {}x{}", self.width, self.height)?;
        for y in 0..self.height {
            let line: String = self
                .row(y)
                .iter()
                .map(|c| if c.is_alive() { '#' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transition_rule() {
        for n in 0..=8u8 {
            let survives = next_state(CellState::Alive, n).is_alive();
            let born = next_state(CellState::Dead, n).is_alive();
            assert_eq!(survives, n == 2 || n == 3, "alive with {n} neighbours");
            assert_eq!(born, n == 3, "dead with {n} neighbours");
        }
    }

    #[test]
    fn test_neighbours_wrap_at_corners() {
        // The three cells diagonally/orthogonally adjacent to (0, 0) across both edges
        let board = Board::from_alive(5, 4, &[Cell::new(4, 3), Cell::new(0, 3), Cell::new(4, 0)]);
        assert_eq!(board.alive_neighbours(0, 0), 3);
        assert_eq!(board.next_cell_state(0, 0), CellState::Alive);
    }

    #[test]
    fn test_edges_match_interior() {
        // A blinker straddling the top/bottom seam behaves like one in the middle
        let seam = Board::from_alive(6, 6, &[Cell::new(2, 5), Cell::new(2, 0), Cell::new(2, 1)]);
        let middle = Board::from_alive(6, 6, &[Cell::new(2, 2), Cell::new(2, 3), Cell::new(2, 4)]);

        let seam_next = seam.step();
        let middle_next = middle.step();

        assert_eq!(
            seam_next.alive_cells(),
            vec![Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0)]
        );
        assert_eq!(
            middle_next.alive_cells(),
            vec![Cell::new(1, 3), Cell::new(2, 3), Cell::new(3, 3)]
        );
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Board::from_rows(&["..#", ".#"]).unwrap_err();
        assert_eq!(
            err,
            BoardError::RaggedRows {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_from_cells_checks_size() {
        assert!(matches!(
            Board::from_cells(3, 3, vec![CellState::Dead; 8]),
            Err(BoardError::SizeMismatch { expected: 9, actual: 8 })
        ));
        assert!(matches!(
            Board::from_cells(0, 3, Vec::new()),
            Err(BoardError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn test_flipped_cells_row_major() {
        let before = Board::from_rows(&[".....", "..#..", "..#..", "..#..", "....."]).unwrap();
        let after = before.step();

        assert_eq!(
            before.flipped_cells(&after),
            vec![
                Cell::new(2, 1),
                Cell::new(1, 2),
                Cell::new(3, 2),
                Cell::new(2, 3)
            ]
        );
    }

    #[test]
    fn test_beacon_period_two() {
        let beacon = Board::from_rows(&[
            "......", ".##...", ".##...", "...##.", "...##.", "......",
        ])
        .unwrap();

        let one = beacon.step();
        let two = one.step();

        assert_eq!(beacon.alive_count(), 8);
        assert_eq!(one.alive_count(), 6);
        assert_eq!(two, beacon);
    }

    #[test]
    fn test_random_is_seeded() {
        let a = Board::random(32, 16, 7, 0.3);
        let b = Board::random(32, 16, 7, 0.3);
        let c = Board::random(32, 16, 8, 0.3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
