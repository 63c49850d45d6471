//! Strip Partitioning and Strip Workers
//!
//! The board is split into horizontal strips, one per worker. Each turn a
//! worker receives its own rows plus one halo row from each vertical
//! neighbour and returns freshly computed rows for its strip only. Workers
//! never touch shared board state; the coordinator assembles their output.
//!
//! ```text
//!   row 9 ─────────── halo_above for strip 0 (wraps)
//!   ┌ rows 0..4 ┐     strip 0
//!   ├ rows 4..7 ┤     strip 1
//!   └ rows 7..10┘     strip 2
//!   row 0 ─────────── halo_below for strip 2 (wraps)
//! ```

use std::ops::Range;

use crate::board::{next_state, Board, CellState};

/// A contiguous half-open range of rows `[start, end)` owned by one worker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Strip {
    /// Position of the strip in ascending row order
    pub index: usize,
    /// First row (inclusive)
    pub start: usize,
    /// Last row (exclusive)
    pub end: usize,
}

impl Strip {
    /// Number of rows in the strip
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the strip has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The rows covered by this strip
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Number of workers actually used for a board of `height` rows.
///
/// More workers than rows would leave strips empty, so the count is clamped
/// to `1..=height`.
#[must_use]
pub fn effective_workers(height: usize, requested: usize) -> usize {
    requested.clamp(1, height.max(1))
}

/// Split `height` rows into strips.
///
/// Remainder rows go to the earliest strips, so no strip is more than one row
/// longer than another. 10 rows over 3 workers gives `[0,4) [4,7) [7,10)`.
#[must_use]
pub fn partition(height: usize, workers: usize) -> Vec<Strip> {
    if height == 0 {
        return Vec::new();
    }

    let workers = effective_workers(height, workers);
    let base = height / workers;
    let extra = height % workers;

    let mut start = 0;
    (0..workers)
        .map(|index| {
            let len = base + usize::from(index < extra);
            let strip = Strip {
                index,
                start,
                end: start + len,
            };
            start += len;
            strip
        })
        .collect()
}

/// Everything a worker needs for one turn: its rows plus the two halo rows
#[derive(Clone, Debug)]
pub struct StripInput {
    /// The strip being computed
    pub strip: Strip,
    /// Board width
    pub width: usize,
    /// Bottom row of the strip above (wrapped)
    pub halo_above: Vec<CellState>,
    /// The strip's own rows, row-major
    pub rows: Vec<CellState>,
    /// Top row of the strip below (wrapped)
    pub halo_below: Vec<CellState>,
}

impl StripInput {
    /// Copy out the rows `[start - 1, end + 1)` of `board` for `strip`,
    /// wrapping at the top and bottom edges
    #[must_use]
    pub fn gather(board: &Board, strip: Strip) -> Self {
        let width = board.width();
        let height = board.height();
        let above = (strip.start + height - 1) % height;
        let below = strip.end % height;

        Self {
            strip,
            width,
            halo_above: board.row(above).to_vec(),
            rows: board.cells()[strip.start * width..strip.end * width].to_vec(),
            halo_below: board.row(below).to_vec(),
        }
    }

    /// Row at a strip-local offset, where `-1` and `len` are the halos
    fn local_row(&self, offset: isize) -> &[CellState] {
        let len = self.strip.len() as isize;
        if offset < 0 {
            &self.halo_above
        } else if offset >= len {
            &self.halo_below
        } else {
            let start = offset as usize * self.width;
            &self.rows[start..start + self.width]
        }
    }
}

/// Rows computed by a worker for its strip
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripOutput {
    /// The strip these rows belong to
    pub strip: Strip,
    /// Next-turn rows for exactly `[strip.start, strip.end)`, row-major
    pub rows: Vec<CellState>,
}

/// Compute the next turn for one strip.
///
/// Pure function of its input: identical input always yields identical rows.
#[must_use]
pub fn compute_strip(input: &StripInput) -> StripOutput {
    let width = input.width;
    let len = input.strip.len();
    let mut rows = Vec::with_capacity(width * len);

    for local in 0..len as isize {
        let above = input.local_row(local - 1);
        let current = input.local_row(local);
        let below = input.local_row(local + 1);

        for x in 0..width {
            let left = (x + width - 1) % width;
            let right = (x + 1) % width;
            let alive = [
                above[left],
                above[x],
                above[right],
                current[left],
                current[right],
                below[left],
                below[x],
                below[right],
            ]
            .iter()
            .filter(|c| c.is_alive())
            .count() as u8;

            rows.push(next_state(current[x], alive));
        }
    }

    StripOutput {
        strip: input.strip,
        rows,
    }
}
