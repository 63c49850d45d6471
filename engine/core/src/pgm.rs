//! Binary PGM Codec
//!
//! Boards are stored as 8-bit greyscale `P5` images: one byte per cell,
//! 255 for alive and 0 for dead. On read any non-zero pixel is alive, so
//! images saved by other tools load as expected.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::board::{Board, BoardError, CellState};

/// Maximum grey value written
pub const MAXVAL: u8 = 255;

/// PGM read failures
#[derive(Debug, Error)]
pub enum PgmError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File attempted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Not a binary PGM
    #[error("unsupported image format, expected P5")]
    UnsupportedFormat,

    /// Header field missing or malformed
    #[error("invalid PGM header: {0}")]
    InvalidHeader(&'static str),

    /// Only 8-bit images are supported
    #[error("unsupported maxval {0}, expected 1..=255")]
    UnsupportedMaxval(u32),

    /// Fewer pixel bytes than the header promises
    #[error("truncated pixel data: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Bytes required by the header
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    /// The image is not the size the run was configured for
    #[error("image is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// Configured width
        expected_width: usize,
        /// Configured height
        expected_height: usize,
        /// Width in the file
        actual_width: usize,
        /// Height in the file
        actual_height: usize,
    },

    /// Pixel data did not form a board
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Encode `board` as a binary PGM
#[must_use]
pub fn encode(board: &Board) -> Vec<u8> {
    let header = format!("P5\n{} {}\n{}\n", board.width(), board.height(), MAXVAL);
    let mut bytes = Vec::with_capacity(header.len() + board.cells().len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend(
        board
            .cells()
            .iter()
            .map(|c| if c.is_alive() { MAXVAL } else { 0 }),
    );
    bytes
}

/// Decode a binary PGM into a board
pub fn decode(bytes: &[u8]) -> Result<Board, PgmError> {
    let mut header = HeaderReader { bytes, pos: 0 };

    if header.token()? != b"P5" {
        return Err(PgmError::UnsupportedFormat);
    }
    let width = header.number("width")?;
    let height = header.number("height")?;
    let maxval = header.number("maxval")?;
    if maxval == 0 || maxval > u32::from(MAXVAL) {
        return Err(PgmError::UnsupportedMaxval(maxval));
    }

    // Exactly one whitespace byte separates the header from the pixels
    if !header.peek().is_some_and(|b| b.is_ascii_whitespace()) {
        return Err(PgmError::InvalidHeader("missing separator before pixel data"));
    }
    let pixels = &bytes[header.pos + 1..];

    let width = width as usize;
    let height = height as usize;
    let expected = width * height;
    if pixels.len() < expected {
        return Err(PgmError::Truncated {
            expected,
            actual: pixels.len(),
        });
    }

    let cells = pixels[..expected]
        .iter()
        .map(|&p| CellState::from_alive(p != 0))
        .collect();
    Ok(Board::from_cells(width, height, cells)?)
}

/// Read `path` and check it matches the configured dimensions
pub async fn load_board(path: &Path, width: usize, height: usize) -> Result<Board, PgmError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| PgmError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let board = decode(&bytes)?;
    if board.width() != width || board.height() != height {
        return Err(PgmError::DimensionMismatch {
            expected_width: width,
            expected_height: height,
            actual_width: board.width(),
            actual_height: board.height(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        alive = board.alive_count(),
        "Loaded initial board"
    );
    Ok(board)
}

struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skip whitespace and `#` comments
    fn skip_blank(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'#' {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Result<&'a [u8], PgmError> {
        self.skip_blank();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && b != b'#')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(PgmError::InvalidHeader("unexpected end of header"));
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn number(&mut self, field: &'static str) -> Result<u32, PgmError> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(PgmError::InvalidHeader(field))
    }
}
