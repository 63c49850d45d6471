//! Snapshot Persistence
//!
//! Where the engine sends boards when the user asks for a save, and at the
//! end of an orderly run.
//!
//! # Implementations
//!
//! - [`PgmSnapshotWriter`]: binary PGM files in an output directory
//! - [`MemorySnapshotSink`]: keeps boards in memory, optionally failing on
//!   purpose, for tests and dry runs

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::board::Board;
use crate::pgm;

/// Snapshot write failures
///
/// Never fatal to a run; the engine logs them and continues.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure
    #[error("failed to write snapshot {path}: {source}")]
    Io {
        /// File attempted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The sink refused the write
    #[error("snapshot rejected: {0}")]
    Rejected(String),
}

/// Artifact name for a board at a given turn: `{width}x{height}x{turns}`
#[must_use]
pub fn snapshot_name(board: &Board, completed_turns: u64) -> String {
    format!("{}x{}x{}", board.width(), board.height(), completed_turns)
}

/// Destination for board snapshots
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Persist `board` and return the artifact name
    async fn write_snapshot(
        &self,
        board: &Board,
        completed_turns: u64,
    ) -> Result<String, SnapshotError>;
}

#[async_trait]
impl<T: SnapshotSink + ?Sized> SnapshotSink for Arc<T> {
    async fn write_snapshot(
        &self,
        board: &Board,
        completed_turns: u64,
    ) -> Result<String, SnapshotError> {
        (**self).write_snapshot(board, completed_turns).await
    }
}

// =============================================================================
// PGM files
// =============================================================================

/// Writes `{dir}/{width}x{height}x{turns}.pgm`
#[derive(Clone, Debug)]
pub struct PgmSnapshotWriter {
    dir: PathBuf,
}

impl PgmSnapshotWriter {
    /// Writer targeting `dir`, created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SnapshotSink for PgmSnapshotWriter {
    async fn write_snapshot(
        &self,
        board: &Board,
        completed_turns: u64,
    ) -> Result<String, SnapshotError> {
        let name = snapshot_name(board, completed_turns);
        let path = self.dir.join(format!("{name}.pgm"));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SnapshotError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
        tokio::fs::write(&path, pgm::encode(board))
            .await
            .map_err(|e| SnapshotError::Io {
                path: path.clone(),
                source: e,
            })?;

        tracing::info!(path = %path.display(), "Snapshot written");
        Ok(name)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Records snapshots in memory
#[derive(Debug, Default)]
pub struct MemorySnapshotSink {
    writes: Mutex<Vec<(String, Board)>>,
    failing: bool,
}

impl MemorySnapshotSink {
    /// Sink that accepts every write
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects every write
    #[must_use]
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Names of the snapshots written so far
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.writes.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Most recent snapshot
    #[must_use]
    pub fn last(&self) -> Option<(String, Board)> {
        self.writes.lock().last().cloned()
    }
}

#[async_trait]
impl SnapshotSink for MemorySnapshotSink {
    async fn write_snapshot(
        &self,
        board: &Board,
        completed_turns: u64,
    ) -> Result<String, SnapshotError> {
        if self.failing {
            return Err(SnapshotError::Rejected("sink configured to fail".into()));
        }
        let name = snapshot_name(board, completed_turns);
        self.writes.lock().push((name.clone(), board.clone()));
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_snapshot_name() {
        assert_eq!(snapshot_name(&Board::new(512, 256), 100), "512x256x100");
    }

    #[tokio::test]
    async fn test_pgm_writer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PgmSnapshotWriter::new(dir.path().join("out"));
        let board = Board::from_alive(4, 4, &[Cell::new(1, 1)]);

        let name = writer.write_snapshot(&board, 7).await.unwrap();
        assert_eq!(name, "4x4x7");

        let bytes = tokio::fs::read(dir.path().join("out").join("4x4x7.pgm"))
            .await
            .unwrap();
        assert_eq!(pgm::decode(&bytes).unwrap(), board);
    }

    #[tokio::test]
    async fn test_pgm_writer_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        tokio::fs::write(&blocker, b"x").await.unwrap();

        let writer = PgmSnapshotWriter::new(blocker.join("nested"));
        let result = writer.write_snapshot(&Board::new(2, 2), 0).await;
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = Arc::new(MemorySnapshotSink::new());
        let board = Board::new(3, 3);

        sink.write_snapshot(&board, 1).await.unwrap();
        sink.write_snapshot(&board, 2).await.unwrap();

        assert_eq!(sink.names(), vec!["3x3x1", "3x3x2"]);
        assert_eq!(sink.last().map(|(_, b)| b), Some(board));
    }

    #[tokio::test]
    async fn test_failing_sink() {
        let sink = MemorySnapshotSink::failing();
        assert!(sink.write_snapshot(&Board::new(2, 2), 0).await.is_err());
        assert!(sink.names().is_empty());
    }
}
