//! Error types for level configuration, persisted boards and level pack loading.

use thiserror::Error;

/// A level pack that cannot be played. Reported when the pack or a level is loaded,
/// before any board is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("level pack is empty")]
    EmptyLevelPack,
    #[error("level {}: move budget must be positive", .level + 1)]
    ZeroMoveBudget { level: usize },
    #[error("level {}: collectible tile type {kind} is outside 0..{kinds}", .level + 1)]
    CollectibleOutOfRange { level: usize, kind: u8, kinds: u8 },
    #[error("level {}: {count} ice cells do not fit on a {cells}-cell board", .level + 1)]
    TooMuchIce { level: usize, count: u32, cells: usize },
    #[error("level {}: ice strength must be positive when ice is placed", .level + 1)]
    ZeroIceStrength { level: usize },
    #[error("level index {index} out of range (pack has {len} levels)")]
    NoSuchLevel { index: usize, len: usize },
}

/// A persisted or hand-written board that does not describe a valid grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("board has no rows")]
    Empty,
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row}: expected {expected} cells, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}): tile type {kind} is outside 0..{kinds}")]
    KindOutOfRange {
        row: usize,
        col: usize,
        kind: u8,
        kinds: u8,
    },
    #[error("cell ({row}, {col}): invalid tile character {ch:?}")]
    BadChar { row: usize, col: usize, ch: char },
    #[error("saved state belongs to level {}, not level {}", .saved + 1, .requested + 1)]
    LevelMismatch { saved: usize, requested: usize },
}

/// Failure to read a level pack file.
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid level pack: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure to start a level, either fresh or from a saved board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("saved board rejected: {0}")]
    Snapshot(#[from] SnapshotError),
}
