//! Matchtui — match-3 resolution engine.
//!
//! Swap two adjacent tiles; runs of three or more clear, longer runs and corners leave
//! special tiles behind, specials chain into each other, gravity refills the board and
//! the cascade repeats until the board is quiet. [`Engine`] drives one level at a time
//! and reports everything that happened as [`Event`]s.

pub mod board;
pub mod bonus;
pub mod engine;
pub mod error;
pub mod event;
pub mod level;
pub mod matcher;
pub mod special;

pub use board::{Board, BoardSnapshot, GRID_SIZE, Pos, Special, TILE_KINDS, Tile};
pub use engine::{CascadeReport, Engine, Phase, SavedLevel, Step, SwapOutcome};
pub use error::{ConfigError, LevelLoadError, LoadError, SnapshotError};
pub use event::{Event, Outcome, RejectReason};
pub use level::{LevelDescriptor, LevelPack, LevelState, Shortfall};
