//! Events emitted by the engine for a presentation layer, with settle-time hints.

use crate::board::{ColumnRefill, Pos, Special, Tile};
use crate::level::LevelState;
use crate::matcher::Shape;
use std::time::Duration;

/// Swap animation length.
pub const SWAP_MS: u64 = 140;
/// Tile fall animation length after a refill.
pub const FALL_MS: u64 = 180;
/// Pop animation length for cleared tiles.
pub const POP_MS: u64 = 160;
/// Pause between consecutive cascade steps.
pub const CHAIN_GAP_MS: u64 = 60;

/// Why a cell was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearCause {
    /// Part of a matched group.
    Match,
    /// Reached by a special tile's effect, or a swapped color bomb.
    Chain,
}

/// Why a swap request was turned down. Rejections never change engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A move is still resolving, or the level is over.
    NotIdle,
    OutOfMoves,
    OutOfBounds,
    NotAdjacent,
    /// The swap formed no match and involved no color bomb; it was undone.
    NoMatch,
}

/// How a level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won { stars: u8 },
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedGroup {
    pub kind: u8,
    pub cells: Vec<Pos>,
    pub shape: Shape,
    pub bonus: Option<Special>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedCell {
    pub pos: Pos,
    pub tile: Tile,
    pub cause: ClearCause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A level was (re)built or resumed; redraw the whole board.
    BoardReset { level: usize },
    SwapAccepted { a: Pos, b: Pos },
    SwapRejected { a: Pos, b: Pos, reason: RejectReason },
    GroupsMatched(Vec<MatchedGroup>),
    BonusCreated { pos: Pos, special: Special },
    SpecialActivated { pos: Pos, special: Special },
    CellsCleared(Vec<ClearedCell>),
    IceCracked { pos: Pos, remaining: u8 },
    Refilled(Vec<ColumnRefill>),
    ObjectivesChanged(LevelState),
    Finished(Outcome),
}

impl Event {
    /// How long a presenter should let this event play before asking for the next step.
    pub fn settle_hint(&self) -> Duration {
        let ms = match self {
            Self::SwapAccepted { .. } => SWAP_MS,
            // out and back
            Self::SwapRejected {
                reason: RejectReason::NoMatch,
                ..
            } => SWAP_MS * 2,
            Self::CellsCleared(_) => POP_MS + CHAIN_GAP_MS,
            Self::Refilled(_) => FALL_MS + CHAIN_GAP_MS,
            _ => 0,
        };
        Duration::from_millis(ms)
    }
}

/// Total settle time for a batch of events.
pub fn settle_time<'a>(events: impl IntoIterator<Item = &'a Event>) -> Duration {
    events.into_iter().map(Event::settle_hint).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_hints() {
        let swap = Event::SwapAccepted {
            a: Pos::new(0, 0),
            b: Pos::new(0, 1),
        };
        assert_eq!(swap.settle_hint(), Duration::from_millis(140));
        let events = [Event::CellsCleared(Vec::new()), Event::Refilled(Vec::new())];
        assert_eq!(settle_time(&events), Duration::from_millis(460));
        let rejected = Event::SwapRejected {
            a: Pos::new(0, 0),
            b: Pos::new(5, 5),
            reason: RejectReason::NotAdjacent,
        };
        assert_eq!(rejected.settle_hint(), Duration::ZERO);
    }
}
