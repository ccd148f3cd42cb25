//! Special activation: expand a clear-set through special tiles until a fixed point.

use crate::board::{Board, Pos, Special};
use crate::event::ClearCause;
use std::collections::{BTreeMap, BTreeSet};

/// Result of chaining specials over a clear-set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expansion {
    /// Every cell to clear this step, with why it is cleared.
    pub clear: BTreeMap<Pos, ClearCause>,
    /// Specials that fired, in activation order.
    pub activated: Vec<(Pos, Special)>,
}

/// Tile type a color bomb at `pos` wipes out: the type of the tile it was swapped with
/// when the bomb sits on one of the swapped cells, otherwise the most common type.
pub fn color_target(board: &Board, pos: Pos, swap: Option<(Pos, Pos)>) -> Option<u8> {
    let partner = swap.and_then(|(a, b)| {
        if pos == a {
            Some(b)
        } else if pos == b {
            Some(a)
        } else {
            None
        }
    });
    partner
        .and_then(|p| board.kind(p))
        .or_else(|| board.most_abundant_kind())
}

/// Cells covered by one special's effect. Includes the special's own cell.
pub fn effect_cells(board: &Board, pos: Pos, special: Special, swap: Option<(Pos, Pos)>) -> Vec<Pos> {
    let n = board.size();
    match special {
        Special::RowClear => (0..n).map(|col| Pos::new(pos.row, col)).collect(),
        Special::ColumnClear => (0..n).map(|row| Pos::new(row, pos.col)).collect(),
        Special::AreaBomb => (-1..=1)
            .flat_map(|dr| (-1..=1).map(move |dc| (dr, dc)))
            .filter_map(|(dr, dc)| pos.offset(dr, dc, n))
            .collect(),
        Special::ColorBomb => {
            let Some(target) = color_target(board, pos, swap) else {
                return vec![pos];
            };
            board
                .positions()
                .filter(|&p| p == pos || board.kind(p) == Some(target))
                .collect()
        }
    }
}

/// Chain specials over `seed` until no pass adds a cell.
///
/// Each pass reads the clear-set as it stood at the start of the pass and collects new
/// cells into a separate delta; cells in `keep` are never added.
pub fn expand(
    board: &Board,
    seed: BTreeMap<Pos, ClearCause>,
    keep: &BTreeSet<Pos>,
    swap: Option<(Pos, Pos)>,
) -> Expansion {
    let mut clear = seed;
    let mut fired: BTreeSet<Pos> = BTreeSet::new();
    let mut activated = Vec::new();
    loop {
        let mut delta: BTreeSet<Pos> = BTreeSet::new();
        for &pos in clear.keys() {
            if fired.contains(&pos) {
                continue;
            }
            let Some(special) = board.special(pos) else {
                continue;
            };
            fired.insert(pos);
            activated.push((pos, special));
            delta.extend(
                effect_cells(board, pos, special, swap)
                    .into_iter()
                    .filter(|c| !clear.contains_key(c) && !keep.contains(c)),
            );
        }
        if delta.is_empty() {
            break;
        }
        for cell in delta {
            clear.insert(cell, ClearCause::Chain);
        }
    }
    Expansion { clear, activated }
}
