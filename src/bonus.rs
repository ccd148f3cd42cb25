//! Bonus generation: turn a matched group into a special tile on one surviving cell.

use crate::board::{Pos, Special};
use crate::matcher::{Axis, Group, Shape};
use std::collections::BTreeSet;

/// A special tile created from a group; `pos` survives the step that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bonus {
    pub pos: Pos,
    pub special: Special,
}

/// Special earned by a group's shape and size, if any.
///
/// Precedence: corner -> area bomb, five or more -> color bomb, four in a line ->
/// row or column clear, three -> nothing.
pub fn bonus_kind(group: &Group) -> Option<Special> {
    match group.shape {
        Shape::Corner => Some(Special::AreaBomb),
        _ if group.len() >= 5 => Some(Special::ColorBomb),
        Shape::Line(Axis::Horizontal) if group.len() == 4 => Some(Special::RowClear),
        Shape::Line(Axis::Vertical) if group.len() == 4 => Some(Special::ColumnClear),
        Shape::Line(_) => None,
    }
}

/// Cell that keeps its tile: a swapped cell inside the group first, otherwise the
/// middle of the ordered cell list. Cells in `exclude` are never chosen.
pub fn survivor(group: &Group, swap: Option<(Pos, Pos)>, exclude: &BTreeSet<Pos>) -> Option<Pos> {
    let allowed = |p: &Pos| group.contains(*p) && !exclude.contains(p);
    if let Some((a, b)) = swap {
        if let Some(p) = [a, b].into_iter().find(allowed) {
            return Some(p);
        }
    }
    let middle = group.cells.get(group.len() / 2).copied().filter(allowed);
    middle.or_else(|| group.cells.iter().copied().find(allowed))
}

/// Bonus for a group, or `None` when the group is too small to earn one.
pub fn generate(group: &Group, swap: Option<(Pos, Pos)>, exclude: &BTreeSet<Pos>) -> Option<Bonus> {
    let special = bonus_kind(group)?;
    let pos = survivor(group, swap, exclude)?;
    Some(Bonus { pos, special })
}
