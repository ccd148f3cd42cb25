#![allow(dead_code)]

use matchtui::{Board, Engine, GRID_SIZE, LevelDescriptor, LevelPack, LevelState, Pos, SavedLevel, Tile};
use std::collections::BTreeMap;

/// (2r + c) mod 6: no two neighbours share a type in either direction.
pub fn quiet_board() -> Board {
    let rows: Vec<String> = (0..GRID_SIZE)
        .map(|r| {
            (0..GRID_SIZE)
                .map(|c| char::from(b'0' + ((2 * r + c) % 6) as u8))
                .collect()
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    Board::from_rows(&rows).unwrap()
}

pub fn with_tiles(mut board: Board, kind: u8, cells: &[(usize, usize)]) -> Board {
    for &(r, c) in cells {
        board.set_tile(Pos::new(r, c), Tile::plain(kind));
    }
    board
}

/// Swapping (0, 2) with (1, 2) lines up three of `kind` in row 0. Valid for kinds 0, 1,
/// 4 and 5.
pub fn three_in_row(kind: u8) -> Board {
    with_tiles(quiet_board(), kind, &[(0, 0), (0, 1), (1, 2)])
}

pub const THREE_SWAP: (Pos, Pos) = (Pos::new(0, 2), Pos::new(1, 2));

pub fn level(move_budget: u32, target_score: u32, collect: &[(u8, u32)]) -> LevelDescriptor {
    LevelDescriptor {
        move_budget,
        target_score,
        collectibles: collect.iter().copied().collect::<BTreeMap<_, _>>(),
        ice_cell_count: 0,
        ice_strength: 1,
    }
}

/// An engine playing `descriptor` on `board`, with the level state adjusted by `adjust`.
pub fn engine_on(
    descriptor: LevelDescriptor,
    board: &Board,
    adjust: impl FnOnce(&mut LevelState),
) -> Engine {
    let mut engine = Engine::new(LevelPack::new(vec![descriptor]), Some(17)).unwrap();
    let mut state = engine.state().clone();
    adjust(&mut state);
    resume_on(&mut engine, state, board);
    engine
}

/// Put `board` in play with `state`, dropping the load events.
pub fn resume_on(engine: &mut Engine, state: LevelState, board: &Board) {
    let index = state.index;
    engine
        .load_level(
            index,
            Some(SavedLevel {
                state,
                board: board.snapshot(),
            }),
        )
        .unwrap();
    engine.drain_events().for_each(drop);
}
