//! Board model: tile grid, special tiles, per-cell ice layers and gravity refill.

use crate::error::SnapshotError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Grid dimension (rows == columns).
pub const GRID_SIZE: usize = 8;

/// Number of distinct tile types.
pub const TILE_KINDS: u8 = 6;

/// Redraws per cell before generation accepts a type that completes a run.
const BUILD_RETRY_LIMIT: u32 = 80;

/// Cell address; row 0 is the top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if the two cells differ by exactly one step along exactly one axis.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Neighbour at (dr, dc), if it lies inside a `size` x `size` grid.
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Self { row, col })
    }
}

/// Activatable effect carried by a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Special {
    RowClear,
    ColumnClear,
    AreaBomb,
    ColorBomb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<Special>,
}

impl Tile {
    pub const fn plain(kind: u8) -> Self {
        Self {
            kind,
            special: None,
        }
    }

    pub const fn with_special(kind: u8, special: Special) -> Self {
        Self {
            kind,
            special: Some(special),
        }
    }
}

/// New contents of one column after gravity and refill, listed top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRefill {
    pub col: usize,
    /// Number of freshly generated tiles at the top of the column.
    pub spawned: usize,
    pub tiles: Vec<Tile>,
}

/// Per-cell persisted form of a board: tile type, special and ice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<Vec<Tile>>,
    pub ice: Vec<Vec<u8>>,
}

/// Square grid of tiles. A cell is `None` only between a clear and the refill that
/// follows it inside one cascade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    kinds: u8,
    /// cells[row * size + col]
    cells: Vec<Option<Tile>>,
    ice: Vec<u8>,
}

impl Board {
    fn empty(size: usize, kinds: u8) -> Self {
        Self {
            size,
            kinds,
            cells: vec![None; size * size],
            ice: vec![0; size * size],
        }
    }

    /// Fill a fresh board so that no cell completes a run of three, redrawing each
    /// cell up to a bounded number of times. On exhaustion the last draw is kept and
    /// the run is left for the first settle to remove.
    pub fn generate<R: Rng>(size: usize, kinds: u8, rng: &mut R) -> Self {
        let mut board = Self::empty(size, kinds);
        for row in 0..size {
            for col in 0..size {
                let pos = Pos::new(row, col);
                let mut kind = rng.random_range(0..kinds);
                let mut attempts = 1;
                while board.would_match_at(pos, kind) {
                    if attempts > BUILD_RETRY_LIMIT {
                        tracing::warn!(row, col, kind, "redraw budget exhausted, keeping a latent match");
                        break;
                    }
                    kind = rng.random_range(0..kinds);
                    attempts += 1;
                }
                board.put(pos, Some(Tile::plain(kind)));
            }
        }
        board
    }

    /// Parse a board from digit rows, e.g. `["0120", "3401", ...]`. Every row must be as
    /// long as there are rows. Uses [`TILE_KINDS`] tile types.
    pub fn from_rows(rows: &[&str]) -> Result<Self, SnapshotError> {
        let size = rows.len();
        if size == 0 {
            return Err(SnapshotError::Empty);
        }
        let mut board = Self::empty(size, TILE_KINDS);
        for (row, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != size {
                return Err(SnapshotError::RowLength {
                    row,
                    expected: size,
                    found: chars.len(),
                });
            }
            for (col, ch) in chars.into_iter().enumerate() {
                let kind = ch
                    .to_digit(10)
                    .ok_or(SnapshotError::BadChar { row, col, ch })? as u8;
                if kind >= TILE_KINDS {
                    return Err(SnapshotError::KindOutOfRange {
                        row,
                        col,
                        kind,
                        kinds: TILE_KINDS,
                    });
                }
                board.put(Pos::new(row, col), Some(Tile::plain(kind)));
            }
        }
        Ok(board)
    }

    /// Rebuild a board from its persisted form. The snapshot must be `size` x `size`
    /// with every tile type below `kinds`.
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        size: usize,
        kinds: u8,
    ) -> Result<Self, SnapshotError> {
        if snapshot.tiles.len() != size {
            return Err(SnapshotError::RowCount {
                expected: size,
                found: snapshot.tiles.len(),
            });
        }
        if snapshot.ice.len() != size {
            return Err(SnapshotError::RowCount {
                expected: size,
                found: snapshot.ice.len(),
            });
        }
        let mut board = Self::empty(size, kinds);
        for (row, (tiles, ice)) in snapshot.tiles.iter().zip(&snapshot.ice).enumerate() {
            for found in [tiles.len(), ice.len()] {
                if found != size {
                    return Err(SnapshotError::RowLength {
                        row,
                        expected: size,
                        found,
                    });
                }
            }
            for (col, (tile, &layers)) in tiles.iter().zip(ice).enumerate() {
                if tile.kind >= kinds {
                    return Err(SnapshotError::KindOutOfRange {
                        row,
                        col,
                        kind: tile.kind,
                        kinds,
                    });
                }
                let pos = Pos::new(row, col);
                board.put(pos, Some(*tile));
                board.set_ice(pos, layers);
            }
        }
        Ok(board)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let tiles = (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| self.tile(Pos::new(row, col)).unwrap_or(Tile::plain(0)))
                    .collect()
            })
            .collect();
        let ice = self.ice.chunks(self.size).map(<[u8]>::to_vec).collect();
        BoardSnapshot { tiles, ice }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn kinds(&self) -> u8 {
        self.kinds
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.row * self.size + pos.col
    }

    /// All cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let size = self.size;
        (0..size * size).map(move |i| Pos::new(i / size, i % size))
    }

    #[inline]
    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    #[inline]
    pub fn kind(&self, pos: Pos) -> Option<u8> {
        self.tile(pos).map(|t| t.kind)
    }

    #[inline]
    pub fn special(&self, pos: Pos) -> Option<Special> {
        self.tile(pos).and_then(|t| t.special)
    }

    /// Remaining ice layers on a cell (0 = no ice).
    #[inline]
    pub fn ice(&self, pos: Pos) -> u8 {
        if !self.contains(pos) {
            return 0;
        }
        self.ice[self.index(pos)]
    }

    fn put(&mut self, pos: Pos, tile: Option<Tile>) {
        let i = self.index(pos);
        self.cells[i] = tile;
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if self.contains(pos) {
            self.put(pos, Some(tile));
        }
    }

    /// Set or remove the special on an occupied cell; no-op on empty cells.
    pub fn set_special(&mut self, pos: Pos, special: Option<Special>) {
        if let Some(mut tile) = self.tile(pos) {
            tile.special = special;
            self.put(pos, Some(tile));
        }
    }

    pub fn set_ice(&mut self, pos: Pos, layers: u8) {
        if self.contains(pos) {
            let i = self.index(pos);
            self.ice[i] = layers;
        }
    }

    /// Number of cells that still carry ice.
    pub fn frozen_cells(&self) -> usize {
        self.ice.iter().filter(|&&layers| layers > 0).count()
    }

    /// Exchange the contents of two cells. Adjacency is the caller's concern.
    pub fn swap(&mut self, a: Pos, b: Pos) {
        if self.contains(a) && self.contains(b) {
            let (ia, ib) = (self.index(a), self.index(b));
            self.cells.swap(ia, ib);
        }
    }

    /// Empty a cell, returning the tile that was there.
    pub fn clear(&mut self, pos: Pos) -> Option<Tile> {
        if !self.contains(pos) {
            return None;
        }
        let i = self.index(pos);
        self.cells[i].take()
    }

    /// Remove one ice layer. Returns the layers left, or `None` if the cell had no ice.
    pub fn decrement_ice(&mut self, pos: Pos) -> Option<u8> {
        if !self.contains(pos) {
            return None;
        }
        let i = self.index(pos);
        if self.ice[i] == 0 {
            return None;
        }
        self.ice[i] -= 1;
        Some(self.ice[i])
    }

    /// Freeze `count` distinct random cells with `strength` layers each. Returns the
    /// number of cells frozen.
    pub fn place_ice<R: Rng>(&mut self, count: usize, strength: u8, rng: &mut R) -> usize {
        let mut cells: Vec<Pos> = self.positions().collect();
        cells.shuffle(rng);
        let count = count.min(cells.len());
        for &pos in &cells[..count] {
            self.set_ice(pos, strength);
        }
        count
    }

    /// True if placing `kind` at `pos` would complete a run of three with tiles already
    /// on the board, in either orientation (including `pos` as the middle of the run).
    pub fn would_match_at(&self, pos: Pos, kind: u8) -> bool {
        let same = |dr: isize, dc: isize| {
            pos.offset(dr, dc, self.size)
                .and_then(|p| self.kind(p))
                .is_some_and(|k| k == kind)
        };
        let (l1, l2, r1, r2) = (same(0, -1), same(0, -2), same(0, 1), same(0, 2));
        if (l1 && l2) || (r1 && r2) || (l1 && r1) {
            return true;
        }
        let (u1, u2, d1, d2) = (same(-1, 0), same(-2, 0), same(1, 0), same(2, 0));
        (u1 && u2) || (d1 && d2) || (u1 && d1)
    }

    /// Compact every column downward and top-fill the gaps with fresh plain tiles.
    /// Returns the columns that changed.
    pub fn collapse_and_refill<R: Rng>(&mut self, rng: &mut R) -> Vec<ColumnRefill> {
        let mut refills = Vec::new();
        for col in 0..self.size {
            // Bottom-up, so survivors keep their relative order.
            let mut column: Vec<Tile> = (0..self.size)
                .rev()
                .filter_map(|row| self.tile(Pos::new(row, col)))
                .collect();
            let spawned = self.size - column.len();
            if spawned == 0 {
                continue;
            }
            while column.len() < self.size {
                column.push(Tile::plain(rng.random_range(0..self.kinds)));
            }
            column.reverse();
            for (row, tile) in column.iter().enumerate() {
                self.put(Pos::new(row, col), Some(*tile));
            }
            refills.push(ColumnRefill {
                col,
                spawned,
                tiles: column,
            });
        }
        refills
    }

    /// Tile count per type.
    pub fn kind_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.kinds as usize];
        for tile in self.cells.iter().flatten() {
            if let Some(c) = counts.get_mut(tile.kind as usize) {
                *c += 1;
            }
        }
        counts
    }

    /// Most common tile type on the board, lowest type on ties.
    pub fn most_abundant_kind(&self) -> Option<u8> {
        let counts = self.kind_counts();
        let best = counts.iter().copied().max().filter(|&n| n > 0)?;
        counts.iter().position(|&n| n == best).map(|k| k as u8)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_adjacency() {
        let p = Pos::new(3, 3);
        assert!(p.is_adjacent(Pos::new(3, 4)));
        assert!(p.is_adjacent(Pos::new(2, 3)));
        assert!(!p.is_adjacent(Pos::new(4, 4)));
        assert!(!p.is_adjacent(Pos::new(3, 5)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn test_offset_clips_to_grid() {
        assert_eq!(Pos::new(0, 0).offset(-1, 0, 8), None);
        assert_eq!(Pos::new(7, 7).offset(0, 1, 8), None);
        assert_eq!(Pos::new(1, 1).offset(-1, 1, 8), Some(Pos::new(0, 2)));
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert_eq!(
            Board::from_rows(&["01", "2"]),
            Err(SnapshotError::RowLength {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(
            Board::from_rows(&["0x", "12"]),
            Err(SnapshotError::BadChar { ch: 'x', .. })
        ));
        assert!(matches!(
            Board::from_rows(&["09", "12"]),
            Err(SnapshotError::KindOutOfRange { kind: 9, .. })
        ));
    }

    #[test]
    fn test_swap_and_clear() {
        let mut board = Board::from_rows(&["012", "345", "012"]).unwrap();
        board.swap(Pos::new(0, 0), Pos::new(0, 1));
        assert_eq!(board.kind(Pos::new(0, 0)), Some(1));
        assert_eq!(board.kind(Pos::new(0, 1)), Some(0));

        board.set_special(Pos::new(1, 1), Some(Special::AreaBomb));
        let cleared = board.clear(Pos::new(1, 1));
        assert_eq!(cleared, Some(Tile::with_special(4, Special::AreaBomb)));
        assert_eq!(board.tile(Pos::new(1, 1)), None);
        assert!(!board.is_full());
    }

    #[test]
    fn test_decrement_ice() {
        let mut board = Board::from_rows(&["012", "345", "012"]).unwrap();
        let pos = Pos::new(2, 2);
        assert_eq!(board.decrement_ice(pos), None);
        board.set_ice(pos, 2);
        assert_eq!(board.decrement_ice(pos), Some(1));
        assert_eq!(board.decrement_ice(pos), Some(0));
        assert_eq!(board.decrement_ice(pos), None);
    }

    #[test]
    fn test_collapse_and_refill_keeps_order() {
        let mut board = Board::from_rows(&["012", "345", "201"]).unwrap();
        board.set_special(Pos::new(0, 1), Some(Special::RowClear));
        board.clear(Pos::new(1, 1));
        board.clear(Pos::new(2, 1));
        let mut rng = StdRng::seed_from_u64(7);
        let refills = board.collapse_and_refill(&mut rng);

        assert_eq!(refills.len(), 1);
        assert_eq!(refills[0].col, 1);
        assert_eq!(refills[0].spawned, 2);
        // The surviving tile of column 1 fell to the bottom and kept its special.
        assert_eq!(
            board.tile(Pos::new(2, 1)),
            Some(Tile::with_special(1, Special::RowClear))
        );
        assert!(board.is_full());
        assert_eq!(board.kind(Pos::new(0, 0)), Some(0));
    }

    #[test]
    fn test_would_match_at_middle_and_ends() {
        let board = Board::from_rows(&["00100", "22322", "14043", "55155", "12123"]).unwrap();
        assert!(board.would_match_at(Pos::new(0, 2), 0));
        assert!(board.would_match_at(Pos::new(1, 2), 2));
        assert!(!board.would_match_at(Pos::new(1, 2), 3));
        assert!(!board.would_match_at(Pos::new(2, 2), 3));
        assert!(!board.would_match_at(Pos::new(2, 0), 2));
        // two 1s below (2,2)
        assert!(board.would_match_at(Pos::new(2, 2), 1));
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = Board::generate(GRID_SIZE, TILE_KINDS, &mut StdRng::seed_from_u64(42));
        let b = Board::generate(GRID_SIZE, TILE_KINDS, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.is_full());
    }

    #[test]
    fn test_place_ice_distinct_cells() {
        let mut board = Board::generate(GRID_SIZE, TILE_KINDS, &mut StdRng::seed_from_u64(1));
        let placed = board.place_ice(12, 2, &mut StdRng::seed_from_u64(2));
        assert_eq!(placed, 12);
        assert_eq!(board.frozen_cells(), 12);
        assert!(board.positions().all(|p| matches!(board.ice(p), 0 | 2)));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_specials_and_ice() {
        let mut board = Board::from_rows(&["012", "345", "201"]).unwrap();
        board.set_special(Pos::new(1, 0), Some(Special::ColorBomb));
        board.set_ice(Pos::new(2, 2), 1);
        let restored = Board::from_snapshot(&board.snapshot(), 3, TILE_KINDS).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_most_abundant_kind_prefers_lowest_on_tie() {
        let board = Board::from_rows(&["011", "220", "345"]).unwrap();
        assert_eq!(board.most_abundant_kind(), Some(0));
    }
}
