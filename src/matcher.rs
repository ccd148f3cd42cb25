//! Match detection: scan rows and columns for runs of three or more, merge runs that
//! share a cell into compound groups, and tag each group as a line or a corner.

use crate::board::{Board, Pos};
use std::collections::HashSet;

/// Minimum run length that counts as a match.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Shape of a matched group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// All cells share one row (horizontal) or one column (vertical).
    Line(Axis),
    /// Spans both axes: intersecting runs forming a T or L.
    Corner,
}

/// Cells of one tile type cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: u8,
    /// Ordered cells: the first run's cells in scan order, followed by cells absorbed
    /// from merged runs.
    pub cells: Vec<Pos>,
    pub shape: Shape,
}

impl Group {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.cells.iter().any(|c| other.contains(*c))
    }

    fn absorb(&mut self, other: Self) {
        for cell in other.cells {
            if !self.contains(cell) {
                self.cells.push(cell);
            }
        }
    }
}

/// Classify a cell set by how many rows and columns it spans.
pub fn classify(cells: &[Pos]) -> Shape {
    let rows: HashSet<usize> = cells.iter().map(|c| c.row).collect();
    let cols: HashSet<usize> = cells.iter().map(|c| c.col).collect();
    if rows.len() == 1 {
        Shape::Line(Axis::Horizontal)
    } else if cols.len() == 1 {
        Shape::Line(Axis::Vertical)
    } else {
        Shape::Corner
    }
}

/// Maximal runs of length >= [`MIN_RUN`] along one axis. Empty cells end a run.
fn scan_runs(board: &Board, axis: Axis) -> Vec<Group> {
    let n = board.size();
    let at = |line: usize, i: usize| match axis {
        Axis::Horizontal => Pos::new(line, i),
        Axis::Vertical => Pos::new(i, line),
    };
    let mut runs = Vec::new();
    for line in 0..n {
        let mut start = 0;
        while start < n {
            let kind = board.kind(at(line, start));
            let mut end = start + 1;
            while end < n && kind.is_some() && board.kind(at(line, end)) == kind {
                end += 1;
            }
            if let Some(kind) = kind {
                if end - start >= MIN_RUN {
                    runs.push(Group {
                        kind,
                        cells: (start..end).map(|i| at(line, i)).collect(),
                        shape: Shape::Line(axis),
                    });
                }
            }
            start = end;
        }
    }
    runs
}

/// All matched groups on the board, deduplicated.
///
/// Horizontal runs are collected first, then vertical ones; runs of the same type that
/// share a cell are merged until no merge applies.
pub fn find_groups(board: &Board) -> Vec<Group> {
    let mut groups = scan_runs(board, Axis::Horizontal);
    groups.extend(scan_runs(board, Axis::Vertical));

    'merge: loop {
        for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                if groups[i].kind == groups[j].kind && groups[i].overlaps(&groups[j]) {
                    let absorbed = groups.remove(j);
                    groups[i].absorb(absorbed);
                    continue 'merge;
                }
            }
        }
        break;
    }

    let mut seen: HashSet<Vec<Pos>> = HashSet::new();
    groups.retain_mut(|g| {
        g.shape = classify(&g.cells);
        let mut key = g.cells.clone();
        key.sort_unstable();
        seen.insert(key)
    });
    groups
}

/// True if the board holds at least one run of three.
pub fn has_match(board: &Board) -> bool {
    !scan_runs(board, Axis::Horizontal).is_empty() || !scan_runs(board, Axis::Vertical).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&str]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_no_match_on_checker_pattern() {
        let b = board(&["0101", "2323", "0101", "2323"]);
        assert!(find_groups(&b).is_empty());
        assert!(!has_match(&b));
    }

    #[test]
    fn test_horizontal_run_of_three() {
        let b = board(&["1110", "2323", "0101", "2323"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, 1);
        assert_eq!(groups[0].shape, Shape::Line(Axis::Horizontal));
        assert_eq!(
            groups[0].cells,
            vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)]
        );
    }

    #[test]
    fn test_vertical_run_of_four() {
        let b = board(&["0412", "2423", "0401", "2413"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].shape, Shape::Line(Axis::Vertical));
        assert_eq!(groups[0].len(), 4);
    }

    #[test]
    fn test_run_at_row_end_is_found() {
        let b = board(&["0333", "2121", "0101", "2323"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].cells[2], Pos::new(0, 3));
    }

    #[test]
    fn test_l_shape_merges_into_corner() {
        // 5s: row 0 cols 0..3 and column 0 rows 0..3
        let b = board(&["55512", "51234", "52301", "10423", "23140"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].shape, Shape::Corner);
        assert_eq!(groups[0].len(), 5);
        assert_eq!(groups[0].kind, 5);
    }

    #[test]
    fn test_t_shape_merges_into_corner() {
        let b = board(&["44401", "12430", "30412", "21034", "03121"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].shape, Shape::Corner);
        assert_eq!(groups[0].len(), 5);
        // the horizontal run comes first in the ordered cell list
        assert_eq!(groups[0].cells[0], Pos::new(0, 0));
    }

    #[test]
    fn test_separate_groups_of_different_kinds() {
        let b = board(&["0001", "2323", "1110", "2323"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, 0);
        assert_eq!(groups[1].kind, 1);
    }

    #[test]
    fn test_long_line_stays_a_line() {
        let b = board(&["22222", "01010", "34343", "01010", "34343"]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].shape, Shape::Line(Axis::Horizontal));
        assert_eq!(groups[0].len(), 5);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&[Pos::new(2, 0), Pos::new(2, 1), Pos::new(2, 2)]),
            Shape::Line(Axis::Horizontal)
        );
        assert_eq!(
            classify(&[Pos::new(0, 4), Pos::new(1, 4), Pos::new(2, 4)]),
            Shape::Line(Axis::Vertical)
        );
        assert_eq!(
            classify(&[Pos::new(0, 0), Pos::new(0, 1), Pos::new(1, 0)]),
            Shape::Corner
        );
    }
}
