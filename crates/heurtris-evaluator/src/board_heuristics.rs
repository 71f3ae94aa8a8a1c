//! Board heuristics: the feature vector the move search scores.
//!
//! [`BoardHeuristics::from_board`] turns a board snapshot into eight integer
//! measurements. The scan covers the 20 visible rows only; the two spawn rows
//! above them are ignored, except that a well probe may climb into them.
//!
//! # Features
//!
//! | Field | Meaning |
//! |---|---|
//! | `hole_count` | Empty cells below the topmost filled cell of their column |
//! | `aggregate_height` | Sum of the column heights |
//! | `max_height` | Tallest column |
//! | `bumpiness` | Sum of height differences between neighbouring columns |
//! | `row_transition` | Filled/empty edges inside each row, from the tallest column's top down |
//! | `col_transition` | Filled/empty edges inside each column, below its surface |
//! | `well_depth` | Depth of the deepest well (3 cells or more) |
//! | `additional_well_count` | Number of wells minus one (`-1` when there is none) |
//!
//! # Column Heights
//!
//! The height of a column is `22 - y` where `y` is the row index of its topmost
//! filled cell, so a single cell on the floor has height 1. Bumpiness compares
//! each column with the one before it; the first column is compared with itself
//! and never contributes. An empty column counts as height 0.
//!
//! # Wells
//!
//! A well is probed upward from the cell just above a column's surface: each
//! empty cell whose left and right neighbours are filled (the walls count as
//! filled) deepens it by one. Shallower gaps than 3 are not wells.

use heurtris_engine::Board;

/// Minimum depth for a gap to count as a well.
const MIN_WELL_DEPTH: u32 = 3;

/// Height of the visible area.
const VISIBLE_HEIGHT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardHeuristics {
    pub hole_count: u32,
    pub aggregate_height: u32,
    pub max_height: u32,
    pub bumpiness: u32,
    pub row_transition: u32,
    pub col_transition: u32,
    pub well_depth: u32,
    /// Wells beyond the first; `-1` when the board has no well.
    pub additional_well_count: i32,
}

impl Default for BoardHeuristics {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoardHeuristics {
    /// Heuristics of an empty board.
    pub const EMPTY: Self = Self {
        hole_count: 0,
        aggregate_height: 0,
        max_height: 0,
        bumpiness: 0,
        row_transition: 0,
        col_transition: 0,
        well_depth: 0,
        additional_well_count: -1,
    };

    /// Extracts the heuristics of `board`.
    ///
    /// # Example
    ///
    /// ```
    /// use heurtris_engine::Board;
    /// use heurtris_evaluator::BoardHeuristics;
    ///
    /// let board = Board::from_ascii(
    ///     "
    ///     #.........
    ///     ###........
    ///     ",
    /// );
    /// let h = BoardHeuristics::from_board(&board);
    /// assert_eq!(h.aggregate_height, 3);
    /// assert_eq!(h.max_height, 2);
    /// // the empty third column adds the second column's height
    /// assert_eq!(h.bumpiness, 2);
    /// ```
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let mut h = Self::EMPTY;
        let mut last_height = 0;

        for x in 0..Board::WIDTH {
            let mut height = None;
            let mut prev_filled = false;

            let rows = (Board::SPAWN_ROWS..Board::HEIGHT).zip((1..=VISIBLE_HEIGHT).rev());
            for (y, row_height) in rows {
                let filled = board.is_filled(x, y);
                if height.is_none() {
                    if filled {
                        height = Some(row_height);
                    }
                } else {
                    if !filled {
                        h.hole_count += 1;
                    }
                    if filled != prev_filled {
                        h.col_transition += 1;
                    }
                }
                prev_filled = filled;
            }

            let height = height.unwrap_or(0);
            if x == 0 {
                last_height = height;
            }
            h.aggregate_height += height;
            h.max_height = h.max_height.max(height);
            h.bumpiness += height.abs_diff(last_height);
            last_height = height;

            let depth = well_depth_above(board, x, height);
            if depth >= MIN_WELL_DEPTH {
                h.well_depth = h.well_depth.max(depth);
                h.additional_well_count += 1;
            }
        }

        h.row_transition = row_transitions(board, h.max_height);
        h
    }
}

fn well_depth_above(board: &Board, x: usize, height: u32) -> u32 {
    let surface = Board::HEIGHT - height as usize;
    let mut depth = 0;
    for y in (0..surface).rev() {
        let side_filled = |x: Option<usize>| match x {
            Some(x) if x < Board::WIDTH => board.is_filled(x, y),
            _ => true,
        };
        if board.is_filled(x, y) || !side_filled(x.checked_sub(1)) || !side_filled(Some(x + 1)) {
            break;
        }
        depth += 1;
    }
    depth
}

fn row_transitions(board: &Board, max_height: u32) -> u32 {
    let top = Board::HEIGHT - max_height as usize;
    let mut transitions = 0;
    for y in top..Board::HEIGHT {
        let mut prev = board.is_filled(0, y);
        for x in 1..Board::WIDTH {
            let filled = board.is_filled(x, y);
            if filled != prev {
                transitions += 1;
            }
            prev = filled;
        }
    }
    transitions
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_board() {
        let h = BoardHeuristics::from_board(&Board::EMPTY);
        assert_eq!(h, BoardHeuristics::EMPTY);
        assert_eq!(h.additional_well_count, -1);
    }

    #[test]
    fn test_hole_and_column_transitions() {
        let board = Board::from_ascii(
            "
            #.........
            ..........
            #.........
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.hole_count, 1);
        assert_eq!(h.col_transition, 2);
        assert_eq!(h.aggregate_height, 3);
        assert_eq!(h.max_height, 3);
        // column 1 is empty: it adds column 0's height, the rest add nothing
        assert_eq!(h.bumpiness, 3);
        assert_eq!(h.row_transition, 2);
        assert_eq!(h.additional_well_count, -1);
    }

    #[test]
    fn test_first_column_never_adds_bumpiness() {
        let board = Board::from_ascii(
            "
            #.........
            #.........
            #.........
            #.........
            ##########
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.max_height, 5);
        assert_eq!(h.aggregate_height, 5 + 9);
        assert_eq!(h.bumpiness, 4);
    }

    #[test]
    fn test_well_between_stacks() {
        let board = Board::from_ascii(
            "
            #.########
            #.########
            #.########
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.hole_count, 0);
        assert_eq!(h.aggregate_height, 27);
        assert_eq!(h.max_height, 3);
        assert_eq!(h.bumpiness, 6);
        assert_eq!(h.col_transition, 0);
        assert_eq!(h.row_transition, 6);
        assert_eq!(h.well_depth, 3);
        assert_eq!(h.additional_well_count, 0);
    }

    #[test]
    fn test_shallow_gap_is_not_a_well() {
        let board = Board::from_ascii(
            "
            #.########
            #.########
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.well_depth, 0);
        assert_eq!(h.additional_well_count, -1);
    }

    #[test]
    fn test_wall_counts_as_filled() {
        let board = Board::from_ascii(
            "
            .#........
            .#........
            .#........
            .#........
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.well_depth, 4);
        assert_eq!(h.additional_well_count, 0);
    }

    #[test]
    fn test_two_wells() {
        let board = Board::from_ascii(
            "
            .####.####
            .####.####
            .####.####
            ",
        );
        let h = BoardHeuristics::from_board(&board);
        assert_eq!(h.well_depth, 3);
        assert_eq!(h.additional_well_count, 1);
    }

    fn board_from_rows(rows: &[u16]) -> Board {
        let art: String = rows
            .iter()
            .map(|row| {
                let mut line: String = (0..Board::WIDTH)
                    .map(|x| if row & (1 << x) != 0 { '#' } else { '.' })
                    .collect();
                line.push('\n');
                line
            })
            .collect();
        Board::from_ascii(&art)
    }

    proptest! {
        #[test]
        fn prop_heuristics_are_bounded(rows in prop::collection::vec(0_u16..1024, 0..=20)) {
            let board = board_from_rows(&rows);
            let h = BoardHeuristics::from_board(&board);
            prop_assert!(h.max_height <= VISIBLE_HEIGHT);
            prop_assert!(h.additional_well_count >= -1);
            prop_assert!(h.aggregate_height <= h.max_height * 10);
            prop_assert!(h.hole_count <= h.aggregate_height);
            prop_assert_eq!(h.well_depth == 0, h.additional_well_count == -1);
        }

        #[test]
        fn prop_extraction_is_pure(rows in prop::collection::vec(0_u16..1024, 0..=20)) {
            let board = board_from_rows(&rows);
            let before = board;
            let first = BoardHeuristics::from_board(&board);
            let second = BoardHeuristics::from_board(&board);
            prop_assert_eq!(first, second);
            prop_assert_eq!(board, before);
        }
    }
}
