use std::fmt;

use crate::core::piece::{Piece, PieceMask};

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board, including the spawn buffer.
pub const BOARD_HEIGHT: usize = 22;
/// Rows at the top of the board where pieces appear before they are dropped.
///
/// A lock that leaves any cell filled in the first row below this buffer ends the game.
pub const SPAWN_ROWS: usize = 2;

const SENTINEL_MARGIN_LEFT: u8 = 2;
const MARGIN: usize = SENTINEL_MARGIN_LEFT as usize;

// Left sentinel: bits 0-1
const LEFT_SENTINEL_MASK: u16 = 0b11;
// Right sentinel: bits 12-15, wide enough that a 4-cell mask shifted to the
// rightmost legal offset never escapes the row
const RIGHT_SENTINEL_MASK: u16 = 0b1111 << (MARGIN + BOARD_WIDTH);
const SENTINEL_MASK: u16 = LEFT_SENTINEL_MASK | RIGHT_SENTINEL_MASK;
const PLAYABLE_MASK: u16 = !SENTINEL_MASK;

/// Largest bit offset a piece mask may be shifted by.
const MAX_SHIFT: usize = MARGIN + BOARD_WIDTH;

/// Single row of the board as a 16-bit mask.
///
/// # Bit Layout (LSB to MSB)
///
/// - Bits 0-1: Left wall
/// - Bits 2-11: Playable cells (column 0 to 9)
/// - Bits 12-15: Right wall
///
/// Wall bits are always set, so horizontal bounds checks fall out of the
/// collision test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self {
        bits: SENTINEL_MASK,
    };

    /// Checks if every playable cell is filled.
    #[inline]
    #[must_use]
    pub fn is_full(self) -> bool {
        (self.bits & PLAYABLE_MASK) == PLAYABLE_MASK
    }

    /// Checks if no playable cell is filled.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        (self.bits & PLAYABLE_MASK) == 0
    }

    /// Checks if the cell at board column `x` is filled.
    #[inline]
    #[must_use]
    pub fn is_filled(self, x: usize) -> bool {
        debug_assert!(x < BOARD_WIDTH);
        (self.bits & (1 << (x + MARGIN))) != 0
    }

    #[inline]
    fn is_any_cell_occupied(self, shift: usize, mask: u16) -> bool {
        (self.bits & (mask << shift)) != 0
    }

    #[inline]
    fn occupy_cells(&mut self, shift: usize, mask: u16) {
        self.bits |= (mask << shift) & PLAYABLE_MASK;
    }

    /// Iterates over the playable cells from left to right.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (0..BOARD_WIDTH).map(move |x| Cell::from_filled(self.is_filled(x)))
    }
}

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    Empty,
    Filled,
}

impl Cell {
    #[must_use]
    pub const fn from_filled(filled: bool) -> Self {
        if filled { Self::Filled } else { Self::Empty }
    }
}

/// Bit board used both by the live game and by speculative search copies.
///
/// Coordinates: `x` grows rightward from 0 to 9, `y` grows downward from 0
/// (top of the spawn buffer) to 21 (bottom row).
///
/// The board is `Copy`; search code clones it freely to evaluate candidate
/// placements without touching the live game.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BitRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;
    pub const SPAWN_ROWS: usize = SPAWN_ROWS;

    pub const EMPTY: Self = Self {
        rows: [BitRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns the state of the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the board.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        Cell::from_filled(self.is_filled(x, y))
    }

    /// Returns `true` if the cell at `(x, y)` is filled.
    #[must_use]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        assert!(x < BOARD_WIDTH, "column {x} out of range");
        self.rows[y].is_filled(x)
    }

    /// Returns the row at `y`.
    #[must_use]
    pub fn row(&self, y: usize) -> BitRow {
        self.rows[y]
    }

    pub fn rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows.iter().copied()
    }

    /// Checks whether `piece`, offset by `(dx, dy)`, lies inside the board
    /// without overlapping any filled cell.
    ///
    /// Positions outside the board never fit.
    #[must_use]
    pub fn check_fit(&self, dx: i8, dy: i8, piece: &Piece) -> bool {
        let shift = i16::from(piece.x()) + i16::from(dx) + i16::from(SENTINEL_MARGIN_LEFT);
        let Some(shift) = usize::try_from(shift).ok().filter(|s| *s <= MAX_SHIFT) else {
            return false;
        };
        let y0 = i16::from(piece.y()) + i16::from(dy);
        Self::mask_rows(piece.mask(), y0).all(|(y, mask)| {
            y.is_some_and(|y| !self.rows[y].is_any_cell_occupied(shift, mask))
        })
    }

    /// Writes the cells of `piece` into the board.
    ///
    /// The piece is expected to fit; cells outside the board are ignored.
    pub fn lock_piece(&mut self, piece: &Piece) {
        debug_assert!(self.check_fit(0, 0, piece), "locking a colliding piece");
        let shift = i16::from(piece.x()) + i16::from(SENTINEL_MARGIN_LEFT);
        let Ok(shift) = usize::try_from(shift) else {
            return;
        };
        for (y, mask) in Self::mask_rows(piece.mask(), i16::from(piece.y())) {
            if let Some(y) = y {
                self.rows[y].occupy_cells(shift, mask);
            }
        }
    }

    /// Pairs each non-empty mask row with its board row index, `None` when the
    /// row lies outside the board.
    fn mask_rows(mask: PieceMask, y0: i16) -> impl Iterator<Item = (Option<usize>, u16)> {
        (0_i16..)
            .zip(mask)
            .filter(|(_, row_mask)| *row_mask != 0)
            .map(move |(dy, row_mask)| {
                let y = usize::try_from(y0 + dy)
                    .ok()
                    .filter(|y| *y < BOARD_HEIGHT);
                (y, row_mask)
            })
    }

    /// Clears every full row and shifts the rows above it down.
    ///
    /// Returns the number of rows cleared.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;

        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_full() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BitRow::EMPTY);
        count
    }

    /// Returns `true` if no cell on the board is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    /// Returns `true` if the first row below the spawn buffer holds any filled cell.
    #[must_use]
    pub fn is_topped_out(&self) -> bool {
        !self.rows[SPAWN_ROWS].is_empty()
    }

    /// Creates a board from ASCII art, for tests and fixtures.
    ///
    /// `#` is a filled cell and `.` an empty one. Rows are listed top to bottom
    /// and aligned to the bottom of the board, so only the interesting rows
    /// need to be written.
    ///
    /// # Panics
    ///
    /// Panics if a row is not exactly 10 cells wide or there are more than 22 rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "at most {BOARD_HEIGHT} rows allowed, got {}",
            lines.len()
        );

        let top = BOARD_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at row {i}",
                chars.len(),
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.rows[top + i].occupy_cells(x + MARGIN, 0b1);
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows[SPAWN_ROWS..] {
            for cell in row.cells() {
                f.write_str(if cell.is_filled() { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in &self.rows {
            f.write_str("    ")?;
            for cell in row.cells() {
                f.write_str(if cell.is_filled() { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::core::piece::{PieceKind, Rotation};

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.rows[y].occupy_cells(x + MARGIN, 0b1);
        }
    }

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                assert!(board.cell(x, y).is_empty(), "({x}, {y}) should be empty");
            }
        }
        assert!(board.is_empty());
        assert!(!board.is_topped_out());
    }

    #[test]
    fn test_bit_row_walls_are_not_cells() {
        let mut row = BitRow::EMPTY;
        assert!(row.is_empty());
        assert!(!row.is_full());
        for x in 0..BOARD_WIDTH {
            row.occupy_cells(x + MARGIN, 0b1);
        }
        assert!(row.is_full());
        assert_eq!(row.cells().filter(|c| c.is_filled()).count(), BOARD_WIDTH);
    }

    #[test]
    fn test_check_fit_bounds() {
        let board = Board::EMPTY;
        let piece = Piece::new(PieceKind::O);
        assert!(board.check_fit(0, 0, &piece));
        assert!(board.check_fit(8, 20, &piece));
        assert!(!board.check_fit(9, 0, &piece), "right wall");
        assert!(!board.check_fit(-1, 0, &piece), "left wall");
        assert!(!board.check_fit(0, 21, &piece), "floor");
        assert!(!board.check_fit(0, -1, &piece), "ceiling");
    }

    #[test]
    fn test_check_fit_i_piece_edges() {
        let board = Board::EMPTY;
        let right = Piece::new(PieceKind::I).with_rotation(Rotation::Right);
        assert!(board.check_fit(-2, 0, &right));
        assert!(!board.check_fit(-3, 0, &right));
        assert!(board.check_fit(7, 0, &right));
        assert!(!board.check_fit(8, 0, &right));

        let left = Piece::new(PieceKind::I).with_rotation(Rotation::Left);
        assert!(board.check_fit(-1, 0, &left));
        assert!(board.check_fit(8, 0, &left));
        assert!(!board.check_fit(9, 0, &left));
    }

    #[test]
    fn test_check_fit_far_out_of_range() {
        let board = Board::EMPTY;
        let piece = Piece::new(PieceKind::T);
        assert!(!board.check_fit(i8::MIN, 0, &piece));
        assert!(!board.check_fit(i8::MAX, 0, &piece));
        assert!(!board.check_fit(0, i8::MAX, &piece));
    }

    #[test]
    fn test_lock_piece() {
        let mut board = Board::EMPTY;
        let piece = Piece::new(PieceKind::T).moved(4, 20);
        board.lock_piece(&piece);
        // T initial: {1,0},{0,1},{1,1},{2,1}
        assert!(board.is_filled(5, 20));
        assert!(board.is_filled(4, 21));
        assert!(board.is_filled(5, 21));
        assert!(board.is_filled(6, 21));
        assert!(!board.is_filled(4, 20));
        assert!(!board.check_fit(0, 0, &piece));
    }

    #[test]
    fn test_clear_single_full_row() {
        let mut board = Board::from_ascii(
            "
            #.........
            ##########
            ",
        );
        assert_eq!(board.clear_full_rows(), 1);
        assert!(board.is_filled(0, 21));
        for x in 1..BOARD_WIDTH {
            assert!(!board.is_filled(x, 21));
        }
        assert!(board.row(20).is_empty());
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::from_ascii(
            "
            ..#.......
            ##########
            .#........
            ##########
            ",
        );
        assert_eq!(board.clear_full_rows(), 2);
        assert!(board.is_filled(1, 21));
        assert!(board.is_filled(2, 20));
        assert!(board.row(19).is_empty());
        assert!(!board.is_empty());
    }

    #[test]
    fn test_clear_all_rows() {
        let mut board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_full_rows(), BOARD_HEIGHT);
        assert!(board.is_empty());
    }

    #[test]
    fn test_partial_row_is_kept() {
        let mut board = Board::from_ascii("#########.");
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board.row(21).cells().filter(|c| c.is_filled()).count(), 9);
    }

    #[test]
    fn test_topped_out() {
        let mut board = Board::EMPTY;
        board.lock_piece(&Piece::new(PieceKind::O).moved(0, 1));
        assert!(board.is_topped_out());
    }

    #[test]
    fn test_display_shows_visible_rows() {
        let board = Board::from_ascii("#........#");
        let text = board.to_string();
        assert_eq!(text.lines().count(), BOARD_HEIGHT - SPAWN_ROWS);
        assert_eq!(text.lines().last(), Some("#........#"));
    }

    fn board_from_bits(bits: &[u16]) -> Board {
        let mut board = Board::EMPTY;
        for (y, &row) in bits.iter().enumerate() {
            board.rows[y].occupy_cells(MARGIN, row);
        }
        board
    }

    // 1023 fills a row, so full rows show up often enough
    fn row_bits() -> impl Strategy<Value = Vec<u16>> {
        prop::collection::vec(prop_oneof![Just(1023_u16), 0_u16..1024], BOARD_HEIGHT)
    }

    proptest! {
        #[test]
        fn prop_clear_keeps_partial_rows_in_order(bits in row_bits()) {
            let mut board = board_from_bits(&bits);
            let kept: Vec<BitRow> = board.rows().filter(|row| !row.is_full()).collect();

            let cleared = board.clear_full_rows();
            prop_assert_eq!(cleared, BOARD_HEIGHT - kept.len());
            prop_assert!(board.rows().take(cleared).all(BitRow::is_empty));
            prop_assert_eq!(board.rows().skip(cleared).collect::<Vec<_>>(), kept);
        }

        #[test]
        fn prop_hard_drop_lands_on_a_fitting_resting_spot(
            bits in row_bits(),
            kind in prop::sample::select(PieceKind::ALL.to_vec()),
            index in any::<prop::sample::Index>(),
        ) {
            let board = board_from_bits(&bits);
            let placements = kind.placements();
            let piece = Piece::placed(kind, placements[index.index(placements.len())]);
            match piece.hard_dropped(&board) {
                Some(dropped) => {
                    prop_assert!(board.check_fit(0, 0, &dropped));
                    prop_assert!(!board.check_fit(0, 1, &dropped));
                    prop_assert_eq!(dropped.x(), piece.x());
                    prop_assert!(dropped.y() >= piece.y());
                }
                None => prop_assert!(!board.check_fit(0, 0, &piece)),
            }
        }
    }
}
