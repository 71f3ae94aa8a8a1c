use std::ops::RangeInclusive;

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};

use super::board::Board;

/// A piece (tetromino) with kind, rotation and position.
///
/// Pieces are immutable; movement and rotation return new `Piece` values.
///
/// # Coordinate System
///
/// The position is the top-left corner of the piece's 4×4 bounding box, in
/// board coordinates. It may be negative or extend past the right edge as long
/// as the occupied cells stay inside the board (the vertical I piece sits in
/// the third column of its box, so its box can start at column −2).
///
/// # Example
///
/// ```
/// use heurtris_engine::{Piece, PieceKind, Rotation};
///
/// let piece = Piece::new(PieceKind::T)
///     .with_rotation(Rotation::Right)
///     .moved(4, 0);
/// assert_eq!(piece.x(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
}

impl Piece {
    /// Creates a piece at the board origin in its initial rotation.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::Initial,
            x: 0,
            y: 0,
        }
    }

    /// Creates a piece at its spawn position above the visible area.
    #[must_use]
    pub const fn spawned(kind: PieceKind) -> Self {
        Self {
            x: kind.spawn_column(),
            ..Self::new(kind)
        }
    }

    /// Creates a piece rotated and translated for `placement`, at the top of the board.
    #[must_use]
    pub const fn placed(kind: PieceKind, placement: Placement) -> Self {
        Self {
            kind,
            rotation: placement.rotation,
            x: placement.column,
            y: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn x(&self) -> i8 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i8 {
        self.y
    }

    #[must_use]
    pub fn mask(&self) -> PieceMask {
        self.kind.mask(self.rotation)
    }

    /// Returns the four occupied cells in board coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.kind
            .cells(self.rotation)
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    #[must_use]
    pub const fn with_rotation(&self, rotation: Rotation) -> Self {
        Self { rotation, ..*self }
    }

    #[must_use]
    pub const fn moved(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Drops the piece straight down as far as it fits.
    ///
    /// Returns `None` if the piece does not fit where it currently is.
    #[must_use]
    pub fn hard_dropped(&self, board: &Board) -> Option<Self> {
        if !board.check_fit(0, 0, self) {
            return None;
        }
        let mut dy = 0;
        while board.check_fit(0, dy + 1, self) {
            dy += 1;
        }
        Some(self.moved(0, dy))
    }
}

/// Rotation state of a piece.
///
/// `Left` and `Right` are the orientations reached by one counter-clockwise
/// or clockwise turn from `Initial`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rotation {
    #[default]
    Initial = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Rotation {
    pub const ALL: [Self; 4] = [Self::Initial, Self::Left, Self::Down, Self::Right];

    const fn clockwise_turns(self) -> usize {
        match self {
            Self::Initial => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Initial => '0',
            Self::Left => 'L',
            Self::Down => '2',
            Self::Right => 'R',
        }
    }
}

/// Where a piece is dropped: its rotation and the column of its bounding box.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub rotation: Rotation,
    pub column: i8,
}

impl Placement {
    #[must_use]
    pub const fn new(rotation: Rotation, column: i8) -> Self {
        Self { rotation, column }
    }
}

/// Maximum number of placements any piece kind has (J, L and T: 8 + 9 + 8 + 9).
pub const MAX_PLACEMENTS: usize = 34;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::T,
    ];

    pub(crate) fn mask(self, rotation: Rotation) -> PieceMask {
        PIECE_MASKS[self as usize][rotation.clockwise_turns()]
    }

    /// Returns the occupied cells for the piece in the given rotation, relative
    /// to the top-left of its bounding box.
    pub fn cells(self, rotation: Rotation) -> impl Iterator<Item = (i8, i8)> {
        (0_i8..).zip(self.mask(rotation)).flat_map(|(dy, row)| {
            (0_i8..4)
                .filter(move |dx| row & (1_u16 << dx) != 0)
                .map(move |dx| (dx, dy))
        })
    }

    /// Column where the bounding box spawns.
    #[must_use]
    pub const fn spawn_column(self) -> i8 {
        match self {
            Self::O => 4,
            _ => 3,
        }
    }

    /// Returns the rotations that produce distinct shapes, in enumeration order.
    ///
    /// Symmetric pieces only expose the rotations they need: the O piece looks
    /// the same in every rotation, and the I, S and Z pieces repeat after a
    /// half turn.
    #[must_use]
    pub const fn distinct_rotations(self) -> &'static [Rotation] {
        match self {
            Self::O => &[Rotation::Initial],
            Self::I | Self::S | Self::Z => &[Rotation::Initial, Rotation::Left],
            Self::J | Self::L | Self::T => &Rotation::ALL,
        }
    }

    /// Returns the columns a piece may be dropped at in the given rotation.
    ///
    /// The ranges are a fixed table; a few entries (S and Z in their initial
    /// rotation, and J, L and T turned right, all at column 8) push a cell
    /// past the right wall. Those placements are rejected when they are
    /// simulated.
    #[must_use]
    pub const fn column_range(self, rotation: Rotation) -> RangeInclusive<i8> {
        match (self, rotation) {
            (Self::I, Rotation::Initial | Rotation::Down) => 0..=6,
            (Self::I, Rotation::Left) => -1..=8,
            (Self::I, Rotation::Right) => -2..=7,
            (Self::J | Self::L | Self::T, Rotation::Initial | Rotation::Down) => 0..=7,
            (Self::J | Self::L | Self::T, Rotation::Left | Rotation::Right)
            | (Self::O | Self::S | Self::Z, _) => 0..=8,
        }
    }

    /// Enumerates every candidate placement: rotations in
    /// [`Self::distinct_rotations`] order, columns left to right within each.
    #[must_use]
    pub fn placements(self) -> ArrayVec<Placement, MAX_PLACEMENTS> {
        self.distinct_rotations()
            .iter()
            .flat_map(|&rotation| {
                self.column_range(rotation)
                    .map(move |column| Placement::new(rotation, column))
            })
            .collect()
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use heurtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rows of a piece within its 4×4 bounding box; bit `x` of row `y` is the cell at `(x, y)`.
pub(crate) type PieceMask = [u16; 4];

/// Generates all 4 rotation states of a piece mask by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `mask` - Initial piece mask at 0° rotation
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

/// Masks indexed by kind, then by number of clockwise turns.
const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece
        mask_rotations(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};
