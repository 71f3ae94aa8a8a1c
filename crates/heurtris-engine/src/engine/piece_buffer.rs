use std::collections::VecDeque;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;

use crate::PieceKind;

/// Piece stream and hold slot using the 7-bag randomizer.
///
/// # 7-Bag System
///
/// 1. A "bag" holds all 7 piece types
/// 2. The bag is shuffled
/// 3. Pieces are drawn from the bag in order
/// 4. A new shuffled bag is appended when 7 or fewer pieces remain
///
/// The preview therefore always holds at least 8 pieces.
///
/// # Hold System
///
/// - First hold stores the current piece and draws from the queue
/// - Subsequent holds swap the current piece with the held piece
///
/// # Example
///
/// ```
/// use heurtris_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u64(7));
///
/// let first = buffer.pop_next();
/// let upcoming: Vec<_> = buffer.next_pieces().take(5).collect();
/// assert_eq!(upcoming.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
    held: Option<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// Two buffers built from the same seed produce the same piece sequence, so
/// every trial of a training run can be replayed.
///
/// # Example
///
/// ```
/// use heurtris_engine::PieceSeed;
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let fixed = PieceSeed::from_u64(42);
/// # let _ = (seed, fixed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    /// Expands a 64-bit number into a full seed.
    #[must_use]
    pub fn from_u64(seed: u64) -> Self {
        Pcg32::seed_from_u64(seed).random()
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a new piece buffer with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self {
            rng,
            bag,
            held: None,
        };
        this.fill_bag();
        this
    }

    /// Empties the queue and the hold slot and starts over with fresh bags.
    ///
    /// The random generator keeps its state, so consecutive games differ.
    pub fn reset(&mut self) {
        self.bag.clear();
        self.held = None;
        self.fill_bag();
    }

    /// Refills when the bag has 7 or fewer pieces remaining.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece from the bag.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        let next = self.bag.pop_front();
        self.fill_bag();
        next.unwrap_or_else(|| unreachable!("bag is refilled before every draw"))
    }

    /// Returns an iterator over the upcoming pieces in the queue.
    ///
    /// The iterator always yields at least 8 pieces.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }

    /// Returns the piece that would become current if hold is used now.
    ///
    /// - If a piece is held: returns the held piece
    /// - If no piece is held: returns the next piece from the queue
    #[must_use]
    pub fn peek_hold_result(&self) -> PieceKind {
        self.held.unwrap_or_else(|| self.bag[0])
    }

    /// Stores `current` in the hold slot and returns the new current piece.
    ///
    /// - If a piece is held: returns the held piece (swap)
    /// - If no piece is held: returns the next piece from queue
    pub fn hold(&mut self, current: PieceKind) -> PieceKind {
        self.held
            .replace(current)
            .unwrap_or_else(|| self.pop_next())
    }

    /// Returns the currently held piece, if any.
    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }
}
