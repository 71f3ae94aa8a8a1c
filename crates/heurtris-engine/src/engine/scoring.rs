/// Base points for clearing 1 to 4 lines at once.
const BASE_SCORE: [u64; 5] = [0, 100, 300, 500, 800];

/// Bonus points when a clear of 1 to 3 lines empties the board.
const FULL_CLEAR_BONUS: [u64; 4] = [0, 800, 1200, 1800];
const FULL_CLEAR_TETRIS_BONUS: u64 = 2000;
const FULL_CLEAR_B2B_TETRIS_BONUS: u64 = 3200;

const COMBO_SCORE: u64 = 50;

/// Scoring state carried from one lock to the next.
///
/// This is everything the line-clear scorer needs besides the number of lines
/// cleared. It is `Copy` so speculative search can carry its own copy per
/// candidate placement without touching the live game.
///
/// # Rules
///
/// - Clearing 1/2/3/4 lines yields 100/300/500/800 base points.
/// - A 4-line clear extends the back-to-back chain; a 1 to 3 line clear resets
///   it to −1, so the next 4-line clear restarts it at 0. A positive chain
///   multiplies the base by 1.5.
/// - Every clear extends the combo and adds `combo * 50 * level`; a lock
///   without a clear resets the combo to −1.
/// - A clear that leaves the board empty adds 800/1200/1800 for 1 to 3 lines,
///   and 2000 for 4 lines (3200 while the back-to-back chain is positive).
/// - Base points and bonuses are multiplied by `level`.
///
/// # Example
///
/// ```
/// use heurtris_engine::ScoreState;
///
/// let mut state = ScoreState::new();
/// assert_eq!(state.score_lock(1, false), 100);
/// // second clear in a row: combo 1
/// assert_eq!(state.score_lock(1, false), 150);
/// assert_eq!(state.score_lock(0, false), 0);
/// assert_eq!(state.combo(), -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreState {
    combo: i32,
    b2b_chain: i32,
    level: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_level(1)
    }

    #[must_use]
    pub const fn with_level(level: u32) -> Self {
        Self {
            combo: -1,
            b2b_chain: -1,
            level,
        }
    }

    #[must_use]
    pub const fn combo(&self) -> i32 {
        self.combo
    }

    #[must_use]
    pub const fn b2b_chain(&self) -> i32 {
        self.b2b_chain
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Updates the state for a lock that cleared `cleared_lines` rows and
    /// returns the points it earned.
    ///
    /// `full_clear` tells whether the board is empty after the clear.
    pub fn score_lock(&mut self, cleared_lines: usize, full_clear: bool) -> u64 {
        if cleared_lines == 0 {
            self.combo = -1;
            return 0;
        }

        self.combo += 1;
        let level = u64::from(self.level);
        let combo_score = u64::from(self.combo.unsigned_abs()) * COMBO_SCORE * level;

        let lines = cleared_lines.min(4);
        if lines == 4 {
            self.b2b_chain += 1;
        } else {
            self.b2b_chain = -1;
        }
        let b2b_active = self.b2b_chain > 0;

        let mut base = BASE_SCORE[lines];
        if b2b_active {
            base = base * 3 / 2;
        }

        if full_clear {
            base += match lines {
                4 if b2b_active => FULL_CLEAR_B2B_TETRIS_BONUS,
                4 => FULL_CLEAR_TETRIS_BONUS,
                _ => FULL_CLEAR_BONUS[lines],
            };
        }

        combo_score + base * level
    }
}
