/// Result of locking one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    /// Number of rows cleared by the lock (0-4).
    pub cleared_lines: usize,
    /// Whether the board was empty after the clear.
    pub full_clear: bool,
    /// Points earned by the lock.
    pub score: u64,
}

/// Cumulative statistics of one game.
///
/// Tracks:
///
/// - **Score**: Points earned from line clears, combos and bonuses
/// - **Cleared lines**: Total rows removed
/// - **Completed pieces**: Total number of pieces locked
/// - **Tetrises / full clears**: Special clear counters
/// - **Line clear distribution**: Count of locks by number of rows cleared
///
/// # Example
///
/// ```
/// use heurtris_engine::{GameStats, LockOutcome};
///
/// let mut stats = GameStats::new();
/// stats.record_lock(&LockOutcome { cleared_lines: 4, full_clear: false, score: 800 });
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    tetrises: usize,
    full_clears: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    /// Creates a new statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            tetrises: 0,
            full_clears: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    #[must_use]
    pub const fn tetrises(&self) -> usize {
        self.tetrises
    }

    #[must_use]
    pub const fn full_clears(&self) -> usize {
        self.full_clears
    }

    /// Returns a histogram of locks by rows cleared.
    ///
    /// Index 0 counts locks that cleared nothing, index 4 counts tetrises.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece lock.
    pub fn record_lock(&mut self, outcome: &LockOutcome) {
        let lines = outcome.cleared_lines;
        self.completed_pieces += 1;
        self.total_cleared_lines += lines;
        self.score += outcome.score;
        if let Some(count) = self.line_cleared_counter.get_mut(lines) {
            *count += 1;
        }
        if lines == 4 {
            self.tetrises += 1;
        }
        if outcome.full_clear {
            self.full_clears += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lock_accumulates() {
        let mut stats = GameStats::new();
        stats.record_lock(&LockOutcome {
            cleared_lines: 0,
            full_clear: false,
            score: 0,
        });
        stats.record_lock(&LockOutcome {
            cleared_lines: 2,
            full_clear: true,
            score: 1500,
        });
        assert_eq!(stats.completed_pieces(), 2);
        assert_eq!(stats.total_cleared_lines(), 2);
        assert_eq!(stats.score(), 1500);
        assert_eq!(stats.full_clears(), 1);
        assert_eq!(stats.tetrises(), 0);
        assert_eq!(stats.line_cleared_counter(), &[1, 0, 1, 0, 0]);
    }
}
