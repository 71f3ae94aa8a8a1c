use std::time::Duration;

use super::GameStats;

/// End condition of a game, besides topping out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameMode {
    /// Ends once `target` lines have been cleared.
    Lines { target: usize },
    /// Ends once the game clock reaches `time_limit`.
    Blitz { time_limit: Duration },
    /// Ends only by topping out.
    #[default]
    Zen,
}

impl GameMode {
    /// 40-line sprint.
    pub const SPRINT: Self = Self::Lines { target: 40 };
    /// Two-minute blitz.
    pub const BLITZ: Self = Self::Blitz {
        time_limit: Duration::from_secs(120),
    };

    /// Returns `true` if the mode's goal has been reached.
    #[must_use]
    pub fn is_finished(&self, stats: &GameStats, elapsed: Duration) -> bool {
        match self {
            Self::Lines { target } => stats.total_cleared_lines() >= *target,
            Self::Blitz { time_limit } => elapsed >= *time_limit,
            Self::Zen => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LockOutcome;

    #[test]
    fn test_lines_mode_finishes_at_target() {
        let mode = GameMode::Lines { target: 4 };
        let mut stats = GameStats::new();
        assert!(!mode.is_finished(&stats, Duration::ZERO));
        stats.record_lock(&LockOutcome {
            cleared_lines: 4,
            full_clear: false,
            score: 800,
        });
        assert!(mode.is_finished(&stats, Duration::ZERO));
    }

    #[test]
    fn test_blitz_mode_finishes_on_time() {
        let stats = GameStats::new();
        assert!(!GameMode::BLITZ.is_finished(&stats, Duration::from_secs(119)));
        assert!(GameMode::BLITZ.is_finished(&stats, Duration::from_secs(120)));
        assert!(!GameMode::Zen.is_finished(&stats, Duration::from_secs(10_000)));
    }
}
