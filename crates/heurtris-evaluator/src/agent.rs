use heurtris_engine::{Game, GameStats, LockOutcome, UpdateError};

use crate::{HeuristicsWeights, MoveSearch};

/// Plays games by applying the move chosen by a [`MoveSearch`] at every step.
///
/// # Example
///
/// ```
/// use heurtris_engine::{Game, GameMode, PieceSeed};
/// use heurtris_evaluator::{HeuristicAgent, HeuristicsWeights};
///
/// let mut agent = HeuristicAgent::new(HeuristicsWeights::default());
/// let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(5));
/// let stats = agent.play_game(&mut game, 10);
/// assert!(stats.completed_pieces() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicAgent {
    search: MoveSearch,
}

impl HeuristicAgent {
    #[must_use]
    pub const fn new(weights: HeuristicsWeights) -> Self {
        Self {
            search: MoveSearch::new(weights),
        }
    }

    #[must_use]
    pub const fn weights(&self) -> &HeuristicsWeights {
        self.search.weights()
    }

    /// Searches and applies one move.
    pub fn step(&mut self, game: &mut Game) -> Result<Option<LockOutcome>, UpdateError> {
        let best = self
            .search
            .find_best_move_for(game)
            .ok_or(UpdateError::GameOver)?;
        game.update(Some(best.action()))
    }

    /// Plays `game` from its current position until it is over or `max_lines`
    /// lines have been cleared, and returns its final statistics.
    ///
    /// The game is not reset first; call [`Game::new_game`] between trials.
    pub fn play_game(&mut self, game: &mut Game, max_lines: usize) -> GameStats {
        self.search.clear_cache();
        while !game.is_over() && game.stats().total_cleared_lines() < max_lines {
            if self.step(game).is_err() {
                break;
            }
        }
        game.stats().clone()
    }
}

#[cfg(test)]
mod tests {
    use heurtris_engine::{GameMode, PieceSeed};

    use super::*;

    #[test]
    fn test_zero_line_cap_places_nothing() {
        let mut agent = HeuristicAgent::new(HeuristicsWeights::default());
        let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(1));
        let stats = agent.play_game(&mut game, 0);
        assert_eq!(stats.completed_pieces(), 0);
        assert!(!game.is_over());
    }

    #[test]
    fn test_play_stops_at_line_cap_or_game_over() {
        let mut agent = HeuristicAgent::new(HeuristicsWeights::default());
        let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(8));
        let stats = agent.play_game(&mut game, 5);
        assert_eq!(&stats, game.stats());
        assert!(game.is_over() || stats.total_cleared_lines() >= 5);
    }

    #[test]
    fn test_same_seed_same_game() {
        let weights = HeuristicsWeights::default();
        let play = || {
            let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(21));
            HeuristicAgent::new(weights).play_game(&mut game, 3)
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_step_on_finished_game() {
        let mut agent = HeuristicAgent::new(HeuristicsWeights::default());
        let mut game = Game::new(GameMode::Lines { target: 0 }, PieceSeed::from_u64(1));
        game.update(None).unwrap();
        assert!(game.is_over());
        assert_eq!(agent.step(&mut game), Err(UpdateError::GameOver));
    }
}
