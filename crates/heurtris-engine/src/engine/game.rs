use std::time::Duration;

use crate::{
    PieceCollisionError, UpdateError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, Placement},
    },
};

use super::{
    GameMode, GameStats, LockOutcome, ScoreState,
    piece_buffer::{PieceBuffer, PieceSeed},
};

/// One move: an optional hold followed by a placement of the resulting current piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub use_hold: bool,
    pub placement: Placement,
}

impl Action {
    #[must_use]
    pub const fn new(use_hold: bool, placement: Placement) -> Self {
        Self {
            use_hold,
            placement,
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameOverReason {
    /// A lock left cells in the first visible row, or the next piece could not spawn.
    ToppedOut,
    /// The requested placement could not enter the board.
    BlockedPlacement,
    /// The game mode's goal (line target or time limit) was reached.
    GoalReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameState {
    Playing,
    Over(GameOverReason),
}

/// A single headless game.
///
/// The game is driven by [`Action`]s through [`Game::update`]. Each action
/// optionally holds, then rotates and translates the current piece at the top
/// of the board, hard-drops it, locks it, clears full rows and scores the lock.
///
/// # Example
///
/// ```
/// use heurtris_engine::{Action, Game, GameMode, PieceSeed, Placement, Rotation};
///
/// let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(1));
/// let action = Action::new(false, Placement::new(Rotation::Initial, 0));
/// let outcome = game.update(Some(action)).unwrap();
/// assert!(outcome.is_some());
/// assert_eq!(game.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    mode: GameMode,
    board: Board,
    current: Option<PieceKind>,
    piece_buffer: PieceBuffer,
    score_state: ScoreState,
    stats: GameStats,
    elapsed: Duration,
    state: GameState,
}

impl Game {
    #[must_use]
    pub fn new(mode: GameMode, seed: PieceSeed) -> Self {
        let mut piece_buffer = PieceBuffer::with_seed(seed);
        let current = Some(piece_buffer.pop_next());
        Self {
            mode,
            board: Board::EMPTY,
            current,
            piece_buffer,
            score_state: ScoreState::new(),
            stats: GameStats::new(),
            elapsed: Duration::ZERO,
            state: GameState::Playing,
        }
    }

    /// Starts a new game in the same mode.
    ///
    /// Board, statistics, hold slot and clock are reset. The piece generator
    /// keeps running, so every new game draws a different sequence.
    pub fn new_game(&mut self) {
        self.piece_buffer.reset();
        self.board = Board::EMPTY;
        self.current = Some(self.piece_buffer.pop_next());
        self.score_state = ScoreState::new();
        self.stats = GameStats::new();
        self.elapsed = Duration::ZERO;
        self.state = GameState::Playing;
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the piece to be placed next, or `None` once the game is over.
    #[must_use]
    pub fn current_piece(&self) -> Option<PieceKind> {
        self.current
    }

    /// Returns the preview queue, nearest piece first.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.piece_buffer.held_piece()
    }

    #[must_use]
    pub fn score_state(&self) -> &ScoreState {
        &self.score_state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Advances the game clock.
    ///
    /// Ends a blitz game once its time limit is reached.
    pub fn tick(&mut self, dt: Duration) {
        if self.is_over() {
            return;
        }
        self.elapsed += dt;
        self.check_goal();
    }

    /// Applies one step.
    ///
    /// `None` is an idle step: nothing is placed, but the mode's goal is still
    /// checked. `Some(action)` places a piece and returns the lock outcome.
    ///
    /// A placement that cannot enter the board at its column ends the game.
    pub fn update(&mut self, action: Option<Action>) -> Result<Option<LockOutcome>, UpdateError> {
        if self.is_over() {
            return Err(UpdateError::GameOver);
        }
        let Some(action) = action else {
            self.check_goal();
            return Ok(None);
        };

        if action.use_hold {
            self.hold()?;
        }
        let Some(kind) = self.current else {
            return Err(UpdateError::GameOver);
        };

        let piece = Piece::placed(kind, action.placement);
        let Some(dropped) = piece.hard_dropped(&self.board) else {
            self.finish(GameOverReason::BlockedPlacement);
            return Err(PieceCollisionError.into());
        };

        Ok(Some(self.lock(&dropped)))
    }

    /// Swaps the current piece into the hold slot.
    ///
    /// Fails without changing anything if the piece coming out of hold cannot spawn.
    fn hold(&mut self) -> Result<(), PieceCollisionError> {
        let next = self.piece_buffer.peek_hold_result();
        if !self.board.check_fit(0, 0, &Piece::spawned(next)) {
            return Err(PieceCollisionError);
        }
        let current = self.current.ok_or(PieceCollisionError)?;
        self.current = Some(self.piece_buffer.hold(current));
        Ok(())
    }

    fn lock(&mut self, piece: &Piece) -> LockOutcome {
        self.board.lock_piece(piece);
        // Reaching the first visible row ends the game even if the lock clears rows.
        let topped_out = self.board.is_topped_out();

        let cleared_lines = self.board.clear_full_rows();
        let full_clear = cleared_lines > 0 && self.board.is_empty();
        let score = self.score_state.score_lock(cleared_lines, full_clear);
        let outcome = LockOutcome {
            cleared_lines,
            full_clear,
            score,
        };
        self.stats.record_lock(&outcome);

        let next = self.piece_buffer.pop_next();
        self.current = Some(next);
        if topped_out || !self.board.check_fit(0, 0, &Piece::spawned(next)) {
            self.finish(GameOverReason::ToppedOut);
        } else {
            self.check_goal();
        }
        outcome
    }

    fn check_goal(&mut self) {
        if self.mode.is_finished(&self.stats, self.elapsed) {
            self.finish(GameOverReason::GoalReached);
        }
    }

    fn finish(&mut self, reason: GameOverReason) {
        self.state = GameState::Over(reason);
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rotation;

    fn game() -> Game {
        Game::new(GameMode::Zen, PieceSeed::from_u64(42))
    }

    fn flat(column: i8) -> Action {
        Action::new(false, Placement::new(Rotation::Initial, column))
    }

    #[test]
    fn test_new_game_state() {
        let game = game();
        assert!(!game.is_over());
        assert!(game.current_piece().is_some());
        assert_eq!(game.held_piece(), None);
        assert!(game.board().is_empty());
        assert!(game.next_pieces().count() > PieceKind::LEN);
    }

    #[test]
    fn test_idle_update_changes_nothing() {
        let mut game = game();
        let before = game.current_piece();
        assert_eq!(game.update(None), Ok(None));
        assert_eq!(game.current_piece(), before);
        assert_eq!(game.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_update_advances_queue() {
        let mut game = game();
        let next = game.next_pieces().next();
        game.update(Some(flat(0))).unwrap();
        assert_eq!(game.current_piece(), next);
        assert!(!game.board().is_empty());
        assert_eq!(game.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_hold_first_use_draws_next() {
        let mut game = game();
        let current = game.current_piece().unwrap();
        let after_next = game.next_pieces().nth(1).unwrap();

        game.update(Some(Action::new(true, Placement::new(Rotation::Initial, 0))))
            .unwrap();
        // the previous next piece was placed, so the one after it is current
        assert_eq!(game.held_piece(), Some(current));
        assert_eq!(game.current_piece(), Some(after_next));
        assert_eq!(game.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_hold_swaps_with_held_piece() {
        let mut game = game();
        game.update(Some(Action::new(true, Placement::new(Rotation::Initial, 0))))
            .unwrap();
        let current = game.current_piece().unwrap();
        game.update(Some(Action::new(true, Placement::new(Rotation::Initial, 4))))
            .unwrap();
        assert_eq!(game.held_piece(), Some(current));
        assert_eq!(game.stats().completed_pieces(), 2);
    }

    #[test]
    fn test_illegal_placement_ends_game() {
        let mut game = game();
        let result = game.update(Some(Action::new(false, Placement::new(Rotation::Initial, 20))));
        assert_eq!(
            result,
            Err(UpdateError::PieceCollision(PieceCollisionError))
        );
        assert_eq!(game.state(), GameState::Over(GameOverReason::BlockedPlacement));
        assert_eq!(game.current_piece(), None);
        assert_eq!(game.update(Some(flat(0))), Err(UpdateError::GameOver));
    }

    #[test]
    fn test_stacking_in_one_column_tops_out() {
        let mut game = game();
        let mut locks = 0;
        while !game.is_over() {
            let kind = game.current_piece().unwrap();
            let rotation = if kind == PieceKind::I {
                Rotation::Left
            } else {
                Rotation::Initial
            };
            let _ = game.update(Some(Action::new(false, Placement::new(rotation, 0))));
            locks += 1;
            assert!(locks < 100, "game should end");
        }
        assert!(game.state().is_over());
    }

    #[test]
    fn test_tetris_full_clear_reaches_line_target() {
        let mut game = Game::new(GameMode::Lines { target: 4 }, PieceSeed::from_u64(3));
        game.board = Board::from_ascii(
            "
            .#########
            .#########
            .#########
            .#########
            ",
        );
        game.current = Some(PieceKind::I);

        let outcome = game
            .update(Some(Action::new(false, Placement::new(Rotation::Left, -1))))
            .unwrap()
            .unwrap();
        assert_eq!(
            outcome,
            LockOutcome {
                cleared_lines: 4,
                full_clear: true,
                score: 800 + 2000,
            }
        );
        assert!(game.board().is_empty());
        assert_eq!(game.stats().tetrises(), 1);
        assert_eq!(game.state(), GameState::Over(GameOverReason::GoalReached));
    }

    #[test]
    fn test_blitz_clock() {
        let mut game = Game::new(GameMode::BLITZ, PieceSeed::from_u64(3));
        game.tick(Duration::from_secs(60));
        assert!(!game.is_over());
        game.tick(Duration::from_secs(60));
        assert_eq!(game.state(), GameState::Over(GameOverReason::GoalReached));
    }

    #[test]
    fn test_new_game_resets() {
        let mut game = game();
        game.update(Some(flat(0))).unwrap();
        game.new_game();
        assert!(game.board().is_empty());
        assert_eq!(game.stats(), &GameStats::new());
        assert_eq!(game.held_piece(), None);
        assert!(!game.is_over());
    }
}
