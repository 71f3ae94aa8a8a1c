//! Two-piece lookahead move search with optional hold.
//!
//! # How It Works
//!
//! For a piece stream `(first, second)` the search evaluates every placement of
//! `first`, and on each resulting board every placement of `second`. A pair is
//! worth the sum of the two single-placement rewards; the stream is worth its
//! best pair. Only the first placement of the winning pair is played.
//!
//! Two streams compete:
//!
//! - **No hold**: `(current, next)`
//! - **Hold**: `(held, next)` when a piece is held, otherwise `(next, after_next)`
//!
//! The hold stream is skipped when it is identical to the no-hold stream, and it
//! is chosen only when it is strictly better.
//!
//! # Single-Placement Reward
//!
//! A placement is simulated on a scratch [`SearchState`]: the piece is rotated
//! and moved to its column at the top of the board, hard-dropped and locked.
//! Heuristics are extracted from the locked board before full rows are cleared,
//! then rows are cleared and the lock is scored with the carried [`ScoreState`].
//! See [`scorer`] for how both are combined.
//!
//! A placement whose piece cannot enter the board scores
//! [`ILLEGAL_PLACEMENT_REWARD`]. The second piece is then evaluated on the
//! unchanged board, so a hopeless position still yields a move.
//!
//! # Determinism
//!
//! Placements are enumerated rotation-major, columns ascending, and every
//! comparison is a strict `>`: on ties the earliest candidate wins.
//!
//! # Lookahead Cache
//!
//! After a search, the second-ply evaluations of the winning placement are kept
//! together with the state they were computed on. The next search reuses them
//! as its first ply when a stream starts from that very state with that very
//! piece, which is the case whenever the move was played as returned. Any
//! mismatch recomputes the ply, so results never depend on the cache.

use arrayvec::ArrayVec;
use heurtris_engine::{
    Action, Board, Game, MAX_PLACEMENTS, Piece, PieceKind, Placement, ScoreState,
};

use crate::{BoardHeuristics, HeuristicsWeights, scorer};

/// Reward of a placement whose piece cannot enter the board.
pub const ILLEGAL_PLACEMENT_REWARD: f64 = -1e5;

/// The part of a game that decides the outcome of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchState {
    pub board: Board,
    pub score_state: ScoreState,
}

impl SearchState {
    #[must_use]
    pub const fn new(board: Board, score_state: ScoreState) -> Self {
        Self { board, score_state }
    }

    #[must_use]
    pub fn from_game(game: &Game) -> Self {
        Self::new(*game.board(), *game.score_state())
    }
}

/// Pieces visible to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceQueue {
    pub current: PieceKind,
    pub next: PieceKind,
    pub after_next: PieceKind,
    pub held: Option<PieceKind>,
}

impl PieceQueue {
    /// Reads the queue of a running game; `None` once the game is over.
    #[must_use]
    pub fn from_game(game: &Game) -> Option<Self> {
        let current = game.current_piece()?;
        let mut upcoming = game.next_pieces();
        let next = upcoming.next()?;
        let after_next = upcoming.next()?;
        Some(Self {
            current,
            next,
            after_next,
            held: game.held_piece(),
        })
    }

    /// The `(first, second)` pieces to be placed if hold is used now.
    #[must_use]
    pub const fn hold_stream(&self) -> (PieceKind, PieceKind) {
        match self.held {
            Some(held) => (held, self.next),
            None => (self.next, self.after_next),
        }
    }
}

/// Result of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMove {
    pub use_hold: bool,
    pub placement: Placement,
    /// Combined reward of the best placement pair.
    pub reward: f64,
}

impl BestMove {
    #[must_use]
    pub const fn action(&self) -> Action {
        Action::new(self.use_hold, self.placement)
    }
}

#[derive(Debug, Clone, Copy)]
struct PlyOutcome {
    placement: Placement,
    reward: f64,
    /// State after the lock, `None` if the piece could not enter the board.
    after: Option<SearchState>,
}

type PlyOutcomes = ArrayVec<PlyOutcome, MAX_PLACEMENTS>;

#[derive(Debug, Clone)]
struct LookaheadCache {
    state: SearchState,
    kind: PieceKind,
    outcomes: PlyOutcomes,
}

#[derive(Debug)]
struct BranchResult {
    placement: Placement,
    reward: f64,
    follow_up: LookaheadCache,
}

/// Heuristic move search driven by a fixed weight vector.
///
/// # Example
///
/// ```
/// use heurtris_engine::{Game, GameMode, PieceSeed};
/// use heurtris_evaluator::{HeuristicsWeights, MoveSearch};
///
/// let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(0));
/// let mut search = MoveSearch::new(HeuristicsWeights::default());
///
/// let best = search.find_best_move_for(&game).unwrap();
/// game.update(Some(best.action())).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MoveSearch {
    weights: HeuristicsWeights,
    cache: Option<LookaheadCache>,
}

impl MoveSearch {
    #[must_use]
    pub const fn new(weights: HeuristicsWeights) -> Self {
        Self {
            weights,
            cache: None,
        }
    }

    #[must_use]
    pub const fn weights(&self) -> &HeuristicsWeights {
        &self.weights
    }

    /// Forgets the lookahead kept from the previous search.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Reward of placing a single `kind` piece at `placement`.
    #[must_use]
    pub fn evaluate_placement(
        &self,
        state: &SearchState,
        kind: PieceKind,
        placement: Placement,
    ) -> f64 {
        self.simulate(state, kind, placement).reward
    }

    /// Searches the best move of a running game; `None` once the game is over.
    pub fn find_best_move_for(&mut self, game: &Game) -> Option<BestMove> {
        let queue = PieceQueue::from_game(game)?;
        Some(self.find_best_move(&SearchState::from_game(game), &queue))
    }

    pub fn find_best_move(&mut self, state: &SearchState, queue: &PieceQueue) -> BestMove {
        let cache = self.cache.take();

        let stay = self.search_stream(state, queue.current, queue.next, cache.as_ref());
        let (hold_first, hold_second) = queue.hold_stream();
        let swap = ((hold_first, hold_second) != (queue.current, queue.next))
            .then(|| self.search_stream(state, hold_first, hold_second, cache.as_ref()));

        // a tie keeps the current piece; holding must strictly win
        let (use_hold, chosen) = match swap {
            Some(swap) if swap.reward > stay.reward => (true, swap),
            _ => (false, stay),
        };
        self.cache = Some(chosen.follow_up);

        BestMove {
            use_hold,
            placement: chosen.placement,
            reward: chosen.reward,
        }
    }

    fn search_stream(
        &self,
        state: &SearchState,
        first: PieceKind,
        second: PieceKind,
        cache: Option<&LookaheadCache>,
    ) -> BranchResult {
        let computed;
        let first_ply = match cache.filter(|c| c.kind == first && c.state == *state) {
            Some(cache) => &cache.outcomes,
            None => {
                computed = self.expand(state, first);
                &computed
            }
        };

        let mut best: Option<BranchResult> = None;
        for outcome in first_ply {
            let base = outcome.after.unwrap_or(*state);
            let second_ply = self.expand(&base, second);
            let reward = outcome.reward + best_reward(&second_ply);
            if best.as_ref().is_none_or(|best| reward > best.reward) {
                best = Some(BranchResult {
                    placement: outcome.placement,
                    reward,
                    follow_up: LookaheadCache {
                        state: base,
                        kind: second,
                        outcomes: second_ply,
                    },
                });
            }
        }
        best.unwrap_or_else(|| unreachable!("every piece kind has placements"))
    }

    fn expand(&self, state: &SearchState, kind: PieceKind) -> PlyOutcomes {
        kind.placements()
            .into_iter()
            .map(|placement| self.simulate(state, kind, placement))
            .collect()
    }

    #[expect(clippy::cast_precision_loss)]
    fn simulate(&self, state: &SearchState, kind: PieceKind, placement: Placement) -> PlyOutcome {
        let Some(piece) = Piece::placed(kind, placement).hard_dropped(&state.board) else {
            return PlyOutcome {
                placement,
                reward: ILLEGAL_PLACEMENT_REWARD,
                after: None,
            };
        };

        let mut after = *state;
        after.board.lock_piece(&piece);
        let heuristics = BoardHeuristics::from_board(&after.board);
        let cleared_lines = after.board.clear_full_rows();
        let full_clear = cleared_lines > 0 && after.board.is_empty();
        let score_delta = after.score_state.score_lock(cleared_lines, full_clear);

        PlyOutcome {
            placement,
            reward: scorer::score(&heuristics, &self.weights, score_delta as f64),
            after: Some(after),
        }
    }
}

fn best_reward(outcomes: &[PlyOutcome]) -> f64 {
    outcomes
        .iter()
        .fold(f64::NEG_INFINITY, |best, o| if o.reward > best { o.reward } else { best })
}

#[cfg(test)]
mod tests {
    use heurtris_engine::{GameMode, PieceSeed, Rotation};

    use super::*;

    fn queue(current: PieceKind, next: PieceKind, after_next: PieceKind) -> PieceQueue {
        PieceQueue {
            current,
            next,
            after_next,
            held: None,
        }
    }

    fn tetris_ready() -> SearchState {
        SearchState::new(
            Board::from_ascii(
                "
                #########.
                #########.
                #########.
                #########.
                ",
            ),
            ScoreState::new(),
        )
    }

    fn cleared_lines(state: &SearchState, kind: PieceKind, placement: Placement) -> usize {
        let mut board = state.board;
        let piece = Piece::placed(kind, placement).hard_dropped(&board).unwrap();
        board.lock_piece(&piece);
        board.clear_full_rows()
    }

    #[test]
    fn test_out_of_bounds_placement_gets_sentinel() {
        let search = MoveSearch::new(HeuristicsWeights::default());
        let state = SearchState::new(Board::EMPTY, ScoreState::new());
        let reward =
            search.evaluate_placement(&state, PieceKind::J, Placement::new(Rotation::Right, 8));
        assert_eq!(reward, ILLEGAL_PLACEMENT_REWARD);
    }

    #[test]
    fn test_single_clear_reward_includes_score() {
        let weights = HeuristicsWeights::from_fn(|i| if i == 8 { 1.0 } else { 0.0 });
        let search = MoveSearch::new(weights);
        let state = SearchState::new(
            Board::from_ascii(
                "
                ..########
                ",
            ),
            ScoreState::new(),
        );
        // O piece fills the two leftmost cells of the bottom row
        let reward =
            search.evaluate_placement(&state, PieceKind::O, Placement::new(Rotation::Initial, 0));
        assert_eq!(reward, 100.0);
    }

    #[test]
    fn test_takes_the_tetris() {
        let state = tetris_ready();
        let mut search = MoveSearch::new(HeuristicsWeights::default());
        let best = search.find_best_move(&state, &queue(PieceKind::I, PieceKind::O, PieceKind::T));
        assert!(!best.use_hold);
        assert_eq!(cleared_lines(&state, PieceKind::I, best.placement), 4);
    }

    #[test]
    fn test_holds_when_held_piece_is_strictly_better() {
        let state = tetris_ready();
        let mut search = MoveSearch::new(HeuristicsWeights::default());
        let queue = PieceQueue {
            current: PieceKind::O,
            next: PieceKind::T,
            after_next: PieceKind::S,
            held: Some(PieceKind::I),
        };
        let best = search.find_best_move(&state, &queue);
        assert!(best.use_hold);
        assert_eq!(cleared_lines(&state, PieceKind::I, best.placement), 4);
    }

    #[test]
    fn test_tie_between_streams_keeps_current_piece() {
        let state = SearchState::new(Board::EMPTY, ScoreState::new());
        let mut search = MoveSearch::new(HeuristicsWeights::ZERO);
        let best = search.find_best_move(
            &state,
            &queue(PieceKind::O, PieceKind::T, PieceKind::S),
        );
        assert!(!best.use_hold);
        assert_eq!(best.reward, 0.0);
    }

    #[test]
    fn test_identical_hold_stream_is_skipped() {
        let state = tetris_ready();
        let mut search = MoveSearch::new(HeuristicsWeights::default());
        let queue = PieceQueue {
            current: PieceKind::I,
            next: PieceKind::T,
            after_next: PieceKind::S,
            held: Some(PieceKind::I),
        };
        assert!(!search.find_best_move(&state, &queue).use_hold);
    }

    #[test]
    fn test_blocked_board_still_yields_a_move() {
        let mut art = String::new();
        for y in 0..Board::HEIGHT {
            art.push_str(if y % 2 == 0 { "#.#.#.#.#.\n" } else { ".#.#.#.#.#\n" });
        }
        let state = SearchState::new(Board::from_ascii(&art), ScoreState::new());
        let mut search = MoveSearch::new(HeuristicsWeights::default());
        let best = search.find_best_move(&state, &queue(PieceKind::T, PieceKind::L, PieceKind::Z));
        assert_eq!(best.reward, 2.0 * ILLEGAL_PLACEMENT_REWARD);
        assert!(!best.use_hold);
        assert_eq!(best.placement, PieceKind::T.placements()[0]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let state = SearchState::new(
            Board::from_ascii(
                "
                ....##....
                #..###.#..
                ##.#####.#
                ",
            ),
            ScoreState::new(),
        );
        let queue = queue(PieceKind::S, PieceKind::J, PieceKind::L);
        let weights =
            HeuristicsWeights::from_array([-0.5, -0.3, -0.1, -0.2, -0.4, -0.6, 0.1, 0.2, 0.05]);
        let first = MoveSearch::new(weights).find_best_move(&state, &queue);
        for _ in 0..3 {
            assert_eq!(MoveSearch::new(weights).find_best_move(&state, &queue), first);
        }
    }

    #[test]
    fn test_cache_is_transparent() {
        let weights = HeuristicsWeights::default();
        let mut cached = MoveSearch::new(weights);
        let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(17));
        let mut hits = 0;

        for _ in 0..40 {
            if game.is_over() {
                break;
            }
            let state = SearchState::from_game(&game);
            let queue = PieceQueue::from_game(&game).unwrap();
            if cached
                .cache
                .as_ref()
                .is_some_and(|c| c.state == state && c.kind == queue.current)
            {
                hits += 1;
            }

            let with_cache = cached.find_best_move(&state, &queue);
            let fresh = MoveSearch::new(weights).find_best_move(&state, &queue);
            assert_eq!(with_cache, fresh);

            if game.update(Some(with_cache.action())).is_err() {
                break;
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_game_over_has_no_move() {
        let mut game = Game::new(GameMode::Zen, PieceSeed::from_u64(2));
        let _ = game.update(Some(Action::new(false, Placement::new(Rotation::Initial, 20))));
        assert!(game.is_over());
        let mut search = MoveSearch::new(HeuristicsWeights::default());
        assert_eq!(search.find_best_move_for(&game), None);
    }
}
