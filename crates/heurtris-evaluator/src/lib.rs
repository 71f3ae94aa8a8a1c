//! Heuristic evaluation and move search for the falling-block puzzle.
//!
//! The crate turns a weight vector into a player:
//!
//! 1. **Heuristics** ([`board_heuristics`]) - Eight integer measurements of a board
//!    (holes, heights, bumpiness, transitions, wells).
//! 2. **Scoring** ([`scorer`]) - A linear combination of the heuristics and the points
//!    earned by a lock, weighted by [`HeuristicsWeights`].
//! 3. **Move search** ([`move_search`]) - Two-piece lookahead over every placement, with
//!    an optional hold, picking the pair with the highest combined reward.
//! 4. **Agent** ([`HeuristicAgent`]) - Applies the searched move to a [`Game`] until it is
//!    over or a line cap is reached.
//!
//! # Architecture
//!
//! ```text
//! HeuristicAgent (plays a game)
//!     ↓ uses
//! MoveSearch (select best placement pair)
//!     ↓ uses
//! scorer + BoardHeuristics (reward of a single placement)
//! ```
//!
//! Weights are learned by the genetic trainer in `heurtris-training`; the search itself
//! has no randomness.
//!
//! # Example
//!
//! ```rust
//! use heurtris_engine::{Game, GameMode, PieceSeed};
//! use heurtris_evaluator::{HeuristicsWeights, MoveSearch};
//!
//! let game = Game::new(GameMode::SPRINT, PieceSeed::from_u64(42));
//! let mut search = MoveSearch::new(HeuristicsWeights::default());
//!
//! let best = search.find_best_move_for(&game).unwrap();
//! println!("hold: {}, placement: {:?}", best.use_hold, best.placement);
//! ```
//!
//! [`Game`]: heurtris_engine::Game

pub use self::{
    agent::HeuristicAgent,
    board_heuristics::BoardHeuristics,
    move_search::{BestMove, ILLEGAL_PLACEMENT_REWARD, MoveSearch, PieceQueue, SearchState},
    weights::HeuristicsWeights,
};

mod agent;
pub mod board_heuristics;
pub mod move_search;
pub mod scorer;
pub mod weights;
