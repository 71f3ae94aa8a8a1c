//! Game rules on top of the core data structures.
//!
//! - [`Game`] - Headless game driven by placement [`Action`]s
//! - [`GameMode`] - Line target, time limit or endless play
//! - [`GameStats`] - Cumulative score, lines and clear counters
//! - [`ScoreState`] - Combo and back-to-back state used to score each lock
//! - [`PieceBuffer`] - 7-bag piece generation with a hold slot
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] with a mode and a seed
//! 2. Pick an [`Action`] for the current piece (optionally holding first)
//! 3. [`Game::update`] hard-drops and locks the piece, clears rows and scores the lock
//! 4. Repeat until [`Game::is_over`]
//!
//! Speculative search does not need a [`Game`]: it copies the [`Board`](crate::Board)
//! and the [`ScoreState`] and applies the same lock, clear and score steps to the copies.

pub use self::{game::*, game_mode::*, game_stats::*, piece_buffer::*, scoring::*};

mod game;
mod game_mode;
mod game_stats;
mod piece_buffer;
mod scoring;
