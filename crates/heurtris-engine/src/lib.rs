//! Headless falling-block puzzle simulation.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - Board, pieces and the static placement table
//! - [`engine`] - 7-bag piece stream, hold, line-clear scoring and the [`Game`] loop
//!
//! Games are driven by [`Action`]s: a placement (rotation and column) plus an
//! optional hold. There is no gravity, no lock delay and no wall kicks; a piece
//! is rotated and translated at the top of the board and then hard-dropped.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when placing falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum UpdateError {
    #[display("game is already over")]
    GameOver,
    #[display("{_0}")]
    PieceCollision(PieceCollisionError),
}

impl From<PieceCollisionError> for UpdateError {
    fn from(err: PieceCollisionError) -> Self {
        Self::PieceCollision(err)
    }
}
