//! Linear placement scoring.
//!
//! ```text
//! reward = Σ wᵢ · hᵢ + w_game_score · Δscore
//! ```
//!
//! `Δscore` is the number of points earned by the lock being evaluated, not the
//! running total, so the search maximizes the marginal reward of each placement.

use crate::{BoardHeuristics, HeuristicsWeights};

/// Combines `heuristics` and the points earned by the lock into a reward.
///
/// # Example
///
/// ```
/// use heurtris_evaluator::{BoardHeuristics, HeuristicsWeights, scorer};
///
/// let weights = HeuristicsWeights::default();
/// // an empty board has no well: the multi-well slot sees -1
/// let reward = scorer::score(&BoardHeuristics::EMPTY, &weights, 100.0);
/// assert_eq!(reward, 1.0 + 100.0);
/// ```
#[must_use]
pub fn score(heuristics: &BoardHeuristics, weights: &HeuristicsWeights, score_delta: f64) -> f64 {
    weights.hole_count * f64::from(heuristics.hole_count)
        + weights.aggr_height * f64::from(heuristics.aggregate_height)
        + weights.max_height * f64::from(heuristics.max_height)
        + weights.bumpiness * f64::from(heuristics.bumpiness)
        + weights.row_transition * f64::from(heuristics.row_transition)
        + weights.col_transition * f64::from(heuristics.col_transition)
        + weights.multi_well * f64::from(heuristics.additional_well_count)
        + weights.well_depth * f64::from(heuristics.well_depth)
        + weights.game_score * score_delta
}
