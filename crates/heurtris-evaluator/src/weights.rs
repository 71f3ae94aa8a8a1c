//! Heuristic weight vector.
//!
//! [`HeuristicsWeights`] holds one weight per board heuristic plus one for the
//! score earned by the placement. The genetic trainer treats it as a plain
//! sequence of [`HeuristicsWeights::LEN`] slots, so the slot order is fixed:
//!
//! | Index | Slot | Weighted value |
//! |---|---|---|
//! | 0 | `hole_count` | [`BoardHeuristics::hole_count`](crate::BoardHeuristics::hole_count) |
//! | 1 | `aggr_height` | [`BoardHeuristics::aggregate_height`](crate::BoardHeuristics::aggregate_height) |
//! | 2 | `max_height` | [`BoardHeuristics::max_height`](crate::BoardHeuristics::max_height) |
//! | 3 | `bumpiness` | [`BoardHeuristics::bumpiness`](crate::BoardHeuristics::bumpiness) |
//! | 4 | `row_transition` | [`BoardHeuristics::row_transition`](crate::BoardHeuristics::row_transition) |
//! | 5 | `col_transition` | [`BoardHeuristics::col_transition`](crate::BoardHeuristics::col_transition) |
//! | 6 | `multi_well` | [`BoardHeuristics::additional_well_count`](crate::BoardHeuristics::additional_well_count) |
//! | 7 | `well_depth` | [`BoardHeuristics::well_depth`](crate::BoardHeuristics::well_depth) |
//! | 8 | `game_score` | Points earned by the lock being evaluated |
//!
//! The checkpoint file stores chromosomes in this order, so changing it breaks
//! existing checkpoints.

use std::ops::{Add, Index, IndexMut};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicsWeights {
    pub hole_count: f64,
    pub aggr_height: f64,
    pub max_height: f64,
    pub bumpiness: f64,
    pub row_transition: f64,
    pub col_transition: f64,
    pub multi_well: f64,
    pub well_depth: f64,
    pub game_score: f64,
}

/// Hand-tuned baseline: every structural feature is a penalty, deep wells and
/// score are rewarded.
impl Default for HeuristicsWeights {
    fn default() -> Self {
        Self {
            hole_count: -1.0,
            aggr_height: -1.0,
            max_height: -1.0,
            bumpiness: -1.0,
            row_transition: -1.0,
            col_transition: -1.0,
            multi_well: -1.0,
            well_depth: 1.0,
            game_score: 1.0,
        }
    }
}

impl HeuristicsWeights {
    pub const LEN: usize = 9;

    /// Slot names, in slot order.
    pub const NAMES: [&'static str; Self::LEN] = [
        "hole_count",
        "aggr_height",
        "max_height",
        "bumpiness",
        "row_transition",
        "col_transition",
        "multi_well",
        "well_depth",
        "game_score",
    ];

    pub const ZERO: Self = Self::from_array([0.0; Self::LEN]);

    #[must_use]
    pub const fn from_array(values: [f64; Self::LEN]) -> Self {
        let [
            hole_count,
            aggr_height,
            max_height,
            bumpiness,
            row_transition,
            col_transition,
            multi_well,
            well_depth,
            game_score,
        ] = values;
        Self {
            hole_count,
            aggr_height,
            max_height,
            bumpiness,
            row_transition,
            col_transition,
            multi_well,
            well_depth,
            game_score,
        }
    }

    #[must_use]
    pub const fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.hole_count,
            self.aggr_height,
            self.max_height,
            self.bumpiness,
            self.row_transition,
            self.col_transition,
            self.multi_well,
            self.well_depth,
            self.game_score,
        ]
    }

    /// Builds a weight vector by applying `f` to each slot index.
    ///
    /// # Examples
    ///
    /// ```
    /// use heurtris_evaluator::HeuristicsWeights;
    ///
    /// let weights = HeuristicsWeights::from_fn(|i| i as f64);
    /// assert_eq!(weights.bumpiness, 3.0);
    /// assert_eq!(weights[8], 8.0);
    /// ```
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        Self::from_array(std::array::from_fn(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> {
        self.to_array().into_iter()
    }

    /// Returns `true` if every slot is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.iter().all(f64::is_finite)
    }
}

impl From<[f64; HeuristicsWeights::LEN]> for HeuristicsWeights {
    fn from(values: [f64; HeuristicsWeights::LEN]) -> Self {
        Self::from_array(values)
    }
}

impl From<HeuristicsWeights> for [f64; HeuristicsWeights::LEN] {
    fn from(weights: HeuristicsWeights) -> Self {
        weights.to_array()
    }
}

impl Index<usize> for HeuristicsWeights {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.hole_count,
            1 => &self.aggr_height,
            2 => &self.max_height,
            3 => &self.bumpiness,
            4 => &self.row_transition,
            5 => &self.col_transition,
            6 => &self.multi_well,
            7 => &self.well_depth,
            8 => &self.game_score,
            _ => panic!("weight index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for HeuristicsWeights {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.hole_count,
            1 => &mut self.aggr_height,
            2 => &mut self.max_height,
            3 => &mut self.bumpiness,
            4 => &mut self.row_transition,
            5 => &mut self.col_transition,
            6 => &mut self.multi_well,
            7 => &mut self.well_depth,
            8 => &mut self.game_score,
            _ => panic!("weight index out of range: {index}"),
        }
    }
}

impl Add for HeuristicsWeights {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_fn(|i| self[i] + rhs[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_named_slots() {
        let weights = HeuristicsWeights::from_fn(|i| i as f64 + 1.0);
        assert_eq!(weights.hole_count, 1.0);
        assert_eq!(weights.multi_well, 7.0);
        assert_eq!(weights.well_depth, 8.0);
        assert_eq!(weights.game_score, 9.0);
        for (i, value) in weights.iter().enumerate() {
            assert_eq!(weights[i], value);
        }
    }

    #[test]
    fn test_index_mut() {
        let mut weights = HeuristicsWeights::ZERO;
        weights[3] = 0.5;
        assert_eq!(weights.bumpiness, 0.5);
    }

    #[test]
    #[should_panic(expected = "weight index out of range")]
    fn test_index_out_of_range() {
        let _ = HeuristicsWeights::ZERO[HeuristicsWeights::LEN];
    }

    #[test]
    fn test_array_conversion() {
        let values = [0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8, 0.9];
        let weights = HeuristicsWeights::from(values);
        assert_eq!(<[f64; 9]>::from(weights), values);
    }

    #[test]
    fn test_add() {
        let sum = HeuristicsWeights::default() + HeuristicsWeights::default();
        assert_eq!(sum.hole_count, -2.0);
        assert_eq!(sum.game_score, 2.0);
    }

    #[test]
    fn test_default_baseline() {
        let weights = HeuristicsWeights::default();
        assert_eq!(
            weights.to_array(),
            [-1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0]
        );
        assert!(weights.is_finite());
    }

    #[test]
    fn test_json_uses_slot_names() {
        let json = serde_json::to_value(HeuristicsWeights::default()).unwrap();
        for name in HeuristicsWeights::NAMES {
            assert!(json.get(name).is_some(), "missing {name}");
        }
        let back: HeuristicsWeights = serde_json::from_value(json).unwrap();
        assert_eq!(back, HeuristicsWeights::default());
    }
}
