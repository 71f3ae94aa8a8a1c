use std::path::Path;

use chrono::{DateTime, Utc};
use heurtris_evaluator::HeuristicsWeights;
use serde::{Deserialize, Serialize};

use crate::util;

/// Trained weights as saved by `heurtris train`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeuristicModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the weights were evaluated in.
    pub generation: u32,
    pub fitness: f64,
    pub weights: HeuristicsWeights,
}

impl HeuristicModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let model: Self = util::read_json_file("model", path)?;
        anyhow::ensure!(
            model.weights.is_finite(),
            "Model {} has non-finite weights",
            model.name
        );
        Ok(model)
    }
}
