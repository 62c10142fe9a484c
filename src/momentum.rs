use serde::{Deserialize, Serialize};

use crate::indicator::change::PriceChangeSet;
use crate::indicator::round2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumWeight {
    pub horizon: usize,
    pub weight: f64,
}

/// Weighted blend of price-change horizons into one score.
#[derive(Debug, Clone)]
pub struct MomentumScorer {
    weights: Vec<MomentumWeight>,
}

impl MomentumScorer {
    pub fn new(weights: Vec<MomentumWeight>) -> Self {
        Self { weights }
    }

    /// Weighted average over the horizons that have a value; weights of missing
    /// horizons drop out of the denominator. No horizon at all scores 0.
    pub fn score(&self, changes: &PriceChangeSet) -> f64 {
        let (weighted, total_weight) = self
            .weights
            .iter()
            .filter_map(|w| changes.get(w.horizon).map(|c| (c * w.weight, w.weight)))
            .fold((0.0, 0.0), |(sum, total), (value, weight)| (sum + value, total + weight));

        if total_weight > 0.0 {
            round2(weighted / total_weight)
        } else {
            0.0
        }
    }
}
