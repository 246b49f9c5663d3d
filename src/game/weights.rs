//! Failure-weighted word sampling
//!
//! Words a player keeps getting wrong come back more often:
//! `weight = max(1, 1 + wrong*3 + wrong_rate*5)` where `wrong_rate` is in 0..=1.

use crate::words::{FailureStat, FailureStats, WordEntry};
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;

/// Weight added per wrong answer
const WRONG_WEIGHT: f64 = 3.0;

/// Weight added for a 100% wrong rate
const RATE_WEIGHT: f64 = 5.0;

/// Minimum weight of any word
pub const MIN_WEIGHT: f64 = 1.0;

/// Sampling weight for a word given its failure history
pub fn failure_weight(stat: Option<&FailureStat>) -> f64 {
    let Some(stat) = stat else {
        return MIN_WEIGHT;
    };
    let wrong = stat.wrong as f64;
    let rate = if stat.attempts > 0 {
        wrong / stat.attempts as f64
    } else {
        0.0
    };
    (1.0 + wrong * WRONG_WEIGHT + rate * RATE_WEIGHT).max(MIN_WEIGHT)
}

/// Draws entries with replacement, proportionally to their failure weight.
pub struct WeightedPicker<'a> {
    entries: &'a [WordEntry],
    dist: Option<WeightedIndex<f64>>,
}

impl<'a> WeightedPicker<'a> {
    /// Build a picker over `entries`. Without stats every entry weighs the same.
    pub fn new(entries: &'a [WordEntry], stats: Option<&FailureStats>) -> Self {
        let weights: Vec<f64> = entries
            .iter()
            .map(|e| failure_weight(stats.and_then(|s| s.get(&e.id))))
            .collect();
        // Weights are all >= 1, so this only fails for an empty slice.
        let dist = WeightedIndex::new(&weights).ok();
        Self { entries, dist }
    }

    /// Pick one entry, or `None` when there is nothing to pick from
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a WordEntry> {
        let dist = self.dist.as_ref()?;
        self.entries.get(dist.sample(rng))
    }
}
