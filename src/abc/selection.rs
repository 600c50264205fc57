//! Roulette-wheel selection of employed food sources.
//!
//! Onlookers pick food sources with probability proportional to their
//! quality. Since fitness is minimized, raw fitness is first mapped through
//! the classical ABC transform
//!
//! ```text
//! w(f) = 1 / (1 + f)   if f >= 0
//! w(f) = 1 + |f|       if f < 0
//! ```
//!
//! which is strictly decreasing in `f`, so better sources always weigh more.
//! Sources with an infinite (invalid) fitness weigh nothing.
//!
//! # References
//!
//! - Karaboga (2005), "An Idea Based on Honey Bee Swarm for Numerical
//!   Optimization", Technical Report TR06, Erciyes University
//! - Karaboga & Basturk (2007), "A powerful and efficient algorithm for
//!   numerical function optimization: artificial bee colony (ABC) algorithm"

use super::types::Solution;
use rand::Rng;

/// Maps a fitness (lower is better) to a selection weight (higher is better).
pub fn selection_weight(fitness: f64) -> f64 {
    if fitness.is_nan() || fitness == f64::INFINITY {
        0.0
    } else if fitness >= 0.0 {
        1.0 / (1.0 + fitness)
    } else if fitness.is_finite() {
        1.0 + fitness.abs()
    } else {
        // -inf: unreachable from the evaluator, treat as unusable
        0.0
    }
}

/// Selection probabilities over the employed food sources of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionModel {
    probabilities: Vec<f64>,
    uniform: bool,
}

impl SelectionModel {
    /// Builds the model from the fitness of each employed source.
    ///
    /// Falls back to uniform probabilities when the weights are all equal,
    /// sum to zero, or do not sum to a finite value.
    pub fn from_fitness(fitness: &[f64]) -> Self {
        let n = fitness.len();
        let weights: Vec<f64> = fitness.iter().map(|&f| selection_weight(f)).collect();
        let total: f64 = weights.iter().sum();
        let all_equal = weights.windows(2).all(|w| w[0] == w[1]);

        if n == 0 || all_equal || !(total.is_finite() && total > 0.0) {
            return Self::uniform(n);
        }

        Self {
            probabilities: weights.iter().map(|w| w / total).collect(),
            uniform: false,
        }
    }

    /// Builds the model from the employed slots of a colony.
    pub fn from_solutions(employed: &[Solution]) -> Self {
        let fitness: Vec<f64> = employed.iter().map(Solution::fitness).collect();
        Self::from_fitness(&fitness)
    }

    fn uniform(n: usize) -> Self {
        let p = if n > 0 { 1.0 / n as f64 } else { 0.0 };
        Self {
            probabilities: vec![p; n],
            uniform: true,
        }
    }

    /// Probability of each employed source, summing to 1.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Whether the degenerate-weight fallback is in effect.
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Number of selectable sources.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Picks a food source index.
    ///
    /// Draws `r ~ U[0, 1)` and returns the first source with non-zero
    /// probability whose cumulative probability reaches `r`. If rounding
    /// leaves `r` above every cumulative sum, a source is picked uniformly.
    ///
    /// # Panics
    /// Panics if the model is empty.
    pub fn select<R: Rng>(&self, rng: &mut R) -> usize {
        assert!(!self.is_empty(), "cannot select from empty model");

        let n = self.probabilities.len();
        if self.uniform {
            return rng.random_range(0..n);
        }

        let r: f64 = rng.random();
        let mut cumulative = 0.0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            cumulative += p;
            if p > 0.0 && r <= cumulative {
                return i;
            }
        }

        rng.random_range(0..n) // floating-point fallback
    }
}
