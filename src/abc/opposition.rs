//! Elite opposition-based learning (EOBL).
//!
//! For a food source `c` and the current elite `e` (the global best), the
//! opposition candidate is built per task `d` as
//!
//! ```text
//! o[d] = round((lb + ub) * k) - c[d]      lb = 0, ub = machines - 1
//! ```
//!
//! Values outside `[lb, ub]` are redrawn uniformly, and with probability
//! `jump_rate` the elite's value `e[d]` is taken instead. The candidate
//! replaces `c` only if it is strictly better.
//!
//! # References
//!
//! - Tizhoosh (2005), "Opposition-Based Learning: A New Scheme for Machine
//!   Intelligence"
//! - Zhou, Wu & Wang (2015), "Elite opposition-based particle swarm
//!   optimization"

use super::colony::Colony;
use super::types::Solution;
use crate::fitness::FitnessEvaluator;
use crate::random::AbcRng;
use log::trace;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parameters of one opposition pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OppositionParams {
    /// Probability that a source receives a candidate.
    pub prob: f64,
    pub coefficient: f64,
    pub jump_rate: f64,
}

/// Builds the elite opposition candidate of `current`.
pub fn opposition_candidate<R: Rng>(
    current: &[usize],
    elite: &[usize],
    machines: usize,
    coefficient: f64,
    jump_rate: f64,
    rng: &mut R,
) -> Vec<usize> {
    let ub = machines as i64 - 1;
    let pivot = (ub as f64 * coefficient).round() as i64;

    current
        .iter()
        .zip(elite)
        .map(|(&c, &e)| {
            let o = pivot - c as i64;
            let o = if (0..=ub).contains(&o) {
                o as usize
            } else {
                rng.random_range(0..machines)
            };
            if rng.random_bool(jump_rate) {
                e
            } else {
                o
            }
        })
        .collect()
}

/// Applies one opposition pass to the employed food sources.
///
/// The source identical to the elite is skipped. Source `i` draws from
/// `rngs[i]`. Returns the number of sources replaced.
pub(crate) fn opposition_pass(
    colony: &mut Colony,
    evaluator: &FitnessEvaluator,
    params: OppositionParams,
    rngs: &mut [AbcRng],
    parallel: bool,
) -> usize {
    if params.prob <= 0.0 {
        return 0;
    }
    let Some(elite) = colony.global_best().map(|best| best.assignment().to_vec()) else {
        return 0;
    };

    let accepted = learn_all(evaluator, colony.employed_mut(), &elite, params, rngs, parallel);

    let mut improvements = 0;
    for (i, &ok) in accepted.iter().enumerate() {
        if ok {
            colony.consider(i);
            improvements += 1;
        }
    }
    improvements
}

fn learn_all(
    evaluator: &FitnessEvaluator,
    employed: &mut [Solution],
    elite: &[usize],
    params: OppositionParams,
    rngs: &mut [AbcRng],
    parallel: bool,
) -> Vec<bool> {
    #[cfg(feature = "parallel")]
    if parallel {
        return employed
            .par_iter_mut()
            .zip(rngs.par_iter_mut())
            .enumerate()
            .map(|(i, (s, rng))| learn(evaluator, i, s, elite, params, rng))
            .collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    employed
        .iter_mut()
        .zip(rngs.iter_mut())
        .enumerate()
        .map(|(i, (s, rng))| learn(evaluator, i, s, elite, params, rng))
        .collect()
}

fn learn(
    evaluator: &FitnessEvaluator,
    index: usize,
    solution: &mut Solution,
    elite: &[usize],
    params: OppositionParams,
    rng: &mut AbcRng,
) -> bool {
    if solution.assignment() == elite || !rng.random_bool(params.prob) {
        return false;
    }

    let candidate = opposition_candidate(
        solution.assignment(),
        elite,
        evaluator.machine_count(),
        params.coefficient,
        params.jump_rate,
        rng,
    );
    let fitness = evaluator.evaluate(&candidate);
    if fitness < solution.fitness() {
        trace!(
            "opposition replaced source {index}: {:.4} -> {fitness:.4}",
            solution.fitness()
        );
        solution.accept(candidate, fitness);
        true
    } else {
        false
    }
}
