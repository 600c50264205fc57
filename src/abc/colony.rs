//! Colony: the fixed-size, role-partitioned population.

use super::config::ColonyLayout;
use super::types::{Role, Solution};
use crate::fitness::FitnessEvaluator;
use crate::random::AbcRng;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Population of food sources plus the best solution seen so far.
///
/// The global best is a deep copy, so later mutations of the slot it came
/// from never affect it, and it only ever improves.
#[derive(Debug, Clone)]
pub struct Colony {
    solutions: Vec<Solution>,
    layout: ColonyLayout,
    global_best: Option<Solution>,
}

impl Colony {
    /// Builds a colony of uniformly random assignments and evaluates it.
    ///
    /// Slot `i` draws its assignment from `rngs[i]`.
    pub(crate) fn initialize(
        evaluator: &FitnessEvaluator,
        layout: ColonyLayout,
        rngs: &mut [AbcRng],
        parallel: bool,
    ) -> Self {
        let tasks = evaluator.task_count();
        let machines = evaluator.machine_count();

        let solutions = rngs
            .iter_mut()
            .take(layout.total())
            .enumerate()
            .map(|(i, rng)| {
                let assignment = random_assignment(rng, tasks, machines);
                Solution::new(assignment, f64::INFINITY, role_at(&layout, i))
            })
            .collect();

        let mut colony = Self {
            solutions,
            layout,
            global_best: None,
        };
        colony.evaluate_all(evaluator, parallel);
        colony
    }

    /// Re-scores every slot and updates the global best.
    pub(crate) fn evaluate_all(&mut self, evaluator: &FitnessEvaluator, parallel: bool) {
        score_all(evaluator, &mut self.solutions, parallel);
        self.refresh_global_best();
    }

    pub fn layout(&self) -> ColonyLayout {
        self.layout
    }

    /// All slots in positional order.
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// The employed food sources, `[0, layout.employed)`.
    pub fn employed(&self) -> &[Solution] {
        &self.solutions[..self.layout.employed]
    }

    pub(crate) fn employed_mut(&mut self) -> &mut [Solution] {
        &mut self.solutions[..self.layout.employed]
    }

    pub(crate) fn solution_mut(&mut self, index: usize) -> &mut Solution {
        &mut self.solutions[index]
    }

    /// Best solution found so far.
    pub fn global_best(&self) -> Option<&Solution> {
        self.global_best.as_ref()
    }

    /// Fitness of the global best, or infinity before the first evaluation.
    pub fn best_fitness(&self) -> f64 {
        self.global_best
            .as_ref()
            .map_or(f64::INFINITY, Solution::fitness)
    }

    /// Offers slot `index` as a new global best. Returns whether it was taken.
    pub(crate) fn consider(&mut self, index: usize) -> bool {
        let candidate = &self.solutions[index];
        let improves = self
            .global_best
            .as_ref()
            .is_none_or(|best| candidate.fitness() < best.fitness());
        if improves {
            self.global_best = Some(candidate.clone());
        }
        improves
    }

    /// Offers every slot, in order, as a new global best.
    pub(crate) fn refresh_global_best(&mut self) {
        for i in 0..self.solutions.len() {
            self.consider(i);
        }
    }

    /// Consumes the colony, returning the global best.
    pub(crate) fn into_best(mut self) -> Solution {
        match self.global_best {
            Some(best) => best,
            None => self.solutions.swap_remove(0),
        }
    }
}

/// Role of slot `index` under the positional partition.
pub fn role_at(layout: &ColonyLayout, index: usize) -> Role {
    if index < layout.employed {
        Role::Employed
    } else if index < layout.employed + layout.onlooker {
        Role::Onlooker
    } else {
        Role::Scout
    }
}

/// Draws every task's machine independently and uniformly.
pub(crate) fn random_assignment<R: Rng>(rng: &mut R, tasks: usize, machines: usize) -> Vec<usize> {
    (0..tasks).map(|_| rng.random_range(0..machines)).collect()
}

fn score_all(evaluator: &FitnessEvaluator, solutions: &mut [Solution], parallel: bool) {
    #[cfg(feature = "parallel")]
    if parallel {
        solutions.par_iter_mut().for_each(|s| {
            let f = evaluator.evaluate(s.assignment());
            s.set_fitness(f);
        });
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for s in solutions.iter_mut() {
        let f = evaluator.evaluate(s.assignment());
        s.set_fitness(f);
    }
}
