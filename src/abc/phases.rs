//! Employed, onlooker and scout phases.
//!
//! Every neighbor move changes one task's machine:
//!
//! ```text
//! v = x_i[d] + phi * (x_i[d] - x_j[d]),  phi ∈ {-1, 0, 1}
//! ```
//!
//! clamped into `[0, machines)`. A move is kept only if it strictly improves
//! the fitness of the food source it was applied to; otherwise that source's
//! abandonment counter grows.

use super::colony::{random_assignment, Colony};
use super::config::ScoutPolicy;
use super::selection::SelectionModel;
use super::types::Solution;
use crate::fitness::FitnessEvaluator;
use crate::random::AbcRng;
use log::trace;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A single-dimension move: put task `dimension` on `machine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Proposal {
    pub dimension: usize,
    pub machine: usize,
}

/// Integer neighbor coordinate, clamped into `[0, machines)`.
pub fn neighbor_value(current: usize, partner: usize, phi: i64, machines: usize) -> usize {
    let current = current as i64;
    let v = current + phi * (current - partner as i64);
    v.clamp(0, machines as i64 - 1) as usize
}

/// Draws a move for employed source `source`.
///
/// Draw order is dimension, partner, then `phi`. The partner is another
/// employed source; with a single employed source a uniform machine index
/// stands in for the partner's coordinate.
pub(crate) fn propose<R: Rng>(
    rng: &mut R,
    employed: &[Solution],
    source: usize,
    machines: usize,
) -> Proposal {
    let current = employed[source].assignment();
    let dimension = rng.random_range(0..current.len());

    let partner_value = if employed.len() > 1 {
        let mut j = rng.random_range(0..employed.len() - 1);
        if j >= source {
            j += 1;
        }
        employed[j].assignment()[dimension]
    } else {
        rng.random_range(0..machines)
    };

    let phi = rng.random_range(-1i64..=1);
    Proposal {
        dimension,
        machine: neighbor_value(current[dimension], partner_value, phi, machines),
    }
}

/// Evaluates `proposal` on `solution` and applies greedy selection.
fn apply_move(evaluator: &FitnessEvaluator, solution: &mut Solution, proposal: Proposal) -> bool {
    let Proposal { dimension, machine } = proposal;
    let previous = solution.assignment()[dimension];
    if previous == machine {
        let unchanged = solution.fitness();
        return solution.try_move(dimension, machine, unchanged);
    }

    solution.assignment_mut()[dimension] = machine;
    let fitness = evaluator.evaluate(solution.assignment());
    solution.assignment_mut()[dimension] = previous;

    solution.try_move(dimension, machine, fitness)
}

/// Runs the employed bee phase. Returns the number of accepted moves.
///
/// All moves are drawn against the state at phase start, then evaluated.
/// Employed source `i` draws from `rngs[i]`.
pub(crate) fn employed_phase(
    colony: &mut Colony,
    evaluator: &FitnessEvaluator,
    rngs: &mut [AbcRng],
    parallel: bool,
) -> usize {
    let machines = evaluator.machine_count();
    let employed = colony.employed();
    let proposals: Vec<Proposal> = rngs
        .iter_mut()
        .take(employed.len())
        .enumerate()
        .map(|(i, rng)| propose(rng, employed, i, machines))
        .collect();

    let accepted = apply_moves(evaluator, colony.employed_mut(), &proposals, parallel);

    let mut improvements = 0;
    for (i, &ok) in accepted.iter().enumerate() {
        if ok {
            colony.consider(i);
            improvements += 1;
        }
    }
    improvements
}

fn apply_moves(
    evaluator: &FitnessEvaluator,
    employed: &mut [Solution],
    proposals: &[Proposal],
    parallel: bool,
) -> Vec<bool> {
    #[cfg(feature = "parallel")]
    if parallel {
        return employed
            .par_iter_mut()
            .zip(proposals.par_iter())
            .map(|(s, &p)| apply_move(evaluator, s, p))
            .collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    employed
        .iter_mut()
        .zip(proposals)
        .map(|(s, &p)| apply_move(evaluator, s, p))
        .collect()
}

/// Runs the onlooker bee phase. Returns the number of accepted moves.
///
/// Each visit selects an employed source with `model`, perturbs its current
/// assignment and records the trial in the visiting onlooker's slot. The
/// selected employed source is the one that keeps or rejects the move.
pub(crate) fn onlooker_phase(
    colony: &mut Colony,
    evaluator: &FitnessEvaluator,
    model: &SelectionModel,
    rng: &mut AbcRng,
) -> usize {
    let layout = colony.layout();
    let machines = evaluator.machine_count();
    let mut trial = Vec::with_capacity(evaluator.task_count());
    let mut improvements = 0;

    for k in 0..layout.onlooker {
        let source = model.select(rng);
        let proposal = propose(rng, colony.employed(), source, machines);

        trial.clear();
        trial.extend_from_slice(colony.employed()[source].assignment());
        trial[proposal.dimension] = proposal.machine;
        let fitness = evaluator.evaluate(&trial);

        colony
            .solution_mut(layout.employed + k)
            .record(&trial, fitness);

        if colony
            .solution_mut(source)
            .try_move(proposal.dimension, proposal.machine, fitness)
        {
            colony.consider(source);
            improvements += 1;
        }
    }
    improvements
}

/// Runs the scout bee phase. Returns the number of replaced sources.
///
/// A replaced employed source `i` draws its new assignment from `rngs[i]`.
pub(crate) fn scout_phase(
    colony: &mut Colony,
    evaluator: &FitnessEvaluator,
    policy: ScoutPolicy,
    limit: usize,
    rngs: &mut [AbcRng],
) -> usize {
    let targets: Vec<usize> = match policy {
        ScoutPolicy::AllExceeding => colony
            .employed()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.abandonment_count() > limit)
            .map(|(i, _)| i)
            .collect(),
        ScoutPolicy::MostAbandoned => most_abandoned(colony.employed())
            .filter(|&i| colony.employed()[i].abandonment_count() > limit)
            .into_iter()
            .collect(),
    };

    let tasks = evaluator.task_count();
    let machines = evaluator.machine_count();
    for &i in &targets {
        let assignment = random_assignment(&mut rngs[i], tasks, machines);
        let fitness = evaluator.evaluate(&assignment);
        trace!(
            "scout replaced source {i} (abandoned {} times), new fitness {fitness:.4}",
            colony.employed()[i].abandonment_count()
        );
        colony.solution_mut(i).accept(assignment, fitness);
        colony.consider(i);
    }
    targets.len()
}

/// Index of the highest abandonment count, lowest index on ties.
fn most_abandoned(employed: &[Solution]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, s) in employed.iter().enumerate() {
        if best.is_none_or(|(_, count)| s.abandonment_count() > count) {
            best = Some((i, s.abandonment_count()));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abc::config::ColonyLayout;
    use crate::fitness::FitnessMode;
    use crate::model::{Machine, Task};
    use crate::random::{create_rng, RngStreams};

    fn evaluator() -> FitnessEvaluator {
        let tasks: Vec<Task> = (0..8).map(|i| Task::new(i, 5 + 3 * i as u64)).collect();
        let machines: Vec<Machine> = (0..4)
            .map(|i| Machine::new(i, 1.0 + 0.5 * i as f64))
            .collect();
        FitnessEvaluator::new(&tasks, &machines, FitnessMode::Makespan).unwrap()
    }

    fn setup(layout: ColonyLayout, seed: u64) -> (FitnessEvaluator, Colony, RngStreams) {
        let eval = evaluator();
        let mut streams = RngStreams::new(seed, layout.total());
        let colony = Colony::initialize(&eval, layout, &mut streams.search, false);
        (eval, colony, streams)
    }

    fn assert_consistent(colony: &Colony, eval: &FitnessEvaluator) {
        for s in colony.solutions() {
            assert!(s.assignment().iter().all(|&m| m < eval.machine_count()));
            assert_eq!(s.fitness(), eval.evaluate(s.assignment()));
        }
    }

    #[test]
    fn test_neighbor_value_clamps() {
        assert_eq!(neighbor_value(2, 0, 1, 3), 2);
        assert_eq!(neighbor_value(0, 2, 1, 3), 0);
        assert_eq!(neighbor_value(1, 2, 0, 3), 1);
        assert_eq!(neighbor_value(1, 2, -1, 3), 2);
        assert_eq!(neighbor_value(3, 1, -1, 5), 1);
        assert_eq!(neighbor_value(0, 0, 1, 1), 0);
    }

    #[test]
    fn test_propose_in_range() {
        let (eval, colony, _) = setup(ColonyLayout::new(5, 4, 1), 1);
        let mut rng = create_rng(9);
        for _ in 0..1000 {
            let source = rng.random_range(0..5);
            let p = propose(&mut rng, colony.employed(), source, eval.machine_count());
            assert!(p.dimension < eval.task_count());
            assert!(p.machine < eval.machine_count());
        }
    }

    #[test]
    fn test_employed_phase_is_greedy() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(6, 5, 1), 2);
        for _ in 0..20 {
            let before: Vec<Solution> = colony.employed().to_vec();
            employed_phase(&mut colony, &eval, &mut streams.search, false);
            for (old, new) in before.iter().zip(colony.employed()) {
                if new.fitness() < old.fitness() {
                    assert_eq!(new.abandonment_count(), 0);
                } else {
                    assert_eq!(new.assignment(), old.assignment());
                    assert_eq!(new.fitness(), old.fitness());
                    assert_eq!(new.abandonment_count(), old.abandonment_count() + 1);
                }
            }
            assert_consistent(&colony, &eval);
        }
    }

    #[test]
    fn test_employed_phase_changes_at_most_one_task() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(6, 5, 1), 4);
        let before: Vec<Solution> = colony.employed().to_vec();
        employed_phase(&mut colony, &eval, &mut streams.search, false);
        for (old, new) in before.iter().zip(colony.employed()) {
            let changed = old
                .assignment()
                .iter()
                .zip(new.assignment())
                .filter(|(a, b)| a != b)
                .count();
            assert!(changed <= 1);
        }
    }

    #[test]
    fn test_employed_phase_single_source() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(1, 1, 1), 5);
        for _ in 0..50 {
            employed_phase(&mut colony, &eval, &mut streams.search, false);
        }
        assert_consistent(&colony, &eval);
    }

    #[test]
    fn test_global_best_tracks_improvements() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(6, 5, 1), 6);
        for _ in 0..30 {
            let best_before = colony.best_fitness();
            employed_phase(&mut colony, &eval, &mut streams.search, false);
            let employed_min = colony
                .employed()
                .iter()
                .map(Solution::fitness)
                .fold(f64::INFINITY, f64::min);
            assert!(colony.best_fitness() <= best_before);
            assert!(colony.best_fitness() <= employed_min);
        }
    }

    #[test]
    fn test_onlooker_phase_records_trials() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(4, 6, 1), 7);
        let model = SelectionModel::from_solutions(colony.employed());
        let best_before = colony.best_fitness();
        onlooker_phase(&mut colony, &eval, &model, &mut streams.onlooker);
        assert_consistent(&colony, &eval);
        assert!(colony.best_fitness() <= best_before);
    }

    #[test]
    fn test_onlooker_phase_counts_rejections_on_sources() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(1, 10, 1), 8);
        let model = SelectionModel::from_solutions(colony.employed());
        let improvements = onlooker_phase(&mut colony, &eval, &model, &mut streams.onlooker);
        let source = &colony.employed()[0];
        assert!(source.abandonment_count() <= 10 - improvements);
        assert!(improvements <= 10);
    }

    #[test]
    fn test_scout_limit_zero_resets_all() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(6, 5, 1), 10);
        employed_phase(&mut colony, &eval, &mut streams.search, false);
        employed_phase(&mut colony, &eval, &mut streams.search, false);

        scout_phase(
            &mut colony,
            &eval,
            ScoutPolicy::AllExceeding,
            0,
            &mut streams.search,
        );
        assert!(colony.employed().iter().all(|s| s.abandonment_count() == 0));
        assert_consistent(&colony, &eval);
    }

    #[test]
    fn test_scout_respects_limit() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(3, 2, 1), 11);
        for _ in 0..3 {
            colony.solution_mut(0).try_move(0, 0, f64::INFINITY);
        }
        colony.solution_mut(1).try_move(0, 0, f64::INFINITY);
        let kept = colony.employed()[1].clone();

        let replaced = scout_phase(
            &mut colony,
            &eval,
            ScoutPolicy::AllExceeding,
            2,
            &mut streams.search,
        );
        assert_eq!(replaced, 1);
        assert_eq!(colony.employed()[0].abandonment_count(), 0);
        assert_eq!(colony.employed()[1], kept);
    }

    #[test]
    fn test_most_abandoned_replaces_one() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(4, 3, 1), 12);
        for i in 0..4 {
            for _ in 0..5 {
                colony.solution_mut(i).try_move(0, 0, f64::INFINITY);
            }
        }
        colony.solution_mut(2).try_move(0, 0, f64::INFINITY);

        let replaced = scout_phase(
            &mut colony,
            &eval,
            ScoutPolicy::MostAbandoned,
            0,
            &mut streams.search,
        );
        assert_eq!(replaced, 1);
        let counts: Vec<usize> = colony
            .employed()
            .iter()
            .map(Solution::abandonment_count)
            .collect();
        assert_eq!(counts, vec![5, 5, 0, 5]);
    }

    #[test]
    fn test_most_abandoned_ties_pick_lowest_index() {
        let (_, mut colony, _) = setup(ColonyLayout::new(3, 2, 1), 13);
        for i in [1, 2] {
            colony.solution_mut(i).try_move(0, 0, f64::INFINITY);
        }
        assert_eq!(most_abandoned(colony.employed()), Some(1));
    }

    #[test]
    fn test_most_abandoned_below_limit_does_nothing() {
        let (eval, mut colony, mut streams) = setup(ColonyLayout::new(3, 2, 1), 14);
        colony.solution_mut(0).try_move(0, 0, f64::INFINITY);
        let replaced = scout_phase(
            &mut colony,
            &eval,
            ScoutPolicy::MostAbandoned,
            1,
            &mut streams.search,
        );
        assert_eq!(replaced, 0);
        assert_eq!(colony.employed()[0].abandonment_count(), 1);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_employed_phase_matches_sequential() {
        let layout = ColonyLayout::new(8, 7, 1);
        let (eval, mut seq, mut seq_streams) = setup(layout, 21);
        let (_, mut par, mut par_streams) = setup(layout, 21);
        for _ in 0..10 {
            employed_phase(&mut seq, &eval, &mut seq_streams.search, false);
            employed_phase(&mut par, &eval, &mut par_streams.search, true);
        }
        assert_eq!(seq.solutions(), par.solutions());
        assert_eq!(seq.best_fitness(), par.best_fitness());
    }
}
