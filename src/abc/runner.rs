//! ABC execution loop.

use super::colony::Colony;
use super::config::AbcConfig;
use super::opposition::{opposition_pass, OppositionParams};
use super::phases::{employed_phase, onlooker_phase, scout_phase};
use super::selection::SelectionModel;
use crate::error::Result;
use crate::fitness::{Evaluation, FitnessEvaluator};
use crate::model::{Machine, Task};
use crate::random::RngStreams;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseStats {
    /// Moves accepted in the employed phase.
    pub employed_improvements: usize,
    /// Moves accepted in the onlooker phase.
    pub onlooker_improvements: usize,
    /// Food sources replaced by scouts.
    pub scout_replacements: usize,
    /// Food sources replaced by their opposition candidate.
    pub eobl_improvements: usize,
}

/// Result of an ABC run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AbcResult {
    /// Best assignment found: machine index per task.
    pub assignment: Vec<usize>,

    /// Fitness of the best assignment.
    pub fitness: f64,

    /// Makespan, cost and fitness of the best assignment.
    pub evaluation: Evaluation,

    /// Number of iterations executed.
    pub iterations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the time limit stopped the run.
    pub timed_out: bool,

    /// Whether the run stopped because the best fitness stagnated.
    pub stagnated: bool,

    /// Best fitness after initialization, then after each iteration.
    pub fitness_history: Vec<f64>,

    pub stats: PhaseStats,

    /// Master seed the run used.
    pub seed: u64,
}

/// Executes the Artificial Bee Colony search.
///
/// # Examples
///
/// ```
/// use u_beecolony::abc::{AbcConfig, AbcRunner};
/// use u_beecolony::{Machine, Task};
///
/// let tasks = vec![Task::new(0, 10), Task::new(1, 10)];
/// let machines = vec![Machine::new(0, 1.0), Machine::new(1, 1.0)];
/// let config = AbcConfig::default().with_max_iterations(20).with_seed(42);
///
/// let result = AbcRunner::run(&tasks, &machines, &config).unwrap();
/// assert_eq!(result.evaluation.makespan, 10.0);
/// ```
pub struct AbcRunner;

impl AbcRunner {
    /// Runs the search.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`](crate::ConfigurationError) if the
    /// configuration or the instance is invalid. Nothing is searched then.
    pub fn run(tasks: &[Task], machines: &[Machine], config: &AbcConfig) -> Result<AbcResult> {
        Self::run_with_cancel(tasks, machines, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// The token is checked between iterations; the best solution found so
    /// far is returned.
    pub fn run_with_cancel(
        tasks: &[Task],
        machines: &[Machine],
        config: &AbcConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AbcResult> {
        Self::run_observed(tasks, machines, config, cancel, |_, _| {})
    }

    /// Runs the search, calling `observer(iteration, &colony)` after every
    /// completed iteration.
    pub fn run_observed<F>(
        tasks: &[Task],
        machines: &[Machine],
        config: &AbcConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<AbcResult>
    where
        F: FnMut(usize, &Colony),
    {
        config.validate()?;
        let layout = config.layout()?;
        let evaluator = FitnessEvaluator::new(tasks, machines, config.fitness_mode)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut streams = RngStreams::new(seed, layout.total());
        let deadline = config.time_limit_ms.map(Duration::from_millis);
        let start = Instant::now();

        info!(
            "abc start: {} tasks, {} machines, layout {}/{}/{}, limit {}, max {} iterations, eobl {}, seed {}",
            evaluator.task_count(),
            evaluator.machine_count(),
            layout.employed,
            layout.onlooker,
            layout.scout,
            config.abandonment_limit,
            config.max_iterations,
            config.use_eobl,
            seed
        );

        let opposition = (config.use_eobl && config.prob_eobl > 0.0).then_some(OppositionParams {
            prob: config.prob_eobl,
            coefficient: config.obl_coefficient,
            jump_rate: config.obl_jump_rate,
        });

        let mut colony =
            Colony::initialize(&evaluator, layout, &mut streams.search, config.parallel);
        let mut stats = PhaseStats::default();

        // With no iterations the initial population is returned untouched
        let opposition_on_init = config.eobl_on_init && config.max_iterations > 0;
        if let (Some(params), true) = (opposition, opposition_on_init) {
            stats.eobl_improvements += opposition_pass(
                &mut colony,
                &evaluator,
                params,
                &mut streams.opposition,
                config.parallel,
            );
        }

        let mut fitness_history = vec![colony.best_fitness()];
        let mut iterations = 0usize;
        let mut stale = 0usize;
        let mut cancelled = false;
        let mut timed_out = false;
        let mut stagnated = false;

        while iterations < config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if deadline.is_some_and(|limit| start.elapsed() >= limit) {
                timed_out = true;
                break;
            }

            let previous_best = colony.best_fitness();

            let employed =
                employed_phase(&mut colony, &evaluator, &mut streams.search, config.parallel);

            let model = SelectionModel::from_solutions(colony.employed());
            let onlooker = onlooker_phase(&mut colony, &evaluator, &model, &mut streams.onlooker);

            let scouts = scout_phase(
                &mut colony,
                &evaluator,
                config.scout_policy,
                config.abandonment_limit,
                &mut streams.search,
            );

            let eobl = match opposition {
                Some(params) => opposition_pass(
                    &mut colony,
                    &evaluator,
                    params,
                    &mut streams.opposition,
                    config.parallel,
                ),
                None => 0,
            };

            colony.refresh_global_best();
            iterations += 1;

            stats.employed_improvements += employed;
            stats.onlooker_improvements += onlooker;
            stats.scout_replacements += scouts;
            stats.eobl_improvements += eobl;

            let best = colony.best_fitness();
            fitness_history.push(best);
            observer(iterations, &colony);

            debug!(
                "iteration {iterations}: best {best:.4}, employed {employed}, onlooker {onlooker}, scouts {scouts}, eobl {eobl}"
            );

            if best < previous_best {
                stale = 0;
            } else {
                stale += 1;
                if config.stagnation_limit > 0 && stale >= config.stagnation_limit {
                    stagnated = true;
                    break;
                }
            }
        }

        let best = colony.into_best();
        let evaluation = evaluator.evaluate_detailed(best.assignment());
        let stop_reason = if cancelled {
            "cancelled"
        } else if timed_out {
            "time limit"
        } else if stagnated {
            "stagnation"
        } else {
            "max iterations"
        };
        info!(
            "abc done: fitness {:.4}, makespan {:.4}, {} iterations ({stop_reason}), {:?}",
            best.fitness(),
            evaluation.makespan,
            iterations,
            start.elapsed()
        );

        Ok(AbcResult {
            fitness: best.fitness(),
            assignment: best.into_assignment(),
            evaluation,
            iterations,
            cancelled,
            timed_out,
            stagnated,
            fitness_history,
            stats,
            seed,
        })
    }
}
