//! Fitness evaluation of task-to-machine assignments.
//!
//! An assignment is a vector with one machine index per task. The machine's
//! completion time is the sum of `length / rate` over the tasks assigned to
//! it, and the makespan is the largest completion time.
//!
//! Fitness is always **minimized**. The inverse of the makespan is only
//! offered as a reporting helper ([`Evaluation::inverse_makespan`]) and is
//! never used for comparisons during the search.

use crate::error::{ConfigurationError, Result};
use crate::model::{Machine, Task};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Objective used to score an assignment. Lower is better in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FitnessMode {
    /// Fitness is the makespan.
    #[default]
    Makespan,

    /// Normalized makespan plus normalized total cost.
    ///
    /// The makespan is divided by the worst possible makespan (every task
    /// serialized on the slowest machine) and the total cost by the worst
    /// possible total cost (every task on its most expensive machine), so
    /// both terms lie in `[0, 1]`.
    MakespanPlusCost,

    /// Makespan scaled by the relative load imbalance.
    ///
    /// `makespan * (1 + 0.5 * imbalance / mean_load)` where the machine load
    /// is the total work assigned to it and the imbalance is the mean
    /// absolute deviation of the loads.
    LoadBalancedMakespan,
}

/// Detailed breakdown of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Largest per-machine completion time.
    pub makespan: f64,
    /// Sum of `cost_per_unit * length / rate` over all tasks.
    pub total_cost: f64,
    /// Scalar fitness under the evaluator's mode.
    pub fitness: f64,
}

impl Evaluation {
    fn invalid() -> Self {
        Self {
            makespan: f64::INFINITY,
            total_cost: f64::INFINITY,
            fitness: f64::INFINITY,
        }
    }

    /// Returns `false` for the sentinel produced by out-of-range assignments.
    pub fn is_valid(&self) -> bool {
        self.fitness.is_finite()
    }

    /// `1 / makespan`, for reports that present throughput instead of time.
    pub fn inverse_makespan(&self) -> f64 {
        if self.makespan > 0.0 {
            1.0 / self.makespan
        } else {
            f64::INFINITY
        }
    }
}

/// Scores assignments against a fixed problem instance.
///
/// The evaluator copies the task lengths and machines it needs, so it is
/// cheap to share across threads and independent of the caller's lists.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    lengths: Vec<u64>,
    machines: Vec<Machine>,
    mode: FitnessMode,
    makespan_ref: f64,
    cost_ref: f64,
}

impl FitnessEvaluator {
    /// Builds an evaluator, validating the instance.
    ///
    /// # Errors
    ///
    /// Fails when there are no tasks or no machines, when a machine rate is
    /// not positive and finite, or when a cost rate is negative or not finite.
    pub fn new(tasks: &[Task], machines: &[Machine], mode: FitnessMode) -> Result<Self> {
        if tasks.is_empty() {
            return Err(ConfigurationError::NoTasks);
        }
        if machines.is_empty() {
            return Err(ConfigurationError::NoMachines);
        }
        for m in machines {
            if !(m.rate.is_finite() && m.rate > 0.0) {
                return Err(ConfigurationError::InvalidMachineRate {
                    machine_id: m.id,
                    rate: m.rate,
                });
            }
            if let Some(cost) = m.cost_per_unit {
                if !(cost.is_finite() && cost >= 0.0) {
                    return Err(ConfigurationError::InvalidCostRate {
                        machine_id: m.id,
                        cost,
                    });
                }
            }
        }

        let lengths: Vec<u64> = tasks.iter().map(|t| t.length).collect();
        let total_length: u64 = lengths.iter().sum();
        let makespan_ref = machines
            .iter()
            .map(|m| m.processing_time(total_length))
            .fold(0.0, f64::max);

        let cost_ref = lengths
            .iter()
            .map(|&l| {
                machines
                    .iter()
                    .map(|m| m.processing_cost(l))
                    .fold(0.0, f64::max)
            })
            .sum();

        Ok(Self {
            lengths,
            machines: machines.to_vec(),
            mode,
            makespan_ref,
            cost_ref,
        })
    }

    /// Number of tasks (assignment length).
    pub fn task_count(&self) -> usize {
        self.lengths.len()
    }

    /// Number of machines (exclusive upper bound of machine indices).
    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Objective in use.
    pub fn mode(&self) -> FitnessMode {
        self.mode
    }

    /// Scores an assignment. Returns `f64::INFINITY` if the assignment has
    /// the wrong length or refers to a machine that does not exist.
    pub fn evaluate(&self, assignment: &[usize]) -> f64 {
        self.evaluate_detailed(assignment).fitness
    }

    /// Scores an assignment and returns the makespan and cost behind it.
    pub fn evaluate_detailed(&self, assignment: &[usize]) -> Evaluation {
        let Some(times) = self.completion_times(assignment) else {
            return Evaluation::invalid();
        };

        let makespan = times.iter().cloned().fold(0.0, f64::max);
        let total_cost: f64 = assignment
            .iter()
            .zip(&self.lengths)
            .map(|(&m, &l)| self.machines[m].processing_cost(l))
            .sum();

        let fitness = match self.mode {
            FitnessMode::Makespan => makespan,
            FitnessMode::MakespanPlusCost => {
                normalize(makespan, self.makespan_ref) + normalize(total_cost, self.cost_ref)
            }
            FitnessMode::LoadBalancedMakespan => makespan * self.imbalance_factor(assignment),
        };

        Evaluation {
            makespan,
            total_cost,
            fitness,
        }
    }

    /// Per-machine completion times, or `None` for an invalid assignment.
    pub fn completion_times(&self, assignment: &[usize]) -> Option<Vec<f64>> {
        if assignment.len() != self.lengths.len() {
            return None;
        }
        let mut times = vec![0.0; self.machines.len()];
        for (&m, &l) in assignment.iter().zip(&self.lengths) {
            let slot = times.get_mut(m)?;
            *slot += self.machines[m].processing_time(l);
        }
        Some(times)
    }

    fn imbalance_factor(&self, assignment: &[usize]) -> f64 {
        let mut loads = vec![0.0; self.machines.len()];
        for (&m, &l) in assignment.iter().zip(&self.lengths) {
            loads[m] += l as f64;
        }
        let n = loads.len() as f64;
        let mean = loads.iter().sum::<f64>() / n;
        if mean <= 0.0 {
            return 1.0;
        }
        let imbalance = loads.iter().map(|&l| (l - mean).abs()).sum::<f64>() / n;
        1.0 + 0.5 * imbalance / mean
    }
}

fn normalize(value: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        value / reference
    } else {
        0.0
    }
}
