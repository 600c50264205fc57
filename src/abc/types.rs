//! Food sources and bee roles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Role of a colony slot.
///
/// Roles are fixed by slot position when the colony is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// Owns a food source and perturbs it once per iteration.
    Employed,
    /// Samples employed food sources by quality and perturbs the chosen one.
    Onlooker,
    /// Seeds exploration with a random assignment.
    Scout,
}

/// A candidate assignment (food source).
///
/// `assignment[t]` is the machine index of task `t`. The fitness is always
/// the evaluator's score of the current assignment: every method that
/// changes the assignment also takes the new fitness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    assignment: Vec<usize>,
    fitness: f64,
    abandonment_count: usize,
    role: Role,
}

impl Solution {
    pub(crate) fn new(assignment: Vec<usize>, fitness: f64, role: Role) -> Self {
        Self {
            assignment,
            fitness,
            abandonment_count: 0,
            role,
        }
    }

    /// Machine index per task.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Fitness of the current assignment (lower is better).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Consecutive visits without improvement.
    pub fn abandonment_count(&self) -> usize {
        self.abandonment_count
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Consumes the solution, returning its assignment.
    pub fn into_assignment(self) -> Vec<usize> {
        self.assignment
    }

    /// Stores the score of the current assignment.
    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Installs an improved assignment and resets the abandonment counter.
    pub(crate) fn accept(&mut self, assignment: Vec<usize>, fitness: f64) {
        self.assignment = assignment;
        self.fitness = fitness;
        self.abandonment_count = 0;
    }

    /// Copies `assignment` into this slot without touching the counter.
    pub(crate) fn record(&mut self, assignment: &[usize], fitness: f64) {
        self.assignment.clear();
        self.assignment.extend_from_slice(assignment);
        self.fitness = fitness;
    }

    /// Replaces one dimension if that strictly improves fitness.
    ///
    /// On rejection the assignment is left untouched and the abandonment
    /// counter is incremented. Returns whether the move was accepted.
    pub(crate) fn try_move(&mut self, dimension: usize, machine: usize, fitness: f64) -> bool {
        if fitness < self.fitness {
            self.assignment[dimension] = machine;
            self.fitness = fitness;
            self.abandonment_count = 0;
            true
        } else {
            self.abandonment_count += 1;
            false
        }
    }

    /// Mutable access for evaluating a single-dimension move in place.
    ///
    /// The caller must restore the assignment before returning control.
    pub(crate) fn assignment_mut(&mut self) -> &mut [usize] {
        &mut self.assignment
    }
}
