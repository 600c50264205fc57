//! Problem instance model.
//!
//! Tasks and machines are owned by the surrounding system. The optimizer
//! only reads a task's work length and a machine's processing and cost
//! rates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    /// Identifier assigned by the owner of the task list.
    pub id: usize,
    /// Amount of work, in work units.
    pub length: u64,
}

impl Task {
    /// Creates a task.
    pub fn new(id: usize, length: u64) -> Self {
        Self { id, length }
    }
}

/// A processing resource.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Machine {
    /// Identifier assigned by the owner of the machine list.
    pub id: usize,
    /// Work units processed per unit of time. Must be positive.
    pub rate: f64,
    /// Cost per unit of busy time. `None` is treated as zero.
    pub cost_per_unit: Option<f64>,
}

impl Machine {
    /// Creates a machine without a cost rate.
    pub fn new(id: usize, rate: f64) -> Self {
        Self {
            id,
            rate,
            cost_per_unit: None,
        }
    }

    /// Sets the cost rate.
    pub fn with_cost_per_unit(mut self, cost: f64) -> Self {
        self.cost_per_unit = Some(cost);
        self
    }

    /// Time this machine needs to process `length` work units.
    #[inline]
    pub fn processing_time(&self, length: u64) -> f64 {
        length as f64 / self.rate
    }

    /// Cost of processing `length` work units on this machine.
    #[inline]
    pub fn processing_cost(&self, length: u64) -> f64 {
        self.cost_per_unit.unwrap_or(0.0) * self.processing_time(length)
    }
}
