//! Artificial Bee Colony optimizer for assigning independent tasks to
//! heterogeneous machines.
//!
//! Given task lengths and machine processing rates (optionally cost rates),
//! the optimizer searches for an assignment vector `assignment[t] = machine`
//! that minimizes the makespan, optionally combined with total cost or load
//! imbalance.
//!
//! - [`abc`]: the colony search, with optional elite opposition-based
//!   learning (EOBL)
//! - [`fitness`]: scoring of assignments
//! - [`model`]: task and machine descriptions
//! - [`random`]: deterministic per-slot random streams
//!
//! # Example
//!
//! ```
//! use u_beecolony::abc::{AbcConfig, AbcRunner};
//! use u_beecolony::{FitnessMode, Machine, Task};
//!
//! let tasks: Vec<Task> = (0..12).map(|i| Task::new(i, 100 + 25 * i as u64)).collect();
//! let machines = vec![
//!     Machine::new(0, 1.0).with_cost_per_unit(0.1),
//!     Machine::new(1, 2.0).with_cost_per_unit(0.4),
//!     Machine::new(2, 4.0).with_cost_per_unit(0.9),
//! ];
//!
//! let config = AbcConfig::default()
//!     .with_fitness_mode(FitnessMode::MakespanPlusCost)
//!     .with_eobl(true)
//!     .with_max_iterations(50)
//!     .with_seed(7);
//!
//! let result = AbcRunner::run(&tasks, &machines, &config).unwrap();
//! assert_eq!(result.assignment.len(), tasks.len());
//! assert!(result.assignment.iter().all(|&m| m < machines.len()));
//! ```
//!
//! The optimizer never simulates execution; it only consumes lengths and
//! rates and returns an assignment.

pub mod abc;
pub mod error;
pub mod fitness;
pub mod model;
pub mod random;

pub use error::{ConfigurationError, Result};
pub use fitness::{Evaluation, FitnessEvaluator, FitnessMode};
pub use model::{Machine, Task};
