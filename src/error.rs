//! Error types.
//!
//! Every error in this crate is a configuration problem detected before the
//! search starts. Once a run has been set up, the search itself is total and
//! cannot fail.

use thiserror::Error;

/// Result type alias using [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Invalid problem instance or algorithm parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Role counts do not add up to the population size.
    #[error(
        "role counts do not match population: {employed} employed + {onlooker} onlooker + {scout} scout != {population}"
    )]
    RoleCountMismatch {
        employed: usize,
        onlooker: usize,
        scout: usize,
        population: usize,
    },

    /// The instance has no tasks to assign.
    #[error("at least one task is required")]
    NoTasks,

    /// The instance has no machines to assign tasks to.
    #[error("at least one machine is required")]
    NoMachines,

    /// The colony layout leaves no employed bees.
    #[error("colony layout must contain at least one employed bee")]
    NoEmployedBees,

    /// A machine's processing rate is not a positive finite number.
    #[error("machine {machine_id}: rate must be positive and finite, got {rate}")]
    InvalidMachineRate { machine_id: usize, rate: f64 },

    /// A machine's cost rate is negative or not finite.
    #[error("machine {machine_id}: cost per unit must be non-negative and finite, got {cost}")]
    InvalidCostRate { machine_id: usize, cost: f64 },

    /// Any other out-of-range parameter.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigurationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
