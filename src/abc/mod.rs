//! Artificial Bee Colony search for task-to-machine assignment.
//!
//! A colony of candidate assignments (food sources) is improved in rounds
//! by three kinds of bees: employed bees perturb their own source, onlookers
//! revisit sources chosen by quality, and scouts replace sources that have
//! stopped improving. An optional elite opposition-based learning pass
//! reflects sources around the best solution found so far.
//!
//! # Key Types
//!
//! - [`AbcConfig`]: Colony layout, abandonment limit, EOBL and termination
//! - [`AbcRunner`]: Executes the search loop
//! - [`AbcResult`]: Best assignment with run statistics
//! - [`Colony`] / [`Solution`]: Population state, visible to observers
//!
//! # Determinism
//!
//! Every slot owns its own random stream derived from the master seed, so a
//! seeded run yields the same result with or without the `parallel` feature.
//!
//! # References
//!
//! - Karaboga (2005), "An Idea Based on Honey Bee Swarm for Numerical
//!   Optimization", Technical Report TR06, Erciyes University
//! - Karaboga & Basturk (2007), "A powerful and efficient algorithm for
//!   numerical function optimization: artificial bee colony (ABC) algorithm"
//! - Zhou, Wu & Wang (2015), "Elite opposition-based particle swarm
//!   optimization"

mod colony;
mod config;
mod opposition;
mod phases;
mod runner;
mod selection;
mod types;

pub use colony::{role_at, Colony};
pub use config::{recommended_abandonment_limit, AbcConfig, ColonyLayout, ScoutPolicy};
pub use opposition::opposition_candidate;
pub use phases::neighbor_value;
pub use runner::{AbcResult, AbcRunner, PhaseStats};
pub use selection::{selection_weight, SelectionModel};
pub use types::{Role, Solution};
