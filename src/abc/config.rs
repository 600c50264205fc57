//! ABC configuration.
//!
//! [`AbcConfig`] holds every parameter of the search loop: colony layout,
//! abandonment policy, opposition-based learning and termination.

use crate::error::{ConfigurationError, Result};
use crate::fitness::FitnessMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of slots per role.
///
/// Slots are laid out positionally: `[0, employed)` are employed bees, the
/// next `onlooker` slots are onlookers and the remaining `scout` slots are
/// scouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColonyLayout {
    pub employed: usize,
    pub onlooker: usize,
    pub scout: usize,
}

impl ColonyLayout {
    /// Creates an explicit layout.
    pub fn new(employed: usize, onlooker: usize, scout: usize) -> Self {
        Self {
            employed,
            onlooker,
            scout,
        }
    }

    /// Total number of slots.
    pub fn total(&self) -> usize {
        self.employed + self.onlooker + self.scout
    }

    /// Splits a population into roles.
    ///
    /// `scout` slots are reserved first; `employed_fraction` of the rest
    /// (rounded, at least one) are employed and the remainder are onlookers.
    /// Returns `None` if the population cannot hold the scouts plus one
    /// employed bee.
    pub fn from_fraction(population: usize, employed_fraction: f64, scout: usize) -> Option<Self> {
        let foragers = population.checked_sub(scout).filter(|&n| n > 0)?;
        let employed = ((foragers as f64 * employed_fraction).round() as usize).clamp(1, foragers);
        Some(Self {
            employed,
            onlooker: foragers - employed,
            scout,
        })
    }
}

/// Which abandoned food sources the scout phase replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoutPolicy {
    /// Replace every employed source whose abandonment count exceeds the limit.
    #[default]
    AllExceeding,

    /// Replace only the most abandoned source (lowest index on ties), and
    /// only if it exceeds the limit.
    MostAbandoned,
}

/// Classical abandonment limit: `round(0.5 * employed * dimensions)`.
///
/// # Examples
///
/// ```
/// use u_beecolony::abc::recommended_abandonment_limit;
///
/// assert_eq!(recommended_abandonment_limit(20, 9), 90);
/// ```
pub fn recommended_abandonment_limit(employed: usize, dimensions: usize) -> usize {
    (0.5 * employed as f64 * dimensions as f64).round() as usize
}

/// Configuration for the Artificial Bee Colony search.
///
/// # Defaults
///
/// ```
/// use u_beecolony::abc::AbcConfig;
///
/// let config = AbcConfig::default();
/// assert_eq!(config.population_size, 40);
/// assert_eq!(config.max_iterations, 100);
/// assert!(!config.use_eobl);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_beecolony::abc::{AbcConfig, ScoutPolicy};
/// use u_beecolony::FitnessMode;
///
/// let config = AbcConfig::default()
///     .with_population_size(51)
///     .with_abandonment_limit(30)
///     .with_fitness_mode(FitnessMode::MakespanPlusCost)
///     .with_scout_policy(ScoutPolicy::AllExceeding)
///     .with_eobl(true)
///     .with_seed(42);
/// assert_eq!(config.layout().unwrap().employed, 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AbcConfig {
    /// Total number of colony slots (food sources, onlookers and scouts).
    pub population_size: usize,

    /// Share of the non-scout slots that are employed bees, in (0, 1].
    pub employed_fraction: f64,

    /// Number of scout-tagged slots.
    pub scout_count: usize,

    /// Explicit role counts. Overrides `employed_fraction` and `scout_count`
    /// and must add up to `population_size`.
    pub layout: Option<ColonyLayout>,

    /// A food source is abandoned once its counter of consecutive
    /// non-improving visits exceeds this value.
    pub abandonment_limit: usize,

    /// Maximum number of iterations. 0 returns the best initial solution.
    pub max_iterations: usize,

    /// Objective to minimize.
    pub fitness_mode: FitnessMode,

    /// Scout replacement policy.
    pub scout_policy: ScoutPolicy,

    /// Enables the elite opposition-based learning pass.
    pub use_eobl: bool,

    /// Probability that a given food source receives an opposition candidate.
    pub prob_eobl: f64,

    /// Opposition coefficient `k` in `round((lb + ub) * k) - x`, in (0, 1].
    pub obl_coefficient: f64,

    /// Per-dimension probability of copying the elite value instead of the
    /// reflected one.
    pub obl_jump_rate: f64,

    /// Also runs one opposition pass on the initial population.
    pub eobl_on_init: bool,

    /// Iterations without improvement of the global best before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination (the default).
    pub stagnation_limit: usize,

    /// Optional wall-clock time limit in milliseconds, checked between
    /// iterations.
    pub time_limit_ms: Option<u64>,

    /// Whether to evaluate food sources in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature. Results are identical
    /// either way.
    pub parallel: bool,

    /// Master seed. `None` draws one from the OS generator.
    pub seed: Option<u64>,
}

impl Default for AbcConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            employed_fraction: 0.5,
            scout_count: 1,
            layout: None,
            abandonment_limit: 20,
            max_iterations: 100,
            fitness_mode: FitnessMode::default(),
            scout_policy: ScoutPolicy::default(),
            use_eobl: false,
            prob_eobl: 0.3,
            obl_coefficient: 0.3,
            obl_jump_rate: 0.7,
            eobl_on_init: false,
            stagnation_limit: 0,
            time_limit_ms: None,
            parallel: false,
            seed: None,
        }
    }
}

impl AbcConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_employed_fraction(mut self, fraction: f64) -> Self {
        self.employed_fraction = fraction;
        self
    }

    pub fn with_scout_count(mut self, n: usize) -> Self {
        self.scout_count = n;
        self
    }

    /// Sets explicit role counts.
    pub fn with_layout(mut self, employed: usize, onlooker: usize, scout: usize) -> Self {
        self.layout = Some(ColonyLayout::new(employed, onlooker, scout));
        self
    }

    pub fn with_abandonment_limit(mut self, limit: usize) -> Self {
        self.abandonment_limit = limit;
        self
    }

    /// Sets the abandonment limit to [`recommended_abandonment_limit`] for
    /// the current layout and `task_count` dimensions.
    pub fn with_recommended_abandonment_limit(mut self, task_count: usize) -> Self {
        if let Ok(layout) = self.layout() {
            self.abandonment_limit = recommended_abandonment_limit(layout.employed, task_count);
        }
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_fitness_mode(mut self, mode: FitnessMode) -> Self {
        self.fitness_mode = mode;
        self
    }

    pub fn with_scout_policy(mut self, policy: ScoutPolicy) -> Self {
        self.scout_policy = policy;
        self
    }

    pub fn with_eobl(mut self, enabled: bool) -> Self {
        self.use_eobl = enabled;
        self
    }

    pub fn with_prob_eobl(mut self, p: f64) -> Self {
        self.prob_eobl = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_obl_coefficient(mut self, k: f64) -> Self {
        self.obl_coefficient = k;
        self
    }

    pub fn with_obl_jump_rate(mut self, rate: f64) -> Self {
        self.obl_jump_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_eobl_on_init(mut self, enabled: bool) -> Self {
        self.eobl_on_init = enabled;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resolves the role counts, checking that they partition the population.
    pub fn layout(&self) -> Result<ColonyLayout> {
        let layout = match self.layout {
            Some(layout) => layout,
            None => {
                if !(self.employed_fraction > 0.0 && self.employed_fraction <= 1.0) {
                    return Err(ConfigurationError::invalid(
                        "employed_fraction",
                        format!("must be in (0, 1], got {}", self.employed_fraction),
                    ));
                }
                ColonyLayout::from_fraction(
                    self.population_size,
                    self.employed_fraction,
                    self.scout_count,
                )
                .ok_or(ConfigurationError::NoEmployedBees)?
            }
        };

        if layout.total() != self.population_size {
            return Err(ConfigurationError::RoleCountMismatch {
                employed: layout.employed,
                onlooker: layout.onlooker,
                scout: layout.scout,
                population: self.population_size,
            });
        }
        if layout.employed == 0 {
            return Err(ConfigurationError::NoEmployedBees);
        }
        Ok(layout)
    }

    /// Validates the configuration.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(ConfigurationError::invalid(
                "population_size",
                format!("must be at least 2, got {}", self.population_size),
            ));
        }
        self.layout()?;
        check_probability("prob_eobl", self.prob_eobl)?;
        check_probability("obl_jump_rate", self.obl_jump_rate)?;
        if !(self.obl_coefficient > 0.0 && self.obl_coefficient <= 1.0) {
            return Err(ConfigurationError::invalid(
                "obl_coefficient",
                format!("must be in (0, 1], got {}", self.obl_coefficient),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigurationError::invalid(
                "time_limit_ms",
                "must be positive or None",
            ));
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigurationError::invalid(
            name,
            format!("must be in [0, 1], got {p}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AbcConfig::default();
        assert_eq!(config.population_size, 40);
        assert!((config.employed_fraction - 0.5).abs() < 1e-12);
        assert_eq!(config.scout_count, 1);
        assert_eq!(config.abandonment_limit, 20);
        assert_eq!(config.fitness_mode, FitnessMode::Makespan);
        assert_eq!(config.scout_policy, ScoutPolicy::AllExceeding);
        assert!(!config.use_eobl);
        assert!(!config.parallel);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_layout_partitions_population() {
        let layout = AbcConfig::default().layout().unwrap();
        assert_eq!(layout, ColonyLayout::new(20, 19, 1));
        assert_eq!(layout.total(), 40);
    }

    #[test]
    fn test_layout_sums_to_population() {
        for n in 2..200 {
            let config = AbcConfig::default().with_population_size(n);
            let layout = config.layout().unwrap();
            assert_eq!(layout.total(), n, "population {n}");
            assert!(layout.employed >= 1);
        }
    }

    #[test]
    fn test_odd_population_splits_evenly() {
        let layout = AbcConfig::default()
            .with_population_size(41)
            .layout()
            .unwrap();
        assert_eq!(layout, ColonyLayout::new(20, 20, 1));
    }

    #[test]
    fn test_explicit_layout_mismatch() {
        let config = AbcConfig::default()
            .with_population_size(10)
            .with_layout(5, 5, 1);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::RoleCountMismatch {
                employed: 5,
                onlooker: 5,
                scout: 1,
                population: 10,
            })
        );
    }

    #[test]
    fn test_explicit_layout_ok() {
        let config = AbcConfig::default()
            .with_population_size(11)
            .with_layout(5, 5, 1);
        assert_eq!(config.layout().unwrap(), ColonyLayout::new(5, 5, 1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_layout_without_employed() {
        let config = AbcConfig::default()
            .with_population_size(4)
            .with_layout(0, 3, 1);
        assert_eq!(config.validate(), Err(ConfigurationError::NoEmployedBees));
    }

    #[test]
    fn test_scouts_fill_population() {
        let config = AbcConfig::default()
            .with_population_size(3)
            .with_scout_count(3);
        assert_eq!(config.validate(), Err(ConfigurationError::NoEmployedBees));
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = AbcConfig::default().with_population_size(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidParameter {
                name: "population_size",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_bad_fraction() {
        for fraction in [0.0, -0.5, 1.5, f64::NAN] {
            let config = AbcConfig::default().with_employed_fraction(fraction);
            assert!(config.validate().is_err(), "fraction {fraction}");
        }
    }

    #[test]
    fn test_validate_bad_coefficient() {
        assert!(AbcConfig::default()
            .with_obl_coefficient(0.0)
            .validate()
            .is_err());
        assert!(AbcConfig::default()
            .with_obl_coefficient(1.2)
            .validate()
            .is_err());
        assert!(AbcConfig::default()
            .with_obl_coefficient(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_unclamped_probability() {
        let mut config = AbcConfig::default();
        config.prob_eobl = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_rates() {
        let config = AbcConfig::default()
            .with_prob_eobl(2.0)
            .with_obl_jump_rate(-1.0);
        assert!((config.prob_eobl - 1.0).abs() < 1e-12);
        assert!((config.obl_jump_rate - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_zero_time_limit() {
        let config = AbcConfig::default().with_time_limit_ms(0);
        assert!(config.validate().is_err());
        let config = AbcConfig::default().with_time_limit_ms(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_is_valid() {
        assert!(AbcConfig::default()
            .with_max_iterations(0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_recommended_limit() {
        assert_eq!(recommended_abandonment_limit(15, 10), 75);
        assert_eq!(recommended_abandonment_limit(1, 1), 1); // 0.5 rounds away from zero

        let config = AbcConfig::default()
            .with_population_size(41)
            .with_recommended_abandonment_limit(9);
        assert_eq!(config.abandonment_limit, 90);
    }
}
