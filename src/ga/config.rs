//! GA configuration.
//!
//! [`GaConfig`] holds the parameters of one generation step. The caller
//! owns the loop, so there are no termination settings here.

use crate::error::{check_probability, GaError, GaResult};

use super::population::FitnessOrder;

/// Configuration for [`GeneticAlgorithm`](super::GeneticAlgorithm).
///
/// # Defaults
///
/// ```
/// use u_bitga::ga::{FitnessOrder, GaConfig};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.order, FitnessOrder::Ascending);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_bitga::ga::{FitnessOrder, GaConfig};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_crossover_rate(0.8)
///     .with_generation_gap(1.0)
///     .with_mutation_rate(0.005)
///     .with_order(FitnessOrder::Descending);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Probability that a parent pair is recombined (0.0–1.0).
    ///
    /// Pairs that are not recombined enter the candidate pool unchanged.
    pub crossover_rate: f64,

    /// Fraction of the population replaced by crossover candidates each
    /// generation (0.0–1.0). The rest is carried over from the shuffled
    /// current population.
    pub generation_gap: f64,

    /// Per-bit flip probability (0.0–1.0).
    ///
    /// Typical values are around `1 / bit_length`.
    pub mutation_rate: f64,

    /// Which end of the fitness scale ranks first.
    pub order: FitnessOrder,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            crossover_rate: 0.7,
            generation_gap: 0.9,
            mutation_rate: 0.01,
            order: FitnessOrder::Ascending,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the generation gap.
    pub fn with_generation_gap(mut self, gap: f64) -> Self {
        self.generation_gap = gap;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the fitness order.
    pub fn with_order(mut self, order: FitnessOrder) -> Self {
        self.order = order;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if the population is empty or any rate
    /// lies outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> GaResult<()> {
        if self.population_size < 1 {
            return Err(GaError::InvalidArgument(
                "population_size must be at least 1".into(),
            ));
        }
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("generation_gap", self.generation_gap)?;
        check_probability("mutation_rate", self.mutation_rate)?;
        Ok(())
    }
}
