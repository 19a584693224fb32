//! Genetic Algorithm engine.
//!
//! A domain-agnostic, single-threaded GA over segmented bit strings. Users
//! define their problem by implementing [`GaPlan`], which builds individuals,
//! owns the random source, evaluates fitness and decides crossover and
//! survival. [`GeneticAlgorithm`] enforces the generation invariants.
//!
//! # Key Types
//!
//! - [`GaPlan`]: Problem definition (the plan contract)
//! - [`GeneticAlgorithm`]: The population and its cross / mutate / select steps
//! - [`GaConfig`]: Per-generation parameters
//! - [`GenerationStats`]: Fitness summary returned by [`GeneticAlgorithm::step`]
//!
//! # Submodules
//!
//! - [`crossover`]: Single-point, two-point and uniform mask crossover
//! - [`selection`]: Elite and tournament selection
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (1975), *An Analysis of the Behavior of a Class of Genetic Adaptive Systems*
//!   (generation gap)

mod config;
pub mod crossover;
mod plan;
mod population;
pub mod selection;

pub use config::GaConfig;
pub use plan::GaPlan;
pub use population::{FitnessComparator, FitnessOrder, GenerationStats, GeneticAlgorithm};
pub use selection::Selection;
