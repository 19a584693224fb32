//! Bit-string genetic algorithm engine.
//!
//! Candidate solutions are flat bit strings cut into fixed-width loci:
//!
//! - **Genotype**: [`GenoType`](genotype::GenoType) over a shared
//!   [`Layout`](genotype::Layout), with typed locus accessors and
//!   mask-driven [`invert`](genotype::GenoType::invert) and
//!   [`swap`](genotype::GenoType::swap).
//! - **Individual**: [`Individual`](individual::Individual) wraps a genotype
//!   with a phenotype cache and a fitness, both invalidated by any change to
//!   the bits.
//! - **Engine**: [`GeneticAlgorithm`](ga::GeneticAlgorithm) runs crossover
//!   with a generation gap, per-bit mutation, lazy evaluation and
//!   plan-driven selection over a fixed-size population.
//! - **Randomness**: every draw comes from one
//!   [`RandomSource`](random::RandomSource) owned by the plan;
//!   [`Lcg48`](random::Lcg48) makes runs reproducible under a seed.
//!
//! # Architecture
//!
//! The crate contains no problem-specific concepts. Decoding loci into
//! parameters, computing fitness and choosing survivors are all defined by
//! a [`GaPlan`](ga::GaPlan) implementation. The engine is synchronous and
//! single-threaded; the caller drives the generation loop.

pub mod error;
pub mod ga;
pub mod genotype;
pub mod individual;
pub mod random;
