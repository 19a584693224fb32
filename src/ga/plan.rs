//! The plan contract.
//!
//! A [`GaPlan`] is the problem-specific collaborator of the engine. It
//! manufactures individuals, owns the shared random source, evaluates
//! fitness and decides crossover and survival. The engine only shuffles,
//! mutates and enforces the generation invariants.

use crate::error::GaResult;
use crate::individual::Individual;
use crate::random::RandomSource;

use super::population::GenerationStats;

/// Defines a bit-string GA problem.
///
/// 1. **Initialization**: [`inflate_individual`](Self::inflate_individual)
/// 2. **Randomness**: [`random`](Self::random), one generator for the run
/// 3. **Evaluation**: [`calculate_fitness`](Self::calculate_fitness)
/// 4. **Crossover**: [`apply_crossover`](Self::apply_crossover)
/// 5. **Survival**: [`apply_selection`](Self::apply_selection)
///
/// # Implementing
///
/// ```
/// use u_bitga::error::GaResult;
/// use u_bitga::ga::{crossover, selection, GaPlan};
/// use u_bitga::genotype::Layout;
/// use u_bitga::individual::Individual;
/// use u_bitga::random::Lcg48;
///
/// struct OneMax {
///     rng: Lcg48,
/// }
///
/// impl GaPlan for OneMax {
///     type Phenotype = f64;
///     type Random = Lcg48;
///
///     fn inflate_individual(&mut self) -> GaResult<Individual> {
///         let mut ind = Individual::new(Layout::builder().append_repeated(8, 4).inflate()?);
///         ind.randomize(&mut self.rng)?;
///         Ok(ind)
///     }
///
///     fn random(&mut self) -> &mut Lcg48 {
///         &mut self.rng
///     }
///
///     fn calculate_fitness(&mut self, individuals: &mut [&mut Individual]) -> GaResult<()> {
///         for ind in individuals.iter_mut() {
///             let zeros = ind.genotype().bit_length() - ind.genotype().count_ones();
///             ind.set_fitness(zeros as f64)?;
///         }
///         Ok(())
///     }
///
///     fn apply_crossover(&mut self, x: &mut Individual, y: &mut Individual) -> GaResult<()> {
///         crossover::single_point(x, y, &mut self.rng)
///     }
///
///     fn apply_selection(&mut self, sorted: &[Individual]) -> GaResult<Vec<usize>> {
///         selection::select_tournament(sorted, &mut self.rng, sorted.len(), 2)
///     }
/// }
/// ```
pub trait GaPlan {
    /// Phenotype slot type of the individuals this plan builds.
    type Phenotype: Clone;

    /// The shared random source.
    type Random: RandomSource;

    /// Creates a freshly randomized individual.
    ///
    /// Every individual returned must share one locus layout.
    fn inflate_individual(&mut self) -> GaResult<Individual<Self::Phenotype>>;

    /// The run's random source. Must be the same generator on every call.
    fn random(&mut self) -> &mut Self::Random;

    /// Sets a valid fitness on every individual in `individuals`.
    ///
    /// The engine passes only individuals whose fitness is invalid and
    /// fails with [`InvalidState`](crate::error::GaError::InvalidState) if
    /// any of them is still invalid afterwards.
    fn calculate_fitness(
        &mut self,
        individuals: &mut [&mut Individual<Self::Phenotype>],
    ) -> GaResult<()>;

    /// Recombines two clones in place.
    fn apply_crossover(
        &mut self,
        x: &mut Individual<Self::Phenotype>,
        y: &mut Individual<Self::Phenotype>,
    ) -> GaResult<()>;

    /// Picks the next generation from the population, sorted best first.
    ///
    /// Returns indices into `sorted`, exactly `sorted.len()` of them.
    /// Repeats are allowed; the engine clones repeated picks.
    fn apply_selection(
        &mut self,
        sorted: &[Individual<Self::Phenotype>],
    ) -> GaResult<Vec<usize>>;

    /// Called by [`GeneticAlgorithm::step`](super::GeneticAlgorithm::step)
    /// once per generation, after evaluation and before selection.
    ///
    /// The default implementation is a no-op.
    fn on_generation(&mut self, _stats: &GenerationStats) {}
}
