//! The evolution engine.
//!
//! [`GeneticAlgorithm`] owns a fixed-size population and drives one
//! generation at a time:
//! cross → mutate → (lazy) evaluate and sort → select.
//!
//! # Generation invariants
//!
//! - The population size never changes after construction.
//! - Every installed individual is watching; every removed one is not.
//! - Each individual exclusively owns its genotype. When the plan picks the
//!   same individual more than once, the first pick keeps the original and
//!   later picks get clones.
//!
//! # Reproducibility
//!
//! All randomness comes from [`GaPlan::random`], consumed in a fixed order.
//! `cross` draws, for each position, a partner index then a crossover coin,
//! then shuffles the current population and the candidate pool in that
//! order. `mutate` draws one double per bit, individual by individual.

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, instrument, trace, warn};

use crate::error::{check_probability, GaError, GaResult};
use crate::individual::Individual;
use crate::random::RandomSource;

use super::config::GaConfig;
use super::plan::GaPlan;

/// Which end of the fitness scale ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessOrder {
    /// Lowest fitness ranks first (minimization).
    #[default]
    Ascending,
    /// Highest fitness ranks first (maximization).
    Descending,
}

impl FitnessOrder {
    /// Compares two fitness values so that the better one is `Less`.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            FitnessOrder::Ascending => a.total_cmp(&b),
            FitnessOrder::Descending => b.total_cmp(&a),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            FitnessOrder::Ascending => FitnessOrder::Descending,
            FitnessOrder::Descending => FitnessOrder::Ascending,
        }
    }
}

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Number of completed selections before this snapshot.
    pub generation: usize,

    /// Fitness at rank 1 under the active order.
    pub best_fitness: f64,

    /// Fitness at the last rank.
    pub worst_fitness: f64,

    /// Arithmetic mean over the population.
    pub mean_fitness: f64,
}

/// Caller-supplied fitness ranking. Returns `Less` when the first value ranks
/// first.
pub type FitnessComparator = Box<dyn Fn(f64, f64) -> Ordering>;

/// A member of the next generation before it is installed.
enum Slot<T> {
    /// Index into the current population.
    Parent(usize),
    /// A freshly built individual.
    Offspring(Individual<T>),
}

/// Bit-string genetic algorithm over a [`GaPlan`].
///
/// # Usage
///
/// ```ignore
/// let config = GaConfig::default().with_population_size(40);
/// let mut ga = GeneticAlgorithm::from_config(MyPlan::new(seed), &config)?;
/// for _ in 0..100 {
///     let stats = ga.step(&config)?;
///     if stats.best_fitness == 0.0 {
///         break;
///     }
/// }
/// let best = ga.get_rank_at(1)?;
/// ```
pub struct GeneticAlgorithm<P: GaPlan> {
    plan: P,
    population: Vec<Individual<P::Phenotype>>,
    order: FitnessOrder,
    comparator: Option<FitnessComparator>,
    sorted: bool,
    generation: usize,
}

impl<P: GaPlan> GeneticAlgorithm<P> {
    /// Builds a population of `size` individuals from the plan.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `size` is zero,
    /// [`GaError::InvalidState`] if the plan returns individuals with
    /// different layouts, or any error raised by the plan.
    pub fn new(mut plan: P, size: usize) -> GaResult<Self> {
        if size < 1 {
            return Err(GaError::InvalidArgument(
                "population size must be at least 1".into(),
            ));
        }
        let mut population: Vec<Individual<P::Phenotype>> = Vec::with_capacity(size);
        for _ in 0..size {
            let mut ind = plan.inflate_individual()?;
            if let Some(first) = population.first() {
                if !first.genotype().equals_schema(ind.genotype()) {
                    warn!("plan inflated individuals with different layouts");
                    return Err(GaError::InvalidState(format!(
                        "inconsistent layouts: {:?} vs {:?}",
                        first.genotype().layout().widths(),
                        ind.genotype().layout().widths()
                    )));
                }
            }
            ind.activate_watcher();
            population.push(ind);
        }
        debug!(size, "population inflated");
        Ok(Self {
            plan,
            population,
            order: FitnessOrder::default(),
            comparator: None,
            sorted: false,
            generation: 0,
        })
    }

    /// Validates `config` and builds a population of
    /// `config.population_size` ranked by `config.order`.
    pub fn from_config(plan: P, config: &GaConfig) -> GaResult<Self> {
        config.validate()?;
        let mut ga = Self::new(plan, config.population_size)?;
        ga.set_order(config.order);
        Ok(ga)
    }

    /// Replaces the fitness order and drops any custom comparator. The
    /// population is re-sorted lazily.
    pub fn set_order(&mut self, order: FitnessOrder) {
        self.order = order;
        self.comparator = None;
        self.sorted = false;
    }

    /// Ranks by an arbitrary comparison of fitness values instead of
    /// [`FitnessOrder`]. The individual ranked `Less` comes first.
    ///
    /// The comparator stays active until the next [`set_order`](Self::set_order),
    /// including the one [`step`](Self::step) makes when its config order
    /// differs from [`order`](Self::order).
    ///
    /// ```ignore
    /// // closest to a target fitness first
    /// ga.set_comparator(|a, b| (a - 16.0).abs().total_cmp(&(b - 16.0).abs()));
    /// ```
    pub fn set_comparator<F>(&mut self, comparator: F)
    where
        F: Fn(f64, f64) -> Ordering + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self.sorted = false;
    }

    /// Returns `true` while a custom comparator replaces the fitness order.
    pub fn has_comparator(&self) -> bool {
        self.comparator.is_some()
    }

    /// Switches between ascending (`false`) and descending (`true`) order.
    pub fn set_reverse_order(&mut self, reverse: bool) {
        let order = if reverse {
            FitnessOrder::Ascending.reversed()
        } else {
            FitnessOrder::Ascending
        };
        self.set_order(order);
    }

    pub fn order(&self) -> FitnessOrder {
        self.order
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    /// Number of completed [`select`](Self::select) calls.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns `true` while the population is evaluated and in rank order.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn plan(&self) -> &P {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut P {
        &mut self.plan
    }

    pub fn into_plan(self) -> P {
        self.plan
    }

    /// The current population, in rank order only if [`is_sorted`](Self::is_sorted).
    pub fn individuals(&self) -> &[Individual<P::Phenotype>] {
        &self.population
    }

    /// Returns a copy of the individual at 1-based `rank`, evaluating and
    /// sorting first if needed.
    ///
    /// # Errors
    /// [`GaError::OutOfRange`] unless `1 <= rank <= population_size`, plus
    /// any evaluation error.
    pub fn get_rank_at(&mut self, rank: usize) -> GaResult<Individual<P::Phenotype>> {
        let size = self.population.len();
        if rank < 1 || rank > size {
            return Err(GaError::OutOfRange {
                what: "rank",
                index: rank,
                lower: 1,
                upper: size + 1,
            });
        }
        self.sort()?;
        Ok(self.population[rank - 1].clone())
    }

    /// Shorthand for `get_rank_at(1)`.
    pub fn best(&mut self) -> GaResult<Individual<P::Phenotype>> {
        self.get_rank_at(1)
    }

    /// Crossover and replacement.
    ///
    /// Pairs every position `i` with a random partner. With probability
    /// `crossover_rate` clones of both are recombined by the plan, otherwise
    /// both parents go into the candidate pool unchanged. The next
    /// population is the first `floor(size * generation_gap)` shuffled
    /// candidates followed by the tail of the shuffled current population.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if either rate lies outside `[0, 1]`.
    #[instrument(level = "debug", skip(self))]
    pub fn cross(&mut self, crossover_rate: f64, generation_gap: f64) -> GaResult<()> {
        check_probability("crossover rate", crossover_rate)?;
        check_probability("generation gap", generation_gap)?;

        let size = self.population.len();
        let mut candidates = Vec::with_capacity(2 * size);
        let mut crossed = 0usize;
        for i in 0..size {
            let j = self.plan.random().next_index(size);
            if self.plan.random().next_f64() < crossover_rate {
                let mut x = self.population[i].clone();
                let mut y = self.population[j].clone();
                self.plan.apply_crossover(&mut x, &mut y)?;
                candidates.push(Slot::Offspring(x));
                candidates.push(Slot::Offspring(y));
                crossed += 1;
            } else {
                candidates.push(Slot::Parent(i));
                candidates.push(Slot::Parent(j));
            }
        }

        let mut before: Vec<usize> = (0..size).collect();
        let rng = self.plan.random();
        rng.shuffle(&mut before);
        rng.shuffle(&mut candidates);

        let gap = (size as f64 * generation_gap) as usize;
        let next: Vec<_> = candidates
            .into_iter()
            .take(gap)
            .chain(before[gap..].iter().map(|&i| Slot::Parent(i)))
            .collect();
        let cloned = self.install(next);
        debug!(crossed, gap, cloned, "crossover complete");
        Ok(())
    }

    /// Flips every bit of every individual with probability `rate`.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `rate` lies outside `[0, 1]`.
    #[instrument(level = "debug", skip(self))]
    pub fn mutate(&mut self, rate: f64) -> GaResult<()> {
        check_probability("mutation rate", rate)?;
        let rng = self.plan.random();
        let mut changed = 0usize;
        for (index, ind) in self.population.iter_mut().enumerate() {
            if ind.mutate(rng, rate)? {
                trace!(index, "individual mutated");
                changed += 1;
            }
        }
        if changed > 0 {
            self.sorted = false;
        }
        debug!(changed, "mutation complete");
        Ok(())
    }

    /// Replaces the population with the plan's survivors.
    ///
    /// # Errors
    /// [`GaError::InvalidState`] if the plan returns the wrong number of
    /// survivors, [`GaError::OutOfRange`] if it returns an index outside the
    /// population, plus any evaluation error.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self) -> GaResult<()> {
        self.sort()?;
        let picks = self.plan.apply_selection(&self.population)?;
        let size = self.population.len();
        if picks.len() != size {
            warn!(expected = size, actual = picks.len(), "plan selected wrong survivor count");
            return Err(GaError::InvalidState(format!(
                "selection returned {} individuals, expected {size}",
                picks.len()
            )));
        }
        if let Some(&index) = picks.iter().find(|&&i| i >= size) {
            warn!(index, size, "plan selected outside the population");
            return Err(GaError::OutOfRange {
                what: "selected index",
                index,
                lower: 0,
                upper: size,
            });
        }
        let cloned = self.install(picks.into_iter().map(Slot::Parent).collect());
        self.generation += 1;
        debug!(generation = self.generation, cloned, "survivors installed");
        Ok(())
    }

    /// Evaluates and sorts if needed, then summarizes fitness.
    pub fn stats(&mut self) -> GaResult<GenerationStats> {
        self.sort()?;
        let fitness = |ind: &Individual<P::Phenotype>| ind.fitness().unwrap_or(f64::NAN);
        let size = self.population.len();
        let sum: f64 = self.population.iter().map(fitness).sum();
        Ok(GenerationStats {
            generation: self.generation,
            best_fitness: fitness(&self.population[0]),
            worst_fitness: fitness(&self.population[size - 1]),
            mean_fitness: sum / size as f64,
        })
    }

    /// Runs one generation: cross, mutate, evaluate, report, select.
    ///
    /// `config.order` replaces the active order if it differs.
    /// `config.population_size` is ignored; the size is fixed at
    /// construction. Returns the statistics taken before selection.
    #[instrument(level = "debug", skip(self, config), fields(generation = self.generation))]
    pub fn step(&mut self, config: &GaConfig) -> GaResult<GenerationStats> {
        config.validate()?;
        if config.order != self.order {
            self.set_order(config.order);
        }
        self.cross(config.crossover_rate, config.generation_gap)?;
        self.mutate(config.mutation_rate)?;
        let stats = self.stats()?;
        self.plan.on_generation(&stats);
        self.select()?;
        debug!(
            best = stats.best_fitness,
            mean = stats.mean_fitness,
            "generation complete"
        );
        Ok(stats)
    }

    /// Evaluates individuals lacking fitness, then stable-sorts by the
    /// active order. No-op while clean.
    fn sort(&mut self) -> GaResult<()> {
        if self.sorted {
            return Ok(());
        }
        let mut pending: Vec<&mut Individual<P::Phenotype>> = self
            .population
            .iter_mut()
            .filter(|ind| !ind.has_fitness())
            .collect();
        let evaluated = pending.len();
        if evaluated > 0 {
            self.plan.calculate_fitness(&mut pending)?;
            if let Some(missing) = pending.iter().find(|ind| !ind.has_fitness()) {
                warn!(individual = %missing, "plan left fitness unset");
                return Err(GaError::InvalidState(format!(
                    "fitness not set after evaluation: {missing}"
                )));
            }
        }
        let order = self.order;
        let comparator = self.comparator.as_deref();
        self.population.sort_by(|a, b| {
            let (fa, fb) = (
                a.fitness().unwrap_or(f64::NAN),
                b.fitness().unwrap_or(f64::NAN),
            );
            match comparator {
                Some(cmp) => cmp(fa, fb),
                None => order.compare(fa, fb),
            }
        });
        self.sorted = true;
        debug!(evaluated, "population sorted");
        Ok(())
    }

    /// Swaps in the next generation and moves the watcher flags. Returns how
    /// many repeated parents were cloned.
    fn install(&mut self, slots: Vec<Slot<P::Phenotype>>) -> usize {
        let mut previous = std::mem::take(&mut self.population);
        previous.iter_mut().for_each(Individual::deactivate_watcher);
        let (mut next, cloned) = assemble(previous, slots);
        next.iter_mut().for_each(Individual::activate_watcher);
        self.population = next;
        self.sorted = false;
        cloned
    }
}

/// Resolves slots into owned individuals.
///
/// The first `Parent(i)` moves the original out of `originals`; every later
/// `Parent(i)` becomes a clone of it.
fn assemble<T: Clone>(
    originals: Vec<Individual<T>>,
    slots: Vec<Slot<T>>,
) -> (Vec<Individual<T>>, usize) {
    let mut taken = vec![false; originals.len()];
    let mut cloned = 0usize;
    let staged: Vec<Slot<T>> = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Parent(i) if taken[i] => {
                cloned += 1;
                Slot::Offspring(originals[i].clone())
            }
            Slot::Parent(i) => {
                taken[i] = true;
                Slot::Parent(i)
            }
            offspring => offspring,
        })
        .collect();

    let mut originals: Vec<Option<Individual<T>>> = originals.into_iter().map(Some).collect();
    let next = staged
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Parent(i) => originals[i].take(),
            Slot::Offspring(ind) => Some(ind),
        })
        .collect();
    (next, cloned)
}

/// One individual per line, in current order.
impl<P: GaPlan> fmt::Display for GeneticAlgorithm<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ind in &self.population {
            writeln!(f, "{ind}")?;
        }
        Ok(())
    }
}
