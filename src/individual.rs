//! Individuals: a genotype plus its decoded phenotype cache and fitness.
//!
//! The individual exclusively owns its [`GenoType`] and is the only entry
//! point for mutating it once wrapped. Every mutation that goes through the
//! individual clears the phenotype cache and invalidates the fitness, so a
//! stale cache cannot be observed.
//!
//! # Invalidation contract
//!
//! - [`invert`](Individual::invert), [`mutate`](Individual::mutate) and the
//!   typed setters invalidate only when the bit string actually changes
//!   (an empty mask, a zero mutation rate or re-setting the same value keep
//!   the cache). They return whether it changed.
//! - [`swap`](Individual::swap) always invalidates both sides, even for an
//!   empty mask.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{check_index, GaError, GaResult};
use crate::genotype::{GenoType, Mask};
use crate::random::RandomSource;

/// A candidate solution.
///
/// `T` is the phenotype slot type; each locus has one optional slot.
/// Cloning deep-copies the genotype, clones the phenotype slots, keeps the
/// fitness, and yields an individual that is not watching.
#[derive(Debug)]
pub struct Individual<T = f64> {
    genotype: GenoType,
    phenotype: Vec<Option<T>>,
    fitness: f64,
    watching: bool,
}

impl<T> Individual<T> {
    /// Wraps `genotype` with an empty phenotype cache and invalid fitness.
    pub fn new(genotype: GenoType) -> Self {
        let slots = genotype.loci_count();
        Self {
            genotype,
            phenotype: std::iter::repeat_with(|| None).take(slots).collect(),
            fitness: f64::NAN,
            watching: false,
        }
    }

    /// Read-only access to the genotype.
    pub fn genotype(&self) -> &GenoType {
        &self.genotype
    }

    /// Unwraps the genotype.
    pub fn into_genotype(self) -> GenoType {
        self.genotype
    }

    /// Cached phenotype of locus `i`, `None` until the plan stores one.
    pub fn phenotype(&self, i: usize) -> GaResult<Option<&T>> {
        check_index("locus", i, self.phenotype.len())?;
        Ok(self.phenotype[i].as_ref())
    }

    /// Caches a decoded value for locus `i`. Cleared by any bit change.
    pub fn set_phenotype(&mut self, i: usize, value: T) -> GaResult<()> {
        check_index("locus", i, self.phenotype.len())?;
        self.phenotype[i] = Some(value);
        Ok(())
    }

    /// All phenotype slots in locus order.
    pub fn phenotypes(&self) -> &[Option<T>] {
        &self.phenotype
    }

    /// Returns `true` once a fitness is stored and no bit has changed since.
    pub fn has_fitness(&self) -> bool {
        !self.fitness.is_nan()
    }

    /// The fitness, or `None` while it is invalid.
    pub fn fitness(&self) -> Option<f64> {
        self.has_fitness().then_some(self.fitness)
    }

    /// Stores a computed fitness.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `fitness` is NaN.
    pub fn set_fitness(&mut self, fitness: f64) -> GaResult<()> {
        if fitness.is_nan() {
            return Err(GaError::InvalidArgument("fitness is NaN".into()));
        }
        self.fitness = fitness;
        Ok(())
    }

    /// Marks this individual as installed in a population.
    ///
    /// The flag only records membership. Invalidation on change happens for
    /// every mutation through the individual whether or not it is watching.
    pub fn activate_watcher(&mut self) {
        self.watching = true;
    }

    /// Clears the installed flag. Has no effect on invalidation.
    pub fn deactivate_watcher(&mut self) {
        self.watching = false;
    }

    /// Returns `true` while installed in a population.
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// Sets a width-1 locus. Returns whether the bits changed.
    pub fn set_bool(&mut self, i: usize, value: bool) -> GaResult<bool> {
        let changed = self.genotype.set_bool(i, value)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Sets locus `i` bit by bit, first element least significant.
    pub fn set_bits(&mut self, i: usize, value: &[bool]) -> GaResult<bool> {
        let changed = self.genotype.set_bits(i, value)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Sets locus `i` to an unsigned integer.
    pub fn set_long(&mut self, i: usize, value: u64) -> GaResult<bool> {
        let changed = self.genotype.set_long(i, value)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Sets a width-64 locus to the IEEE-754 pattern of `value`.
    pub fn set_double(&mut self, i: usize, value: f64) -> GaResult<bool> {
        let changed = self.genotype.set_double(i, value)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Flips the bits selected by `mask`.
    pub fn invert(&mut self, mask: &Mask) -> GaResult<bool> {
        let changed = self.genotype.invert(mask)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Exchanges the bits selected by `mask` between `a` and `b` and
    /// invalidates both. Returns `true` if either bit string changed.
    ///
    /// # Errors
    /// [`GaError::IncompatibleSchema`] if the genotype layouts differ.
    pub fn swap(a: &mut Self, b: &mut Self, mask: &Mask) -> GaResult<bool> {
        let changed = GenoType::swap(&mut a.genotype, &mut b.genotype, mask)?;
        a.notify(true);
        b.notify(true);
        Ok(changed)
    }

    /// Flips each bit with probability `rate`.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `rate` is not in `[0, 1]`.
    pub fn mutate<R: RandomSource>(&mut self, rng: &mut R, rate: f64) -> GaResult<bool> {
        let changed = self.genotype.mutate(rng, rate)?;
        self.notify(changed);
        Ok(changed)
    }

    /// Equivalent to `mutate(rng, 0.5)`.
    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) -> GaResult<bool> {
        self.mutate(rng, 0.5)
    }

    /// Compares by fitness only.
    ///
    /// # Errors
    /// [`GaError::InvalidState`] if either fitness is invalid.
    pub fn compare(&self, other: &Self) -> GaResult<Ordering> {
        match (self.fitness(), other.fitness()) {
            (Some(a), Some(b)) => Ok(a.total_cmp(&b)),
            (None, _) => Err(GaError::InvalidState(format!("invalid fitness: {self}"))),
            (_, None) => Err(GaError::InvalidState(format!("invalid fitness: {other}"))),
        }
    }

    pub fn is_greater_than(&self, other: &Self) -> GaResult<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn is_less_than(&self, other: &Self) -> GaResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    /// The genotype rendering, one binary group per locus.
    pub fn to_genotype_string(&self) -> String {
        self.genotype.to_string()
    }

    fn notify(&mut self, changed: bool) {
        if changed {
            self.phenotype.iter_mut().for_each(|slot| *slot = None);
            self.fitness = f64::NAN;
        }
    }

    fn content_hash(&self) -> u64 {
        let mut h = std::collections::hash_map::DefaultHasher::new();
        self.genotype.hash(&mut h);
        h.finish()
    }
}

impl<T: fmt::Debug> Individual<T> {
    /// The phenotype slots rendered as a list.
    pub fn to_phenotype_string(&self) -> String {
        format!("{:?}", self.phenotype)
    }
}

impl<T: Clone> Clone for Individual<T> {
    fn clone(&self) -> Self {
        Self {
            genotype: self.genotype.clone(),
            phenotype: self.phenotype.clone(),
            fitness: self.fitness,
            watching: false,
        }
    }
}

/// Equal when the genotypes are equal; fitness and phenotype are derived.
impl<T> PartialEq for Individual<T> {
    fn eq(&self, other: &Self) -> bool {
        self.genotype == other.genotype
    }
}

impl<T> Eq for Individual<T> {}

impl<T> Hash for Individual<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genotype.hash(state);
    }
}

/// Renders as `<content hash>#<fitness>`.
impl<T> fmt::Display for Individual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}#{}", self.content_hash() as u32, self.fitness)
    }
}
