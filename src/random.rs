//! Random sources for the GA engine.
//!
//! The engine consumes a single shared generator sequentially; the order of
//! draws is part of the contract because it fixes reproducibility under a
//! seed. [`RandomSource`] names the four draws the engine needs.
//!
//! - [`Lcg48`]: 48-bit linear congruential generator (multiplier
//!   `0x5DEECE66D`, addend `0xB`). Its stream is fixed, so seeded fixtures are
//!   portable across platforms and releases.
//! - [`RngSource`]: adapter over any [`rand::Rng`].

use rand::Rng;

/// A sequential source of random draws.
pub trait RandomSource {
    /// Uniform double in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Fair coin.
    fn next_bool(&mut self) -> bool;

    /// Uniform index in `[0, bound)`.
    ///
    /// # Panics
    /// Panics if `bound` is zero.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Shuffles `items` in place.
    ///
    /// Walks positions from the back, drawing one `next_index(i + 1)` per
    /// position `i >= 1` and swapping.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn next_bool(&mut self) -> bool {
        (**self).next_bool()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const ADDEND: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

/// 48-bit linear congruential generator.
///
/// # Examples
///
/// ```
/// use u_bitga::random::{Lcg48, RandomSource};
///
/// let mut rng = Lcg48::new(42);
/// assert_eq!(rng.next_index(10), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Creates a generator from a seed. Only the low 48 bits are used.
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ MULTIPLIER) & MASK,
        }
    }

    /// Creates a generator seeded from the thread-local `rand` generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Advances the state and returns its top `bits` bits (1..=32).
    fn next_bits(&mut self, bits: u32) -> i32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(ADDEND)
            & MASK;
        (self.state >> (48 - bits)) as i32
    }

    /// Uniform 32-bit integer.
    pub fn next_i32(&mut self) -> i32 {
        self.next_bits(32)
    }

    /// Uniform integer in `[0, bound)`, rejection-sampled.
    fn next_i32_below(&mut self, bound: i32) -> i32 {
        let m = bound - 1;
        let r = self.next_bits(31);
        if bound & m == 0 {
            return ((i64::from(bound) * i64::from(r)) >> 31) as i32;
        }
        let mut u = r;
        loop {
            let r = u % bound;
            if u.wrapping_sub(r).wrapping_add(m) >= 0 {
                return r;
            }
            u = self.next_bits(31);
        }
    }
}

impl RandomSource for Lcg48 {
    fn next_f64(&mut self) -> f64 {
        let hi = i64::from(self.next_bits(26)) << 27;
        let lo = i64::from(self.next_bits(27));
        (hi + lo) as f64 * DOUBLE_UNIT
    }

    fn next_bool(&mut self) -> bool {
        self.next_bits(1) != 0
    }

    /// # Panics
    /// Panics if `bound` is zero or exceeds `i32::MAX`.
    fn next_index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be positive");
        assert!(bound <= i32::MAX as usize, "bound must not exceed i32::MAX");
        self.next_i32_below(bound as i32) as usize
    }
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
///
/// ```
/// use rand::SeedableRng;
/// use u_bitga::random::{RandomSource, RngSource};
///
/// let mut rng = RngSource(rand::rngs::StdRng::seed_from_u64(7));
/// assert!(rng.next_index(5) < 5);
/// ```
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn next_bool(&mut self) -> bool {
        self.0.random::<bool>()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be positive");
        self.0.random_range(0..bound)
    }
}
