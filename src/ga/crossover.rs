//! Standard crossover helpers.
//!
//! Each helper builds a [`Mask`] over the parents' bit length and exchanges
//! the selected bits with [`Individual::swap`], so both individuals are
//! always invalidated. Parents must share a locus layout.

use crate::error::GaResult;
use crate::genotype::Mask;
use crate::individual::Individual;
use crate::random::RandomSource;

/// Single-point crossover at a cut drawn with `next_index(bit_length)`.
///
/// Bits at or after the cut are exchanged.
pub fn single_point<T, R: RandomSource>(
    x: &mut Individual<T>,
    y: &mut Individual<T>,
    rng: &mut R,
) -> GaResult<()> {
    let cut = rng.next_index(x.genotype().bit_length());
    single_point_at(x, y, cut)
}

/// Single-point crossover at a fixed `cut`.
///
/// A cut of `0` exchanges everything, a cut of `bit_length` nothing.
///
/// # Errors
/// [`InvalidArgument`](crate::error::GaError::InvalidArgument) if `cut`
/// exceeds the bit length,
/// [`IncompatibleSchema`](crate::error::GaError::IncompatibleSchema) if the
/// layouts differ.
pub fn single_point_at<T>(
    x: &mut Individual<T>,
    y: &mut Individual<T>,
    cut: usize,
) -> GaResult<()> {
    let len = x.genotype().bit_length();
    let mask = Mask::with_range(len, cut, len)?;
    Individual::swap(x, y, &mask)?;
    Ok(())
}

/// Two-point crossover.
///
/// Draws two cuts with `next_index(bit_length)` and exchanges the half-open
/// range `min..max`. Equal cuts exchange nothing.
pub fn two_point<T, R: RandomSource>(
    x: &mut Individual<T>,
    y: &mut Individual<T>,
    rng: &mut R,
) -> GaResult<()> {
    let len = x.genotype().bit_length();
    let p = rng.next_index(len);
    let q = rng.next_index(len);
    let mask = Mask::with_range(len, p.min(q), p.max(q))?;
    Individual::swap(x, y, &mask)?;
    Ok(())
}

/// Uniform crossover: one `next_bool` draw per bit selects it for exchange.
pub fn uniform<T, R: RandomSource>(
    x: &mut Individual<T>,
    y: &mut Individual<T>,
    rng: &mut R,
) -> GaResult<()> {
    let mut mask = x.genotype().mask();
    for i in 0..mask.len() {
        if rng.next_bool() {
            mask.set(i)?;
        }
    }
    Individual::swap(x, y, &mask)?;
    Ok(())
}
