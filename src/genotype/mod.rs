//! Segmented bit-string genotypes.
//!
//! A [`GenoType`] is one flat bit string cut into fixed-width loci by a shared
//! [`Layout`]. Loci are read back as booleans, raw bits, unsigned integers,
//! IEEE-754 doubles or linearly scaled reals.
//!
//! # Bit order
//!
//! Bit `j` of locus `i` lives at absolute index `offset[i] + j` and is bit `j`
//! (least significant first) of [`GenoType::get_long`]. The [`Display`]
//! rendering prints each locus most significant bit first, loci separated by
//! single spaces:
//!
//! ```
//! use u_bitga::genotype::GenoType;
//!
//! let mut g = GenoType::from_widths(&[4, 4]).unwrap();
//! g.set_long(0, 0b0011).unwrap();
//! assert_eq!(g.to_string(), "0011 0000");
//! ```
//!
//! # Mutation
//!
//! A bare genotype has no observer; it mutates through [`invert`],
//! [`swap`] and the typed setters, each of which reports whether the bit
//! string changed. Once wrapped in an [`Individual`], the genotype is only
//! reachable immutably and every mutation goes through the individual, which
//! invalidates its caches.
//!
//! [`Display`]: std::fmt::Display
//! [`invert`]: GenoType::invert
//! [`swap`]: GenoType::swap
//! [`Individual`]: crate::individual::Individual

mod layout;
mod mask;

pub use layout::{Layout, LayoutBuilder};
pub use mask::Mask;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{check_index, check_probability, GaError, GaResult};
use crate::random::RandomSource;

/// Fixed-layout bit string.
///
/// Cloning shares the layout by reference and deep-copies the bits.
#[derive(Clone)]
pub struct GenoType {
    layout: Arc<Layout>,
    bits: Vec<u64>,
}

impl GenoType {
    /// Creates a zero-valued genotype on `layout`.
    pub fn new(layout: Arc<Layout>) -> Self {
        let words = layout.bit_length().div_ceil(64);
        Self {
            layout,
            bits: vec![0; words],
        }
    }

    /// Creates a zero-valued genotype from locus widths.
    pub fn from_widths(widths: &[usize]) -> GaResult<Self> {
        Ok(Self::new(Layout::new(widths)?))
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Number of loci.
    pub fn loci_count(&self) -> usize {
        self.layout.loci_count()
    }

    /// Total number of bits.
    pub fn bit_length(&self) -> usize {
        self.layout.bit_length()
    }

    /// Bit width of locus `i`.
    pub fn width(&self, i: usize) -> GaResult<usize> {
        self.layout.width(i)
    }

    /// An empty mask sized to this genotype.
    pub fn mask(&self) -> Mask {
        Mask::new(self.bit_length())
    }

    /// Returns `true` if both genotypes have identical locus widths.
    pub fn equals_schema(&self, other: &GenoType) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout) || self.layout == other.layout
    }

    /// Absolute bit at `index`.
    pub fn bit(&self, index: usize) -> GaResult<bool> {
        check_index("bit index", index, self.bit_length())?;
        Ok(self.get_raw(index))
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Value of a 1-bit locus.
    pub fn get_bool(&self, i: usize) -> GaResult<bool> {
        let (start, _) = self.span_exact(i, 1, "locus must be 1 bit")?;
        Ok(self.get_raw(start))
    }

    /// Bits of locus `i`, least significant first.
    pub fn get_bits(&self, i: usize) -> GaResult<Vec<bool>> {
        let (start, end) = self.layout.span(i)?;
        Ok((start..end).map(|b| self.get_raw(b)).collect())
    }

    /// Unsigned value of locus `i`.
    ///
    /// # Errors
    /// [`GaError::InvalidAccess`] if the locus is wider than 64 bits.
    pub fn get_long(&self, i: usize) -> GaResult<u64> {
        let (start, end) = self.span_at_most_64(i)?;
        Ok(self.read_word(start, end - start))
    }

    /// Locus `i` reinterpreted as an IEEE-754 double.
    ///
    /// # Errors
    /// [`GaError::InvalidAccess`] unless the locus is exactly 64 bits.
    pub fn get_double(&self, i: usize) -> GaResult<f64> {
        let (start, _) = self.span_exact(i, 64, "locus must be 64 bits")?;
        Ok(f64::from_bits(self.read_word(start, 64)))
    }

    /// Locus `i` mapped linearly onto `[min, max]`:
    /// `min + value / (2^width - 1) * (max - min)`.
    pub fn get_scaled(&self, i: usize, min: f64, max: f64) -> GaResult<f64> {
        let (start, end) = self.span_at_most_64(i)?;
        let width = end - start;
        let resolution = 2f64.powi(width as i32) - 1.0;
        Ok(min + self.read_word(start, width) as f64 / resolution * (max - min))
    }

    /// Sets a 1-bit locus. Returns `true` if the bit string changed.
    pub fn set_bool(&mut self, i: usize, value: bool) -> GaResult<bool> {
        let (start, _) = self.span_exact(i, 1, "locus must be 1 bit")?;
        let changed = self.get_raw(start) != value;
        self.put_raw(start, value);
        Ok(changed)
    }

    /// Sets locus `i` from bits given least significant first.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `value` does not match the locus width.
    pub fn set_bits(&mut self, i: usize, value: &[bool]) -> GaResult<bool> {
        let (start, end) = self.layout.span(i)?;
        if value.len() != end - start {
            return Err(GaError::InvalidArgument(format!(
                "locus {i} is {} bits, got {}",
                end - start,
                value.len()
            )));
        }
        let mut changed = false;
        for (b, &v) in (start..end).zip(value) {
            changed |= self.get_raw(b) != v;
            self.put_raw(b, v);
        }
        Ok(changed)
    }

    /// Sets the unsigned value of locus `i`.
    ///
    /// # Errors
    /// [`GaError::InvalidAccess`] if the locus is wider than 64 bits,
    /// [`GaError::InvalidArgument`] if `value` does not fit the width.
    pub fn set_long(&mut self, i: usize, value: u64) -> GaResult<bool> {
        let (start, end) = self.span_at_most_64(i)?;
        let width = end - start;
        if width < 64 && value >> width != 0 {
            return Err(GaError::InvalidArgument(format!(
                "value {value} does not fit in {width} bits"
            )));
        }
        let changed = self.read_word(start, width) != value;
        for j in 0..width {
            self.put_raw(start + j, (value >> j) & 1 == 1);
        }
        Ok(changed)
    }

    /// Stores the bit pattern of `value` into a 64-bit locus.
    pub fn set_double(&mut self, i: usize, value: f64) -> GaResult<bool> {
        self.span_exact(i, 64, "locus must be 64 bits")?;
        self.set_long(i, value.to_bits())
    }

    /// Flips every bit selected by `mask`.
    ///
    /// Returns `true` if any bit flipped, which is exactly when the mask is
    /// non-empty.
    pub fn invert(&mut self, mask: &Mask) -> GaResult<bool> {
        self.check_mask(mask)?;
        if mask.is_empty() {
            return Ok(false);
        }
        for (word, m) in self.bits.iter_mut().zip(mask.words()) {
            *word ^= m;
        }
        Ok(true)
    }

    /// Exchanges the bits selected by `mask` between `a` and `b`.
    ///
    /// Returns `true` if either bit string changed, i.e. some selected bit
    /// differed between the two.
    ///
    /// # Errors
    /// [`GaError::IncompatibleSchema`] if the layouts differ.
    pub fn swap(a: &mut GenoType, b: &mut GenoType, mask: &Mask) -> GaResult<bool> {
        if !a.equals_schema(b) {
            return Err(GaError::IncompatibleSchema {
                left: a.layout.widths(),
                right: b.layout.widths(),
            });
        }
        a.check_mask(mask)?;
        let mut changed = false;
        for ((x, y), m) in a.bits.iter_mut().zip(b.bits.iter_mut()).zip(mask.words()) {
            let diff = (*x ^ *y) & m;
            changed |= diff != 0;
            *x ^= diff;
            *y ^= diff;
        }
        Ok(changed)
    }

    /// Flips each bit independently with probability `rate`, one
    /// `next_f64` draw per bit in index order.
    pub fn mutate<R: RandomSource>(&mut self, rng: &mut R, rate: f64) -> GaResult<bool> {
        check_probability("mutation rate", rate)?;
        let mut mask = self.mask();
        for i in 0..mask.len() {
            if rng.next_f64() < rate {
                mask.set(i)?;
            }
        }
        self.invert(&mask)
    }

    /// Sets each bit from one `next_bool` draw, in index order.
    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) -> GaResult<bool> {
        let mut mask = self.mask();
        for i in 0..mask.len() {
            if rng.next_bool() {
                mask.set(i)?;
            }
        }
        self.invert(&mask)
    }

    fn check_mask(&self, mask: &Mask) -> GaResult<()> {
        if mask.len() != self.bit_length() {
            return Err(GaError::InvalidArgument(format!(
                "mask length {} does not match bit length {}",
                mask.len(),
                self.bit_length()
            )));
        }
        Ok(())
    }

    fn span_exact(&self, i: usize, width: usize, reason: &'static str) -> GaResult<(usize, usize)> {
        let (start, end) = self.layout.span(i)?;
        if end - start != width {
            return Err(GaError::InvalidAccess {
                locus: i,
                width: end - start,
                reason,
            });
        }
        Ok((start, end))
    }

    fn span_at_most_64(&self, i: usize) -> GaResult<(usize, usize)> {
        let (start, end) = self.layout.span(i)?;
        if end - start > 64 {
            return Err(GaError::InvalidAccess {
                locus: i,
                width: end - start,
                reason: "locus must be 64 bits or less",
            });
        }
        Ok((start, end))
    }

    fn get_raw(&self, index: usize) -> bool {
        (self.bits[index / 64] >> (index % 64)) & 1 == 1
    }

    fn put_raw(&mut self, index: usize, value: bool) {
        let bit = 1u64 << (index % 64);
        if value {
            self.bits[index / 64] |= bit;
        } else {
            self.bits[index / 64] &= !bit;
        }
    }

    /// Reads `width` (1..=64) bits starting at `start` as an integer.
    fn read_word(&self, start: usize, width: usize) -> u64 {
        let word = start / 64;
        let shift = start % 64;
        let mut value = self.bits[word] >> shift;
        if shift + width > 64 {
            value |= self.bits[word + 1] << (64 - shift);
        }
        if width < 64 {
            value &= (1u64 << width) - 1;
        }
        value
    }
}

/// Equal when the layouts match and the bit strings are identical.
impl PartialEq for GenoType {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && self.equals_schema(other)
    }
}

impl Eq for GenoType {}

/// Hashes bit-string content only; trailing zero words are skipped so that
/// equal content under different layouts collides.
impl Hash for GenoType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let used = self
            .bits
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |last| last + 1);
        self.bits[..used].hash(state);
    }
}

impl fmt::Display for GenoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offsets = self.layout.offsets();
        for (i, w) in offsets.windows(2).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            for b in (w[0]..w[1]).rev() {
                f.write_str(if self.get_raw(b) { "1" } else { "0" })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GenoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GenoType").field(&self.to_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Lcg48;
    use std::collections::hash_map::DefaultHasher;

    fn quad() -> GenoType {
        Layout::builder().append_repeated(4, 8).inflate().unwrap()
    }

    fn hash_of(g: &GenoType) -> u64 {
        let mut h = DefaultHasher::new();
        g.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_seeded_layout_fixture() {
        let mut rng = Lcg48::new(42342352);
        let mut g = Layout::builder().append(8).append(34).inflate().unwrap();
        g.randomize(&mut rng).unwrap();

        assert_eq!(g.loci_count(), 2);
        assert_eq!(g.bit_length(), 42);
        assert_eq!(g.width(0).unwrap(), 8);
        assert_eq!(g.width(1).unwrap(), 34);
        assert_eq!(g.to_string(), "10111001 0101001101111101000111010011101101");
        assert_eq!(g.get_long(0).unwrap(), 185);
        assert_eq!(g.get_long(1).unwrap(), 5602833645);
        assert_eq!(
            g.get_bits(0).unwrap(),
            vec![true, false, false, true, true, true, false, true]
        );
    }

    #[test]
    fn test_randomize_fixture() {
        let original = quad();
        let mut rng = Lcg48::new(343129087);
        let mut p = original.clone();
        p.randomize(&mut rng).unwrap();
        assert_eq!(original.to_string(), "0000 0000 0000 0000 0000 0000 0000 0000");
        assert_eq!(p.to_string(), "1110 0010 0000 1111 0001 1110 1010 1100");
    }

    #[test]
    fn test_mutate_fixture() {
        let zero = quad();
        let mut rng = Lcg48::new(59034);

        let mut p = zero.clone();
        assert!(!p.mutate(&mut rng, 0.0).unwrap());
        assert_eq!(p.to_string(), "0000 0000 0000 0000 0000 0000 0000 0000");

        let mut q = zero.clone();
        assert!(q.mutate(&mut rng, 0.1).unwrap());
        assert_eq!(q.to_string(), "0010 0001 0000 0000 0000 0100 0000 0000");
        assert_eq!(q.count_ones(), 3);

        let mut r = zero.clone();
        r.mutate(&mut rng, 0.5).unwrap();
        assert_eq!(r.to_string(), "1011 1100 1000 1111 1001 1110 1111 0100");

        let mut s = zero.clone();
        s.mutate(&mut rng, 1.0).unwrap();
        assert_eq!(s.to_string(), "1111 1111 1111 1111 1111 1111 1111 1111");
        assert_eq!(s.count_ones(), 32);
    }

    #[test]
    fn test_mutate_rejects_bad_rate() {
        let mut g = quad();
        let mut rng = Lcg48::new(1);
        for rate in [f64::NAN, -f64::MIN_POSITIVE, 1.000000001] {
            assert!(matches!(
                g.mutate(&mut rng, rate),
                Err(GaError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_swap_fixture() {
        let base = quad();
        let mut rng = Lcg48::new(4329);
        let mut a = base.clone();
        let mut b = base.clone();
        a.randomize(&mut rng).unwrap();
        b.randomize(&mut rng).unwrap();
        assert_eq!(a.to_string(), "1110 0001 0101 1000 1011 1111 1101 1111");
        assert_eq!(b.to_string(), "1110 0101 1100 0101 0011 1011 0011 0010");

        let mask = Mask::with_range(32, 6, 22).unwrap();
        assert!(GenoType::swap(&mut a, &mut b, &mask).unwrap());
        assert_eq!(a.to_string(), "1110 0101 1100 0101 0011 1111 1101 1111");
        assert_eq!(b.to_string(), "1110 0001 0101 1000 1011 1011 0011 0010");
    }

    #[test]
    fn test_swap_incompatible_schema() {
        let mut a = Layout::builder().append_repeated(4, 8).inflate().unwrap();
        let mut b = Layout::builder().append_repeated(4, 9).inflate().unwrap();
        let mask = Mask::with_range(32, 0, 1).unwrap();
        assert!(matches!(
            GenoType::swap(&mut a, &mut b, &mask),
            Err(GaError::IncompatibleSchema { .. })
        ));
    }

    #[test]
    fn test_swap_equal_bits_reports_unchanged() {
        let mut a = quad();
        let mut b = quad();
        let mask = Mask::with_range(32, 0, 32).unwrap();
        assert!(!GenoType::swap(&mut a, &mut b, &mask).unwrap());
    }

    #[test]
    fn test_mask_length_mismatch() {
        let mut g = quad();
        assert!(matches!(
            g.invert(&Mask::new(31)),
            Err(GaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut c = quad();
        let copy = c.clone();
        assert_eq!(c, copy);
        assert!(Arc::ptr_eq(c.layout(), copy.layout()));

        let mut mask = c.mask();
        mask.set(0).unwrap();
        assert!(c.invert(&mask).unwrap());
        assert_ne!(c.to_string(), copy.to_string());
        assert!(c.equals_schema(&copy));
    }

    #[test]
    fn test_empty_invert_is_noop() {
        let mut g = quad();
        let before = g.clone();
        assert!(!g.invert(&g.mask()).unwrap());
        assert_eq!(g, before);
    }

    #[test]
    fn test_schema_from_separate_builds() {
        let a = Layout::builder().append_repeated(4, 8).inflate().unwrap();
        let b = GenoType::from_widths(&[4; 8]).unwrap();
        assert!(!Arc::ptr_eq(a.layout(), b.layout()));
        assert!(a.equals_schema(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_content_different_schema() {
        let mut a = GenoType::from_widths(&[8]).unwrap();
        let mut b = GenoType::from_widths(&[4, 4]).unwrap();
        a.set_long(0, 0b0001_0011).unwrap();
        b.set_long(0, 0b0011).unwrap();
        b.set_long(1, 0b0001).unwrap();
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = GenoType::from_widths(&[100]).unwrap();
        let d = GenoType::from_widths(&[3]).unwrap();
        assert_eq!(hash_of(&c), hash_of(&d));
    }

    #[test]
    fn test_get_bool() {
        let mut g = GenoType::from_widths(&[1, 2]).unwrap();
        assert!(!g.get_bool(0).unwrap());
        assert!(g.set_bool(0, true).unwrap());
        assert!(!g.set_bool(0, true).unwrap());
        assert!(g.get_bool(0).unwrap());
        assert!(matches!(
            g.get_bool(1),
            Err(GaError::InvalidAccess { locus: 1, width: 2, .. })
        ));
    }

    #[test]
    fn test_get_long_capacity() {
        let g = GenoType::from_widths(&[64]).unwrap();
        assert_eq!(g.get_long(0).unwrap(), 0);
        let g = GenoType::from_widths(&[65]).unwrap();
        assert!(matches!(
            g.get_long(0),
            Err(GaError::InvalidAccess { width: 65, .. })
        ));
    }

    #[test]
    fn test_long_across_word_boundary() {
        let mut g = GenoType::from_widths(&[60, 40, 64]).unwrap();
        g.set_long(1, 0xAB_CDEF_0123).unwrap();
        g.set_long(2, u64::MAX - 5).unwrap();
        assert_eq!(g.get_long(0).unwrap(), 0);
        assert_eq!(g.get_long(1).unwrap(), 0xAB_CDEF_0123);
        assert_eq!(g.get_long(2).unwrap(), u64::MAX - 5);
    }

    #[test]
    fn test_set_long_rejects_overflow() {
        let mut g = GenoType::from_widths(&[4]).unwrap();
        assert!(matches!(
            g.set_long(0, 16),
            Err(GaError::InvalidArgument(_))
        ));
        assert!(g.set_long(0, 15).unwrap());
        assert!(!g.set_long(0, 15).unwrap());
    }

    #[test]
    fn test_double_round_trip() {
        let mut g = GenoType::from_widths(&[64]).unwrap();
        g.set_long(0, 0xCA4D_7924_6A6F_720F).unwrap();
        assert_eq!(
            g.to_string(),
            "1100101001001101011110010010010001101010011011110111001000001111"
        );
        assert_eq!(
            g.get_double(0).unwrap().to_bits(),
            f64::from_bits(0xCA4D_7924_6A6F_720F).to_bits()
        );

        g.set_double(0, -1.5).unwrap();
        assert_eq!(g.get_double(0).unwrap(), -1.5);
        assert_eq!(g.get_long(0).unwrap(), (-1.5f64).to_bits());
    }

    #[test]
    fn test_double_requires_64_bits() {
        for width in [63, 65] {
            let mut g = GenoType::from_widths(&[width]).unwrap();
            assert!(matches!(
                g.get_double(0),
                Err(GaError::InvalidAccess { .. })
            ));
            assert!(matches!(
                g.set_double(0, 1.0),
                Err(GaError::InvalidAccess { .. })
            ));
        }
    }

    #[test]
    fn test_get_scaled() {
        let mut g = GenoType::from_widths(&[22]).unwrap();
        assert_eq!(g.get_scaled(0, -1.0, 2.0).unwrap(), -1.0);
        g.set_long(0, (1 << 22) - 1).unwrap();
        assert!((g.get_scaled(0, -1.0, 2.0).unwrap() - 2.0).abs() < 1e-12);

        let mut g = GenoType::from_widths(&[2]).unwrap();
        g.set_long(0, 1).unwrap();
        assert!((g.get_scaled(0, 0.0, 3.0).unwrap() - 1.0).abs() < 1e-12);

        let g = GenoType::from_widths(&[65]).unwrap();
        assert!(matches!(
            g.get_scaled(0, 0.0, 1.0),
            Err(GaError::InvalidAccess { .. })
        ));
    }

    #[test]
    fn test_set_bits() {
        let mut g = GenoType::from_widths(&[3, 5]).unwrap();
        assert!(g.set_bits(1, &[true, false, true, false, false]).unwrap());
        assert_eq!(g.get_long(1).unwrap(), 0b00101);
        assert_eq!(g.to_string(), "000 00101");
        assert!(matches!(
            g.set_bits(0, &[true]),
            Err(GaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_locus_out_of_range() {
        let g = quad();
        assert!(matches!(g.get_long(8), Err(GaError::OutOfRange { .. })));
        assert!(matches!(g.width(8), Err(GaError::OutOfRange { .. })));
        assert!(matches!(g.bit(32), Err(GaError::OutOfRange { .. })));
    }

    #[test]
    fn test_wide_locus_rendering() {
        let mut g = GenoType::from_widths(&[70, 2]).unwrap();
        let mut mask = g.mask();
        mask.set(69).unwrap();
        mask.set(0).unwrap();
        mask.set(70).unwrap();
        g.invert(&mask).unwrap();
        let rendered = g.to_string();
        let expected = format!("1{}1 01", "0".repeat(68));
        assert_eq!(rendered, expected);
    }
}
