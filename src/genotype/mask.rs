//! Bit-index selection sets.

use std::fmt;

use crate::error::{check_index, GaError, GaResult};

/// A set of absolute bit positions, fixed to the bit length of the
/// genotype(s) it is applied to.
///
/// Masks select which bits take part in [`GenoType::invert`] and
/// [`GenoType::swap`]. They carry no reference to any genotype.
///
/// [`GenoType::invert`]: super::GenoType::invert
/// [`GenoType::swap`]: super::GenoType::swap
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    len: usize,
    words: Vec<u64>,
}

impl Mask {
    /// Creates an empty mask over `len` bit positions.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(64)],
        }
    }

    /// Creates a mask with every position in `from..to` selected.
    pub fn with_range(len: usize, from: usize, to: usize) -> GaResult<Self> {
        let mut mask = Self::new(len);
        mask.set_range(from, to)?;
        Ok(mask)
    }

    /// Number of positions the mask ranges over.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no position is selected.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of selected positions.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns whether `index` is selected.
    pub fn get(&self, index: usize) -> GaResult<bool> {
        check_index("bit index", index, self.len)?;
        Ok((self.words[index / 64] >> (index % 64)) & 1 == 1)
    }

    /// Selects `index`.
    pub fn set(&mut self, index: usize) -> GaResult<()> {
        check_index("bit index", index, self.len)?;
        self.words[index / 64] |= 1 << (index % 64);
        Ok(())
    }

    /// Deselects `index`.
    pub fn clear(&mut self, index: usize) -> GaResult<()> {
        check_index("bit index", index, self.len)?;
        self.words[index / 64] &= !(1 << (index % 64));
        Ok(())
    }

    /// Toggles `index`.
    pub fn flip(&mut self, index: usize) -> GaResult<()> {
        check_index("bit index", index, self.len)?;
        self.words[index / 64] ^= 1 << (index % 64);
        Ok(())
    }

    /// Selects every position in `from..to`. An empty range is a no-op.
    pub fn set_range(&mut self, from: usize, to: usize) -> GaResult<()> {
        self.apply_range(from, to, |w, m| *w |= m)
    }

    /// Deselects every position in `from..to`.
    pub fn clear_range(&mut self, from: usize, to: usize) -> GaResult<()> {
        self.apply_range(from, to, |w, m| *w &= !m)
    }

    /// Toggles every position in `from..to`.
    pub fn flip_range(&mut self, from: usize, to: usize) -> GaResult<()> {
        self.apply_range(from, to, |w, m| *w ^= m)
    }

    /// Deselects every position.
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Iterates selected positions in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(wi * 64 + bit)
            })
        })
    }

    /// Lowest selected position at or after `from`.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        self.iter_ones().find(|&i| i >= from)
    }

    /// Backing words, least significant position first.
    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    fn apply_range(
        &mut self,
        from: usize,
        to: usize,
        op: impl Fn(&mut u64, u64),
    ) -> GaResult<()> {
        if from > to || to > self.len {
            return Err(GaError::InvalidArgument(format!(
                "bit range {from}..{to} outside mask of length {}",
                self.len
            )));
        }
        let mut i = from;
        while i < to {
            let word = i / 64;
            let lo = i % 64;
            let hi = (to - word * 64).min(64);
            let bits = if hi - lo == 64 {
                u64::MAX
            } else {
                ((1u64 << (hi - lo)) - 1) << lo
            };
            op(&mut self.words[word], bits);
            i = word * 64 + hi;
        }
        Ok(())
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Renders as `{i, j, ...}`, the selected positions in ascending order.
impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, i) in self.iter_ones().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{i}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mask_is_empty() {
        let mask = Mask::new(100);
        assert_eq!(mask.len(), 100);
        assert!(mask.is_empty());
        assert_eq!(mask.count_ones(), 0);
        assert_eq!(mask.to_string(), "{}");
    }

    #[test]
    fn test_set_get_clear_flip() {
        let mut mask = Mask::new(70);
        mask.set(0).unwrap();
        mask.set(69).unwrap();
        assert!(mask.get(0).unwrap());
        assert!(mask.get(69).unwrap());
        assert!(!mask.get(1).unwrap());

        mask.clear(0).unwrap();
        assert!(!mask.get(0).unwrap());
        mask.flip(5).unwrap();
        mask.flip(69).unwrap();
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut mask = Mask::new(8);
        assert!(matches!(mask.set(8), Err(GaError::OutOfRange { .. })));
        assert!(matches!(mask.get(100), Err(GaError::OutOfRange { .. })));
    }

    #[test]
    fn test_set_range_across_words() {
        let mut mask = Mask::new(200);
        mask.set_range(60, 130).unwrap();
        assert_eq!(mask.count_ones(), 70);
        assert!(!mask.get(59).unwrap());
        assert!(mask.get(60).unwrap());
        assert!(mask.get(64).unwrap());
        assert!(mask.get(128).unwrap());
        assert!(mask.get(129).unwrap());
        assert!(!mask.get(130).unwrap());
    }

    #[test]
    fn test_full_word_range() {
        let mut mask = Mask::new(128);
        mask.set_range(0, 128).unwrap();
        assert_eq!(mask.count_ones(), 128);
        mask.clear_range(64, 128).unwrap();
        assert_eq!(mask.count_ones(), 64);
        mask.flip_range(0, 128).unwrap();
        assert_eq!(mask.iter_ones().next(), Some(64));
        assert_eq!(mask.count_ones(), 64);
    }

    #[test]
    fn test_empty_and_invalid_ranges() {
        let mut mask = Mask::new(32);
        mask.set_range(7, 7).unwrap();
        assert!(mask.is_empty());
        mask.set_range(32, 32).unwrap();
        assert!(mask.is_empty());
        assert!(matches!(
            mask.set_range(5, 4),
            Err(GaError::InvalidArgument(_))
        ));
        assert!(matches!(
            mask.set_range(0, 33),
            Err(GaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_with_range_and_display() {
        let mask = Mask::with_range(32, 6, 9).unwrap();
        assert_eq!(mask.to_string(), "{6, 7, 8}");
        assert_eq!(mask.next_set_bit(0), Some(6));
        assert_eq!(mask.next_set_bit(8), Some(8));
        assert_eq!(mask.next_set_bit(9), None);
    }

    #[test]
    fn test_clear_all() {
        let mut mask = Mask::with_range(10, 0, 10).unwrap();
        mask.clear_all();
        assert!(mask.is_empty());
        assert_eq!(mask.len(), 10);
    }
}
