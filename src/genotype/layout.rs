//! Locus layouts.
//!
//! A [`Layout`] is the immutable part of a genotype: the ordered locus widths
//! and their precomputed bit offsets. Genotypes share it by reference
//! (`Arc`); only the bit string is copied.

use std::sync::Arc;

use crate::error::{check_index, GaError, GaResult};

/// Ordered locus widths with precomputed offsets.
///
/// `offsets` has one entry per locus plus a trailing one; locus `i` spans
/// bits `offsets[i]..offsets[i + 1]` and the last entry is the bit length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    offsets: Vec<usize>,
}

impl Layout {
    /// Builds a layout from locus widths.
    ///
    /// # Errors
    /// [`GaError::InvalidLayout`] if `widths` is empty or contains a zero.
    pub fn new(widths: &[usize]) -> GaResult<Arc<Self>> {
        if widths.is_empty() {
            return Err(GaError::InvalidLayout("no locus widths given".into()));
        }
        let mut offsets = Vec::with_capacity(widths.len() + 1);
        offsets.push(0);
        let mut head = 0usize;
        for (i, &width) in widths.iter().enumerate() {
            if width < 1 {
                return Err(GaError::InvalidLayout(format!(
                    "locus {i} has width {width}, must be at least 1"
                )));
            }
            head = head.checked_add(width).ok_or_else(|| {
                GaError::InvalidLayout("total bit length overflows".into())
            })?;
            offsets.push(head);
        }
        Ok(Arc::new(Self { offsets }))
    }

    /// Starts a [`LayoutBuilder`].
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    /// Number of loci.
    pub fn loci_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of bits.
    pub fn bit_length(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Offsets, one per locus plus the trailing bit length.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Bit width of locus `i`.
    pub fn width(&self, i: usize) -> GaResult<usize> {
        check_index("locus", i, self.loci_count())?;
        Ok(self.offsets[i + 1] - self.offsets[i])
    }

    /// Locus widths in order.
    pub fn widths(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Absolute bit range `start..end` of locus `i`.
    pub(crate) fn span(&self, i: usize) -> GaResult<(usize, usize)> {
        check_index("locus", i, self.loci_count())?;
        Ok((self.offsets[i], self.offsets[i + 1]))
    }
}

/// Accumulates locus widths, optionally repeated.
///
/// Validation is deferred to [`build`](Self::build) /
/// [`inflate`](Self::inflate), so calls chain without `?`.
///
/// ```
/// use u_bitga::genotype::Layout;
///
/// let genotype = Layout::builder().append(8).append(34).inflate().unwrap();
/// assert_eq!(genotype.bit_length(), 42);
///
/// let genotype = Layout::builder().append_repeated(4, 8).inflate().unwrap();
/// assert_eq!(genotype.loci_count(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    segments: Vec<(usize, usize)>,
}

impl LayoutBuilder {
    /// Appends one locus of `width` bits.
    pub fn append(self, width: usize) -> Self {
        self.append_repeated(width, 1)
    }

    /// Appends `times` loci of `width` bits each.
    pub fn append_repeated(mut self, width: usize, times: usize) -> Self {
        self.segments.push((width, times));
        self
    }

    /// Validates and freezes the layout.
    ///
    /// # Errors
    /// [`GaError::InvalidLayout`] if nothing was appended, or any width or
    /// repeat count is zero.
    pub fn build(&self) -> GaResult<Arc<Layout>> {
        let mut widths = Vec::new();
        for &(width, times) in &self.segments {
            if times < 1 {
                return Err(GaError::InvalidLayout(format!(
                    "repeat count for width {width} must be at least 1"
                )));
            }
            widths.extend(std::iter::repeat_n(width, times));
        }
        Layout::new(&widths)
    }

    /// Builds a zero-valued genotype on a fresh layout.
    pub fn inflate(&self) -> GaResult<super::GenoType> {
        Ok(super::GenoType::new(self.build()?))
    }
}
