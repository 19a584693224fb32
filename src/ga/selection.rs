//! Selection strategies for plans.
//!
//! Both strategies work on a candidate list already sorted best first (the
//! slice handed to [`GaPlan::apply_selection`](super::GaPlan::apply_selection))
//! and return indices into it. An index may appear more than once; the
//! engine clones repeated picks when it installs the next generation.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use crate::error::{GaError, GaResult};
use crate::random::RandomSource;

/// Selection strategy over a sorted candidate list.
///
/// # Examples
///
/// ```
/// use u_bitga::ga::Selection;
/// use u_bitga::random::Lcg48;
///
/// let sorted = ["best", "good", "bad"];
/// let mut rng = Lcg48::new(1);
///
/// let elite = Selection::Elite.select(&sorted, &mut rng, 2).unwrap();
/// assert_eq!(elite, vec![0, 1]);
///
/// let winners = Selection::Tournament(2).select(&sorted, &mut rng, 3).unwrap();
/// assert_eq!(winners.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The first `n` candidates. Draws nothing from the random source.
    Elite,

    /// `n` tournaments of `k` uniform draws with replacement; each winner is
    /// the best drawn candidate.
    ///
    /// - k=1: pure random selection
    /// - k=2: light pressure
    /// - k>5: strong pressure (risk of premature convergence)
    Tournament(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

impl Selection {
    /// Picks `n` indices into `sorted`.
    ///
    /// # Errors
    /// [`GaError::InvalidArgument`] if `n` is not in `1..=sorted.len()`, or
    /// a tournament size is zero.
    pub fn select<T, R: RandomSource>(
        &self,
        sorted: &[T],
        rng: &mut R,
        n: usize,
    ) -> GaResult<Vec<usize>> {
        match self {
            Selection::Elite => select_elite(sorted, n),
            Selection::Tournament(k) => select_tournament(sorted, rng, n, *k),
        }
    }
}

/// Top-`n` selection: indices `0..n` of a list sorted best first.
pub fn select_elite<T>(sorted: &[T], n: usize) -> GaResult<Vec<usize>> {
    check_count(n, sorted.len())?;
    Ok((0..n).collect())
}

/// Tournament selection.
///
/// Each of the `n` winners is the lowest index among `k` draws of
/// `next_index(sorted.len())`. Since `sorted` is ordered best first, the
/// lowest index is the fittest contestant.
pub fn select_tournament<T, R: RandomSource>(
    sorted: &[T],
    rng: &mut R,
    n: usize,
    k: usize,
) -> GaResult<Vec<usize>> {
    check_count(n, sorted.len())?;
    if k < 1 {
        return Err(GaError::InvalidArgument(
            "tournament size must be at least 1".into(),
        ));
    }
    let size = sorted.len();
    let winners = (0..n)
        .map(|_| {
            let mut best = rng.next_index(size);
            for _ in 1..k {
                best = best.min(rng.next_index(size));
            }
            best
        })
        .collect();
    Ok(winners)
}

fn check_count(n: usize, available: usize) -> GaResult<()> {
    if n < 1 || n > available {
        return Err(GaError::InvalidArgument(format!(
            "cannot select {n} of {available} candidates"
        )));
    }
    Ok(())
}
