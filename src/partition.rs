//! Deterministic mapping from global row indices to owning participants.
//!
//! The partition is a contiguous block split with the remainder spread over
//! the first `rem` participants, each of which gets one extra row. Everything
//! here is a pure function of `(n, size)`; the three scalars that drive the
//! owner arithmetic (`base`, `rem`, `threshold`) are precomputed once in
//! [`Partitioner::new`] and kept as plain fields rather than arrayized, since
//! `owner_of` runs once per global pivot in the elimination loop's hot path.

/// Row-to-participant mapping for a system of order `n` split across `size` participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partitioner {
    n: usize,
    size: usize,
    base: usize,
    rem: usize,
    threshold: usize,
}

impl Partitioner {
    /// Builds the partitioner for a system of order `n` over `size` participants.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or `n` is zero; both are caller-validated
    /// configuration invariants, not runtime conditions.
    pub fn new(n: usize, size: usize) -> Self {
        assert!(size > 0, "participant count must be positive");
        assert!(n > 0, "system order must be positive");
        let base = n / size;
        let rem = n % size;
        let threshold = (base + 1) * rem;
        Self { n, size, base, rem, threshold }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of rows owned by participant `r`.
    pub fn rows_of(&self, r: usize) -> usize {
        self.base + usize::from(r < self.rem)
    }

    /// Global index of the first row owned by participant `r`.
    pub fn start_of(&self, r: usize) -> usize {
        if r < self.rem {
            r * (self.base + 1)
        } else {
            self.rem * (self.base + 1) + (r - self.rem) * self.base
        }
    }

    /// The participant owning global row `p`.
    pub fn owner_of(&self, p: usize) -> usize {
        if p < self.threshold {
            p / (self.base + 1)
        } else {
            self.rem + (p - self.threshold) / self.base
        }
    }

    /// Local row index of global row `p`, which must be owned by `r` — used by
    /// the elimination engine to index into its own stripe once it has found
    /// the pivot's owner via [`Self::owner_of`].
    pub fn local_of(&self, p: usize, r: usize) -> usize {
        p - self.start_of(r)
    }

    /// Per-participant row counts, in rank order — the basis for scatter/gather
    /// counts in [`crate::gather`].
    pub fn counts(&self) -> Vec<usize> {
        (0..self.size).map(|r| self.rows_of(r)).collect()
    }
}
