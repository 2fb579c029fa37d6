//! The fixed-capacity staging area that batches up to `B` eliminated pivot
//! rows into a single pipelined message.
//!
//! A pivot unit is a row of length `n` followed by its right-hand-side scalar,
//! so one unit occupies `n + 1` doubles. The buffer has no header of its own —
//! occupancy is carried by the length of the slice actually sent or received,
//! per the wire format in `SPEC_FULL.md` §6.

/// Staging buffer for up to `capacity` pivot units of width `n + 1`.
pub struct PivotBuffer {
    n: usize,
    capacity: usize,
    data: Vec<f64>,
}

impl PivotBuffer {
    /// Allocates a buffer for a system of order `n` with room for `capacity` pivot units.
    pub fn new(n: usize, capacity: usize) -> Self {
        assert!(capacity > 0, "pivot buffer capacity must be positive");
        Self { n, capacity, data: vec![0.0; capacity * (n + 1)] }
    }

    fn unit_len(&self) -> usize {
        self.n + 1
    }

    /// Element offset of slot `u` within the flat buffer.
    fn offset(&self, u: usize) -> usize {
        u * self.unit_len()
    }

    /// Writes the row `row` (length `n`) and its rhs scalar into slot `u`.
    pub fn fill(&mut self, u: usize, row: &[f64], rhs: f64) {
        assert!(u < self.capacity, "slot {u} out of range (capacity {})", self.capacity);
        assert_eq!(row.len(), self.n, "pivot row must have length n");
        let off = self.offset(u);
        self.data[off..off + self.n].copy_from_slice(row);
        self.data[off + self.n] = rhs;
    }

    /// The row portion of slot `u`.
    pub fn row(&self, u: usize) -> &[f64] {
        let off = self.offset(u);
        &self.data[off..off + self.n]
    }

    /// The rhs scalar of slot `u`.
    pub fn rhs(&self, u: usize) -> f64 {
        self.data[self.offset(u) + self.n]
    }

    /// The wire-format prefix covering slots `0..occupancy`, ready to send.
    pub fn prefix(&self, occupancy: usize) -> &[f64] {
        &self.data[..occupancy * self.unit_len()]
    }

    /// Loads a received block (a multiple of `n + 1` doubles) into the buffer,
    /// returning the number of pivot units it contained.
    pub fn load(&mut self, block: &[f64]) -> usize {
        let unit_len = self.unit_len();
        assert_eq!(block.len() % unit_len, 0, "block length must be a multiple of n + 1");
        let occupancy = block.len() / unit_len;
        assert!(occupancy <= self.capacity, "received block exceeds buffer capacity");
        self.data[..block.len()].copy_from_slice(block);
        occupancy
    }
}
