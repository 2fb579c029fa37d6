//! Optional synthetic-problem generator, feature-gated behind
//! `synthetic-generator`. Mirrors `generateLinearSystem` from the historical
//! single-process source: a diagonally dominant matrix with random
//! off-diagonal entries in a caller-supplied range, plus a right-hand side.
//! Never reachable from the production CLI path — for local experimentation
//! and the `demos/` examples only.

use rand::Rng;
use rayon::prelude::*;

/// Builds an `n x n` diagonally dominant matrix with off-diagonal entries
/// drawn uniformly from `[-spread, spread]`, and a right-hand side of all
/// ones scaled by each row's diagonal (so the system is well-conditioned for
/// elimination without pivoting).
///
/// Row generation is parallelized with `rayon`: this is pure local
/// computation outside the elimination engine's single-threaded-per-participant
/// rule, so it is fair game for data parallelism (`SPEC_FULL.md` §4.11).
pub fn generate(n: usize, spread: f64) -> (Vec<f64>, Vec<f64>) {
    let mut a = vec![0.0_f64; n * n];
    a.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        let mut rng = rand::thread_rng();
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = if i == j { 0.0 } else { rng.gen_range(-spread..=spread) };
        }
        let off_diag_sum: f64 = row.iter().map(|v| v.abs()).sum();
        row[i] = off_diag_sum + n as f64; // guarantees diagonal dominance
    });

    let b: Vec<f64> = (0..n)
        .map(|i| (0..n).map(|j| a[i * n + j]).sum::<f64>())
        .collect();

    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_matrix_is_diagonally_dominant() {
        let (a, _) = generate(12, 1.0);
        let n = 12;
        for i in 0..n {
            let diag = a[i * n + i].abs();
            let off_sum: f64 = (0..n).filter(|&j| j != i).map(|j| a[i * n + j].abs()).sum();
            assert!(diag >= off_sum, "row {i} not diagonally dominant: {diag} < {off_sum}");
        }
    }

    #[test]
    fn rhs_matches_row_sums_so_all_ones_is_exact() {
        let (a, b) = generate(6, 0.5);
        let n = 6;
        for i in 0..n {
            let row_sum: f64 = (0..n).map(|j| a[i * n + j]).sum();
            assert!((row_sum - b[i]).abs() < 1e-9);
        }
    }
}
