//! Serial back-substitution, run only at the root once the gather has
//! produced a full upper-triangular `res_A`/`res_b`. Distributed
//! back-substitution is an explicit non-goal (`SPEC_FULL.md` §1).

/// Solves the upper-triangular system `res_a * x = res_b` for `x`.
///
/// # Panics
///
/// Panics if any diagonal entry used as a divisor is not finite-checked by
/// the caller; per `SPEC_FULL.md` §7, a zero pivot is a caller responsibility,
/// not a condition this routine detects.
pub fn solve(res_a: &[f64], res_b: &[f64], n: usize) -> Vec<f64> {
    debug_assert_eq!(res_a.len(), n * n);
    debug_assert_eq!(res_b.len(), n);

    let mut x = vec![0.0_f64; n];
    x[n - 1] = res_b[n - 1] / res_a[(n - 1) * n + (n - 1)];
    for i in (0..n - 1).rev() {
        let mut sum = res_b[i];
        for j in i + 1..n {
            sum -= res_a[i * n + j] * x[j];
        }
        x[i] = sum / res_a[i * n + i];
    }
    x
}
