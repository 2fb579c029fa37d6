//! Reassembles the eliminated stripes of every participant into a single
//! upper-triangular `res_A`/`res_b` at the root, via the transport's
//! variable-stride gather (§4.5). A barrier precedes it so instrumentation can
//! attribute time between pure communication and pipeline idle; correctness
//! does not depend on the barrier.

use crate::partition::Partitioner;
use crate::transport::Transport;
use anyhow::Result;

/// Gathers every participant's local stripe into full `res_A`/`res_b` at `root`.
/// Returns `None` at non-root participants.
pub fn gather<T: Transport>(
    transport: &T,
    partitioner: &Partitioner,
    root: usize,
    local_a: &[f64],
    local_b: &[f64],
) -> Result<Option<(Vec<f64>, Vec<f64>)>> {
    let n = partitioner.n();
    let row_counts = partitioner.counts();
    let element_counts: Vec<usize> = row_counts.iter().map(|&rows| rows * n).collect();

    transport.barrier();

    let gathered_a = transport.gather_rows(root, local_a, &element_counts)?;
    let gathered_b = transport.gather_rows(root, local_b, &row_counts)?;

    match (gathered_a, gathered_b) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        _ => unreachable!("gather_rows must agree on root across both calls"),
    }
}
