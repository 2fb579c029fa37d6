//! The elimination loop: for each global pivot row, a participant either
//! originates the pivot block (it owns the row), relays it (it is downstream
//! of the owner and the block has just arrived), or has already exited
//! (the pivot has descended past its stripe). Whichever applies, the
//! participant then updates every local row still in scope using the pivot.
//!
//! See `SPEC_FULL.md` §4.4 for the full state machine this loop implements.

use crate::partition::Partitioner;
use crate::pivot::PivotBuffer;
use crate::trace::trace;
use crate::transport::Transport;
use anyhow::Result;

/// Runs the pipelined elimination for one participant against its local stripe.
pub struct Engine<'t, T: Transport> {
    transport: &'t T,
    partitioner: Partitioner,
    block_size: usize,
}

impl<'t, T: Transport> Engine<'t, T> {
    pub fn new(transport: &'t T, partitioner: Partitioner, block_size: usize) -> Self {
        Self { transport, partitioner, block_size }
    }

    /// Eliminates in place. `local_a` is `rows_of(rank) * n` row-major doubles,
    /// `local_b` is `rows_of(rank)` doubles.
    pub fn eliminate(&self, local_a: &mut [f64], local_b: &mut [f64]) -> Result<()> {
        let r = self.transport.rank();
        let size = self.transport.size();
        let n = self.partitioner.n();
        let rows_r = self.partitioner.rows_of(r);
        debug_assert_eq!(local_a.len(), rows_r * n);
        debug_assert_eq!(local_b.len(), rows_r);

        let mut buffer = PivotBuffer::new(n, self.block_size);
        // One monotonic tag sequence per sender, per SPEC_FULL §6: every block this
        // participant sends to r+1 draws from `out_tag`, whether it originates here
        // (owner branch) or is only relayed (forward branch). `in_tag` is the mirror
        // counter on the receiving side, from r-1.
        let mut out_tag: u64 = 0;
        let mut in_tag: u64 = 0;

        for p in 0..n.saturating_sub(1) {
            let owner = self.partitioner.owner_of(p);
            if r < owner {
                trace(r, &format!("exit: pivot {p} owned by {owner}, strictly above us in the chain"));
                break;
            }

            let local_pivot_row = self.partitioner.local_of(p, owner);
            let u = local_pivot_row % self.block_size;

            if r == owner {
                let row: Vec<f64> = local_a[local_pivot_row * n..local_pivot_row * n + n].to_vec();
                let rhs = local_b[local_pivot_row];
                buffer.fill(u, &row, rhs);

                let exhausted = local_pivot_row == rows_r - 1;
                if (u == self.block_size - 1 || exhausted) && r < size - 1 {
                    trace(r, &format!("send block tag={out_tag} pivots={}..={p}", p - u));
                    self.transport.send_block(r + 1, buffer.prefix(u + 1), out_tag)?;
                    out_tag += 1;
                }
            } else if u == 0 {
                let block = self.transport.recv_block(r - 1, in_tag)?;
                trace(r, &format!("recv block tag={in_tag} len={}", block.len()));
                buffer.load(&block);
                in_tag += 1;
                if r < size - 1 {
                    trace(r, &format!("forward block tag={out_tag} len={}", block.len()));
                    self.transport.send_block(r + 1, &block, out_tag)?;
                    out_tag += 1;
                }
            }

            let pivot_row = buffer.row(u);
            let pivot = pivot_row[p];
            let b_pivot = buffer.rhs(u);

            let current_row_start = if r == owner { local_pivot_row + 1 } else { 0 };
            for i in current_row_start..rows_r {
                let ratio = local_a[i * n + p] / pivot;
                for j in p..n {
                    local_a[i * n + j] -= ratio * pivot_row[j];
                }
                local_b[i] -= ratio * b_pivot;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::build_channel_transports;
    use std::thread;

    /// With a single participant, the engine reduces to plain serial elimination.
    #[test]
    fn single_participant_upper_triangularizes() {
        let transports = build_channel_transports(1);
        let t = transports.into_iter().next().unwrap();
        let n = 3;
        let partitioner = Partitioner::new(n, 1);
        let engine = Engine::new(&t, partitioner, 20);

        let mut a = vec![2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0];
        let mut b = vec![4.0, 10.0, 24.0];
        engine.eliminate(&mut a, &mut b).unwrap();

        for i in 0..n {
            for j in 0..i {
                assert!(a[i * n + j].abs() < 1e-9, "a[{i},{j}] = {}", a[i * n + j]);
            }
        }
    }

    #[test]
    fn two_participant_pipeline_matches_serial_reference() {
        let n = 4usize;
        let a0 = vec![
            10.0, 1.0, 2.0, 0.0, //
            1.0, 9.0, 0.0, 1.0, //
            2.0, 0.0, 8.0, 1.0, //
            0.0, 1.0, 1.0, 7.0,
        ];
        let b0 = vec![1.0, 2.0, 3.0, 4.0];

        // Serial reference.
        let (ref_a, ref_b) = serial_eliminate(&a0, &b0, n);

        let transports = build_channel_transports(2);
        let partitioner = Partitioner::new(n, 2);
        let results = thread::scope(|s| {
            let handles: Vec<_> = transports
                .into_iter()
                .map(|t| {
                    let a0 = a0.clone();
                    let b0 = b0.clone();
                    let partitioner = partitioner;
                    s.spawn(move || {
                        let r = t.rank();
                        let rows = partitioner.rows_of(r);
                        let start = partitioner.start_of(r);
                        let mut local_a: Vec<f64> =
                            a0[start * n..(start + rows) * n].to_vec();
                        let mut local_b: Vec<f64> = b0[start..start + rows].to_vec();
                        let engine = Engine::new(&t, partitioner, 20);
                        engine.eliminate(&mut local_a, &mut local_b).unwrap();
                        (r, local_a, local_b)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
        });

        let mut got_a = vec![0.0; n * n];
        let mut got_b = vec![0.0; n];
        for (r, la, lb) in results {
            let start = partitioner.start_of(r);
            let rows = partitioner.rows_of(r);
            got_a[start * n..(start + rows) * n].copy_from_slice(&la);
            got_b[start..start + rows].copy_from_slice(&lb);
        }

        for i in 0..n * n {
            assert!((got_a[i] - ref_a[i]).abs() < 1e-9, "a[{i}] {} vs {}", got_a[i], ref_a[i]);
        }
        for i in 0..n {
            assert!((got_b[i] - ref_b[i]).abs() < 1e-9, "b[{i}] {} vs {}", got_b[i], ref_b[i]);
        }
    }

    fn serial_eliminate(a: &[f64], b: &[f64], n: usize) -> (Vec<f64>, Vec<f64>) {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        for p in 0..n - 1 {
            for i in p + 1..n {
                let ratio = a[i * n + p] / a[p * n + p];
                for j in p..n {
                    a[i * n + j] -= ratio * a[p * n + j];
                }
                b[i] -= ratio * b[p];
            }
        }
        (a, b)
    }
}
