//! Point-to-point pipeline transport: `send_block`/`recv_block` between adjacent
//! participants, plus the collective primitives (`barrier`, `scatter_rows`,
//! `gather_rows`) the orchestrator needs at the edges of a run.
//!
//! Two implementations are provided. [`MpiTransport`] is the production
//! backend — one OS process per participant, wired by an MPI communicator, so
//! "distinct address space" is literal rather than simulated. [`ChannelTransport`]
//! is an in-process stand-in built from `std::sync::mpsc` channels, used by the
//! test suite and by the `demos/` examples so the elimination engine can be
//! exercised without an MPI launcher. Both satisfy the same ordering guarantee:
//! for any ordered pair (sender, receiver), messages are received in send
//! order, and no ordering is assumed across unrelated pairs.

use anyhow::{anyhow, Context, Result};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc, Barrier};

/// The pipeline transport abstraction every elimination participant drives.
///
/// All operations are synchronous from the caller's point of view: a blocking
/// send, a blocking probe-then-receive, and blocking collectives. There is no
/// cancellation — a participant only stops talking to the transport via the
/// engine's early-exit rule.
pub trait Transport {
    /// This participant's rank, `0 <= rank() < size()`.
    fn rank(&self) -> usize;

    /// Total participant count for this run.
    fn size(&self) -> usize;

    /// Sends `data` (a multiple of the pivot-unit width) to `dest`, tagged `tag`.
    fn send_block(&self, dest: usize, data: &[f64], tag: u64) -> Result<()>;

    /// Blocks until a block tagged `tag` arrives from `src`, discovering its
    /// length before copying (the "probe then receive" pattern of §9).
    fn recv_block(&self, src: usize, tag: u64) -> Result<Vec<f64>>;

    /// Synchronizes all participants; used ahead of the result gather so that
    /// instrumentation can attribute time between computation and pipeline idle.
    /// Not required for correctness.
    fn barrier(&self);

    /// Variable-stride scatter: `root` supplies the full `send` buffer (required
    /// only at `root`; ignored elsewhere) and every participant receives
    /// `counts[rank()]` elements in rank order.
    fn scatter_rows(&self, root: usize, send: Option<&[f64]>, counts: &[usize]) -> Result<Vec<f64>>;

    /// Variable-stride gather: every participant contributes `send`; `root`
    /// receives the concatenation in rank order. `Ok(None)` at non-root ranks.
    fn gather_rows(&self, root: usize, send: &[f64], counts: &[usize]) -> Result<Option<Vec<f64>>>;
}

/// Production transport: one MPI rank per participant.
pub struct MpiTransport {
    world: mpi::topology::SimpleCommunicator,
}

// Pulled in once for the whole impl, mirroring how the rsmpi reference sources
// bring in `topology::traits::*`/`datatype::traits::*` rather than per-call-site.
use mpi::datatype::{Equivalence, Partition, PartitionMut};
use mpi::point_to_point::{Destination, Probe, Source};
use mpi::topology::Rank as MpiRank;
use mpi::traits::{Communicator, Root};

impl MpiTransport {
    pub fn new(world: mpi::topology::SimpleCommunicator) -> Self {
        Self { world }
    }
}

impl Transport for MpiTransport {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn send_block(&self, dest: usize, data: &[f64], tag: u64) -> Result<()> {
        self.world
            .process_at_rank(dest as MpiRank)
            .send_with_tag(data, tag as i32);
        Ok(())
    }

    fn recv_block(&self, src: usize, tag: u64) -> Result<Vec<f64>> {
        let process = self.world.process_at_rank(src as MpiRank);
        let (msg, status) = process.matched_probe_with_tag(tag as i32);
        let count = status.count(f64::equivalent_datatype()) as usize;
        let mut buf = vec![0.0_f64; count];
        msg.matched_receive_into(&mut buf[..]);
        Ok(buf)
    }

    fn barrier(&self) {
        self.world.barrier();
    }

    fn scatter_rows(&self, root: usize, send: Option<&[f64]>, counts: &[usize]) -> Result<Vec<f64>> {
        let root_process = self.world.process_at_rank(root as MpiRank);
        let counts_i: Vec<mpi::Count> = counts.iter().map(|&c| c as mpi::Count).collect();
        let displs: Vec<mpi::Count> = prefix_sums(counts).into_iter().map(|d| d as mpi::Count).collect();
        let my_len = counts[self.rank()];
        let mut recv = vec![0.0_f64; my_len];

        if self.rank() == root {
            let send = send.context("root must supply data for scatter_rows")?;
            let partition = Partition::new(send, counts_i, displs);
            root_process.scatter_varcount_into_root(&partition, &mut recv[..]);
        } else {
            root_process.scatter_varcount_into(&mut recv[..]);
        }
        Ok(recv)
    }

    fn gather_rows(&self, root: usize, send: &[f64], counts: &[usize]) -> Result<Option<Vec<f64>>> {
        let root_process = self.world.process_at_rank(root as MpiRank);
        if self.rank() == root {
            let counts_i: Vec<mpi::Count> = counts.iter().map(|&c| c as mpi::Count).collect();
            let displs: Vec<mpi::Count> = prefix_sums(counts).into_iter().map(|d| d as mpi::Count).collect();
            let total: usize = counts.iter().sum();
            let mut recv = vec![0.0_f64; total];
            let mut partition = PartitionMut::new(&mut recv[..], counts_i, displs);
            root_process.gather_varcount_into_root(send, &mut partition);
            Ok(Some(recv))
        } else {
            root_process.gather_varcount_into(send);
            Ok(None)
        }
    }
}

fn prefix_sums(counts: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(counts.len());
    let mut acc = 0usize;
    for &c in counts {
        out.push(acc);
        acc += c;
    }
    out
}

struct TaggedBlock {
    tag: u64,
    data: Vec<f64>,
}

/// In-process pipeline transport backed by `std::sync::mpsc` channels, one
/// per adjacent rank pair, plus dedicated scatter/gather channels to a root.
/// Built in one shot by [`build_channel_transports`] so every participant's
/// ends are wired before any thread starts running the elimination engine.
pub struct ChannelTransport {
    rank: usize,
    size: usize,
    upstream_rx: Option<Receiver<TaggedBlock>>,
    downstream_tx: Option<Sender<TaggedBlock>>,
    scatter_tx: Vec<Sender<Vec<f64>>>,
    scatter_rx: Receiver<Vec<f64>>,
    gather_tx: Sender<(usize, Vec<f64>)>,
    gather_rx: Option<Receiver<(usize, Vec<f64>)>>,
    barrier: Arc<Barrier>,
}

/// Builds `size` wired-together [`ChannelTransport`]s, one per simulated
/// participant, indexed by rank. Rank 0 plays the root for scatter/gather.
pub fn build_channel_transports(size: usize) -> Vec<ChannelTransport> {
    assert!(size > 0, "participant count must be positive");

    let mut down_tx: Vec<Option<Sender<TaggedBlock>>> = (0..size).map(|_| None).collect();
    let mut up_rx: Vec<Option<Receiver<TaggedBlock>>> = (0..size).map(|_| None).collect();
    for r in 0..size - 1 {
        let (tx, rx) = mpsc::channel();
        down_tx[r] = Some(tx);
        up_rx[r + 1] = Some(rx);
    }

    let mut scatter_tx_all = Vec::with_capacity(size);
    let mut scatter_rx_all: Vec<Option<Receiver<Vec<f64>>>> = Vec::with_capacity(size);
    for _ in 0..size {
        let (tx, rx) = mpsc::channel();
        scatter_tx_all.push(tx);
        scatter_rx_all.push(Some(rx));
    }

    let (gather_tx, gather_rx) = mpsc::channel();
    let mut gather_rx = Some(gather_rx);
    let barrier = Arc::new(Barrier::new(size));

    (0..size)
        .map(|r| ChannelTransport {
            rank: r,
            size,
            upstream_rx: up_rx[r].take(),
            downstream_tx: down_tx[r].take(),
            scatter_tx: if r == 0 { scatter_tx_all.clone() } else { Vec::new() },
            scatter_rx: scatter_rx_all[r].take().expect("scatter receiver taken twice"),
            gather_tx: gather_tx.clone(),
            gather_rx: if r == 0 { gather_rx.take() } else { None },
            barrier: Arc::clone(&barrier),
        })
        .collect()
}

impl Transport for ChannelTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send_block(&self, dest: usize, data: &[f64], tag: u64) -> Result<()> {
        debug_assert_eq!(dest, self.rank + 1, "chain transport only sends downstream");
        let tx = self
            .downstream_tx
            .as_ref()
            .ok_or_else(|| anyhow!("rank {} has no downstream neighbor", self.rank))?;
        tx.send(TaggedBlock { tag, data: data.to_vec() })
            .map_err(|_| anyhow!("downstream channel closed"))
    }

    fn recv_block(&self, src: usize, tag: u64) -> Result<Vec<f64>> {
        debug_assert_eq!(Some(src), self.rank.checked_sub(1), "chain transport only receives upstream");
        let rx = self
            .upstream_rx
            .as_ref()
            .ok_or_else(|| anyhow!("rank {} has no upstream neighbor", self.rank))?;
        let block = rx.recv().map_err(|_| anyhow!("upstream channel closed"))?;
        if block.tag != tag {
            return Err(anyhow!(
                "rank {} expected block tag {tag}, got {}",
                self.rank,
                block.tag
            ));
        }
        Ok(block.data)
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn scatter_rows(&self, root: usize, send: Option<&[f64]>, counts: &[usize]) -> Result<Vec<f64>> {
        if self.rank == root {
            let send = send.context("root must supply data for scatter_rows")?;
            let displs = prefix_sums(counts);
            for r in 0..self.size {
                let chunk = send[displs[r]..displs[r] + counts[r]].to_vec();
                self.scatter_tx[r]
                    .send(chunk)
                    .map_err(|_| anyhow!("scatter channel closed"))?;
            }
        }
        self.scatter_rx.recv().map_err(|_| anyhow!("scatter channel closed"))
    }

    fn gather_rows(&self, root: usize, send: &[f64], counts: &[usize]) -> Result<Option<Vec<f64>>> {
        self.gather_tx
            .send((self.rank, send.to_vec()))
            .map_err(|_| anyhow!("gather channel closed"))?;

        if self.rank != root {
            return Ok(None);
        }

        let rx = self.gather_rx.as_ref().context("root must hold the gather receiver")?;
        let displs = prefix_sums(counts);
        let total: usize = counts.iter().sum();
        let mut out = vec![0.0_f64; total];
        for _ in 0..self.size {
            let (r, data) = rx.recv().map_err(|_| anyhow!("gather channel closed"))?;
            out[displs[r]..displs[r] + data.len()].copy_from_slice(&data);
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn chain_send_recv_in_order() {
        let transports = build_channel_transports(3);
        thread::scope(|s| {
            let handles: Vec<_> = transports
                .into_iter()
                .map(|t| {
                    s.spawn(move || {
                        if t.rank() == 0 {
                            t.send_block(1, &[1.0, 2.0], 0).unwrap();
                            t.send_block(1, &[3.0, 4.0], 1).unwrap();
                        } else if t.rank() == 1 {
                            let a = t.recv_block(0, 0).unwrap();
                            let b = t.recv_block(0, 1).unwrap();
                            t.send_block(2, &a, 0).unwrap();
                            t.send_block(2, &b, 1).unwrap();
                        } else {
                            let a = t.recv_block(1, 0).unwrap();
                            let b = t.recv_block(1, 1).unwrap();
                            assert_eq!(a, vec![1.0, 2.0]);
                            assert_eq!(b, vec![3.0, 4.0]);
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
        });
    }

    #[test]
    fn scatter_then_gather_roundtrips() {
        let transports = build_channel_transports(4);
        let data: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let counts = vec![3usize, 3, 2, 2];

        thread::scope(|s| {
            let handles: Vec<_> = transports
                .into_iter()
                .map(|t| {
                    let data = data.clone();
                    let counts = counts.clone();
                    s.spawn(move || {
                        let send = if t.rank() == 0 { Some(&data[..]) } else { None };
                        let mine = t.scatter_rows(0, send, &counts).unwrap();
                        t.barrier();
                        let gathered = t.gather_rows(0, &mine, &counts).unwrap();
                        if t.rank() == 0 {
                            assert_eq!(gathered.unwrap(), data);
                        } else {
                            assert!(gathered.is_none());
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
        });
    }
}
