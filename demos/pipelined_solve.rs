//! Runs one pipelined elimination entirely in-process over `ChannelTransport`,
//! using the synthetic generator instead of `matrix.in`/`vector.in`. Useful
//! for trying out the elimination engine without an MPI launcher:
//!
//! ```sh
//! cargo run --example pipelined_solve --features synthetic-generator
//! ```

use pargauss::backsub;
use pargauss::engine::Engine;
use pargauss::partition::Partitioner;
use pargauss::residual;
use pargauss::synth;
use pargauss::transport::{build_channel_transports, Transport};
use std::thread;

fn main() {
    let n = 16usize;
    let size = 4usize;
    let block_size = 5usize;

    let (a, b) = synth::generate(n, 1.0);
    let partitioner = Partitioner::new(n, size);

    let transports = build_channel_transports(size);
    let results = thread::scope(|s| {
        let handles: Vec<_> = transports
            .into_iter()
            .map(|t| {
                let a = a.clone();
                let b = b.clone();
                s.spawn(move || {
                    let r = t.rank();
                    let start = partitioner.start_of(r);
                    let rows = partitioner.rows_of(r);
                    let mut local_a = a[start * n..(start + rows) * n].to_vec();
                    let mut local_b = b[start..start + rows].to_vec();

                    let engine = Engine::new(&t, partitioner, block_size);
                    engine.eliminate(&mut local_a, &mut local_b).expect("elimination failed");

                    t.barrier();
                    let row_counts = partitioner.counts();
                    let element_counts: Vec<usize> = row_counts.iter().map(|&c| c * n).collect();
                    let gathered_a = t.gather_rows(0, &local_a, &element_counts).unwrap();
                    let gathered_b = t.gather_rows(0, &local_b, &row_counts).unwrap();
                    gathered_a.zip(gathered_b)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    let (res_a, res_b) = results.into_iter().flatten().next().expect("root produces a result");
    let x = backsub::solve(&res_a, &res_b, n);
    let violations = residual::count_violations(&a, &b, &x, n);

    println!("n={n} size={size} block_size={block_size} Errors={violations}");
    println!("x = {x:?}");
}
