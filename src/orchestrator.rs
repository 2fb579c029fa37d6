//! Wires the row-partitioner, scatter, elimination engine, gather,
//! back-substitution, residual check, and I/O together into one run, driven
//! identically by every participant (SPMD): the root additionally loads
//! input, gathers the result, and writes output.

use crate::backsub;
use crate::config::{validate_participant_count, Config};
use crate::gather;
use crate::engine::Engine;
use crate::io;
use crate::partition::Partitioner;
use crate::residual;
use crate::transport::Transport;
use anyhow::{Context, Result};
use std::path::Path;

/// The root's rank by convention throughout this crate.
pub const ROOT: usize = 0;

pub struct Orchestrator<'t, T: Transport> {
    transport: &'t T,
}

impl<'t, T: Transport> Orchestrator<'t, T> {
    pub fn new(transport: &'t T) -> Self {
        Self { transport }
    }

    /// Runs one full solve: load (root only) -> scatter -> eliminate -> gather
    /// -> back-substitute (root only) -> residual check (root only) -> write
    /// result (root only).
    pub fn run(
        &self,
        config: Config,
        matrix_path: impl AsRef<Path>,
        vector_path: impl AsRef<Path>,
        result_path: impl AsRef<Path>,
    ) -> Result<()> {
        validate_participant_count(self.transport.size())?;

        let n = config.n;
        let rank = self.transport.rank();
        let partitioner = Partitioner::new(n, self.transport.size());

        let (a_root, b_root) = if rank == ROOT {
            let a = io::read_matrix(matrix_path, n).context("loading matrix.in")?;
            let b = io::read_vector(vector_path, n).context("loading vector.in")?;
            (Some(a), Some(b))
        } else {
            (None, None)
        };

        let row_counts = partitioner.counts();
        let element_counts: Vec<usize> = row_counts.iter().map(|&rows| rows * n).collect();

        let mut local_a = self
            .transport
            .scatter_rows(ROOT, a_root.as_deref(), &element_counts)
            .context("scattering matrix rows")?;
        let mut local_b = self
            .transport
            .scatter_rows(ROOT, b_root.as_deref(), &row_counts)
            .context("scattering rhs entries")?;

        let engine = Engine::new(self.transport, partitioner, config.block_size);
        engine.eliminate(&mut local_a, &mut local_b).context("elimination")?;

        let gathered = gather::gather(self.transport, &partitioner, ROOT, &local_a, &local_b)
            .context("gathering eliminated stripes")?;

        if rank == ROOT {
            let (res_a, res_b) = gathered.expect("root must receive a gathered result");
            let x = backsub::solve(&res_a, &res_b, n);

            let a_orig = a_root.expect("root retains the original matrix for the residual check");
            let b_orig = b_root.expect("root retains the original rhs for the residual check");
            let violations = residual::count_violations(&a_orig, &b_orig, &x, n);
            println!("Errors={violations}");

            io::write_result(result_path, &x).context("writing result.out")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::build_channel_transports;
    use std::thread;

    fn run_scenario(n: usize, size: usize, block_size: usize, a: &[f64], b: &[f64]) -> Vec<f64> {
        let dir = tempfile::tempdir().unwrap();
        let matrix_path = dir.path().join("matrix.in");
        let vector_path = dir.path().join("vector.in");
        let result_path = dir.path().join("result.out");

        let rows: Vec<String> = a.iter().map(|v| v.to_string()).collect();
        std::fs::write(&matrix_path, rows.join(" ")).unwrap();
        let rhs: Vec<String> = b.iter().map(|v| v.to_string()).collect();
        std::fs::write(&vector_path, rhs.join(" ")).unwrap();

        let transports = build_channel_transports(size);
        thread::scope(|s| {
            let handles: Vec<_> = transports
                .into_iter()
                .map(|t| {
                    let matrix_path = matrix_path.clone();
                    let vector_path = vector_path.clone();
                    let result_path = result_path.clone();
                    s.spawn(move || {
                        let orchestrator = Orchestrator::new(&t);
                        let config = Config { n, block_size, debug: false };
                        orchestrator.run(config, matrix_path, vector_path, result_path).unwrap();
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
        });

        let contents = std::fs::read_to_string(&result_path).unwrap();
        contents
            .lines()
            .map(|l| l.parse::<f64>().unwrap())
            .collect()
    }

    #[test]
    fn scenario_trivial_2x2() {
        let x = run_scenario(2, 2, 20, &[2.0, 1.0, 1.0, 3.0], &[3.0, 4.0]);
        assert!((x[0] - 1.0).abs() < 1e-6);
        assert!((x[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scenario_diagonal_4x4() {
        #[rustfmt::skip]
        let a = vec![
            2.0, 0.0, 0.0, 0.0,
            0.0, 4.0, 0.0, 0.0,
            0.0, 0.0, 8.0, 0.0,
            0.0, 0.0, 0.0, 16.0,
        ];
        let b = vec![2.0, 8.0, 24.0, 64.0];
        let x = run_scenario(4, 2, 20, &a, &b);
        for (got, want) in x.iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn scenario_already_upper_triangular_4x4_with_block_size_one() {
        #[rustfmt::skip]
        let a = vec![
            1.0, 2.0, 3.0, 4.0,
            0.0, 1.0, 2.0, 3.0,
            0.0, 0.0, 1.0, 2.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let b = vec![10.0, 6.0, 3.0, 1.0];
        let x = run_scenario(4, 4, 1, &a, &b);
        for got in x {
            assert!((got - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn scenario_uneven_partition_n7_p4() {
        // A = diag(1..7) + 0.1 * J, b chosen so x = all ones.
        let n = 7;
        let mut a = vec![0.1_f64; n * n];
        for i in 0..n {
            a[i * n + i] += (i + 1) as f64;
        }
        let b: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| a[i * n + j]).sum::<f64>())
            .collect();

        let x = run_scenario(n, 4, 3, &a, &b);
        for got in x {
            assert!((got - 1.0).abs() < 1e-6, "got {got}");
        }
    }

    #[test]
    fn scenario_block_size_invariance() {
        let n = 20usize;
        let mut a = vec![0.05_f64; n * n];
        for i in 0..n {
            a[i * n + i] = 10.0 + i as f64;
        }
        let b: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| a[i * n + j]).sum::<f64>())
            .collect();

        let x5 = run_scenario(n, 8, 5, &a, &b);
        let x20 = run_scenario(n, 8, 20, &a, &b);
        for (a, b) in x5.iter().zip(x20.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }
}
