//! CLI entry point: `pargauss <n>`, launched as `mpirun -np P pargauss <n>`.
//!
//! Reads `matrix.in`/`vector.in` from the working directory at rank 0, solves
//! `A*x = b` by pipelined parallel Gaussian elimination plus serial
//! back-substitution, and writes `result.out` at rank 0.

use mpi::traits::Communicator;
use pargauss::config::Config;
use pargauss::orchestrator::Orchestrator;
use pargauss::trace;
use pargauss::transport::MpiTransport;
use std::process::ExitCode;

fn main() -> ExitCode {
    let universe = match mpi::initialize() {
        Some(u) => u,
        None => {
            eprintln!("pargauss: failed to initialize MPI");
            return ExitCode::FAILURE;
        }
    };
    let world = universe.world();
    let rank = world.rank() as usize;
    let transport = MpiTransport::new(world);

    match run(&transport) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if rank == 0 {
                eprintln!("pargauss: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(transport: &MpiTransport) -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_args_and_env(&args)?;
    trace::set_enabled(config.debug);

    let orchestrator = Orchestrator::new(transport);
    orchestrator.run(config, "matrix.in", "vector.in", "result.out")
}
