//! Resolves the run's configuration from the command line and environment:
//! the system order `n`, the block size `B`, and the `DEBUG` trace flag. Also
//! validates the participant count `P` supplied by the transport.
//!
//! All failures are collected into a single `anyhow::Error` carrying enough
//! context for the orchestrator to print one precise message at the root and
//! exit non-zero, per `SPEC_FULL.md` §6/§7.

use anyhow::{bail, Context, Result};
use std::env;

/// Participant counts the production CLI path accepts, per `SPEC_FULL.md` §9:
/// the partitioner itself is correct for any positive `P`, but this
/// restriction is preserved because downstream consumers may rely on it.
pub const SUPPORTED_PARTICIPANT_COUNTS: [usize; 5] = [2, 4, 8, 16, 32];

pub const DEFAULT_BLOCK_SIZE: usize = 20;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub n: usize,
    pub block_size: usize,
    pub debug: bool,
}

impl Config {
    /// Resolves `n` from the single positional command-line argument and `B`
    /// from `BLOCK_SIZE` (environment), validating both. Does not look at `P` —
    /// callers validate the participant count separately via
    /// [`validate_participant_count`], since it comes from the transport, not argv.
    pub fn from_args_and_env(args: &[String]) -> Result<Self> {
        if args.len() != 2 {
            bail!("usage: {} <n>", args.first().map(String::as_str).unwrap_or("pargauss"));
        }
        let n: usize = args[1]
            .parse()
            .with_context(|| format!("invalid system order {:?}: must be a positive integer", args[1]))?;
        if n == 0 {
            bail!("system order must be positive, got 0");
        }

        let block_size = match env::var("BLOCK_SIZE") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|&b| b > 0)
                .with_context(|| format!("BLOCK_SIZE={raw:?} must be a positive integer"))?,
            Err(_) => DEFAULT_BLOCK_SIZE,
        };

        let debug = env::var("DEBUG").map(|v| v == "1").unwrap_or(false);

        Ok(Self { n, block_size, debug })
    }
}

/// Validates the participant count reported by the transport against
/// [`SUPPORTED_PARTICIPANT_COUNTS`].
pub fn validate_participant_count(size: usize) -> Result<()> {
    if SUPPORTED_PARTICIPANT_COUNTS.contains(&size) {
        Ok(())
    } else {
        bail!(
            "unsupported participant count {size}; supported: {:?}",
            SUPPORTED_PARTICIPANT_COUNTS
        );
    }
}
