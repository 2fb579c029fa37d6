//! # pargauss
//!
//! A **parallel pipelined Gaussian elimination** solver for dense linear systems
//! `A·x = b`, built around a row-partitioned elimination kernel in which pivot
//! rows are forwarded along a linear chain of participants and applied to each
//! participant's local stripe before being relayed downstream.
//!
//! ## Key pieces
//!
//! - [`partition::Partitioner`] — maps global row indices to owning participants
//!   under a contiguous, load-balanced block partition.
//! - [`transport::Transport`] — the point-to-point pipeline abstraction, backed
//!   either by real MPI ranks ([`transport::MpiTransport`]) or by in-process
//!   channels ([`transport::ChannelTransport`]) for tests and demos.
//! - [`engine`] — the elimination loop itself: own/receive/forward a pivot
//!   block, then apply it to the local stripe.
//! - [`gather`] — reassembles the eliminated stripes into one upper-triangular
//!   system at the root.
//! - [`backsub`] — the serial triangular solve that produces `x`.
//! - [`orchestrator::Orchestrator`] — wires the above together end to end.
//!
//! ## Non-goals
//!
//! No pivoting, no sparse/structured matrix support, no fault tolerance across
//! participants, no distributed back-substitution. See `SPEC_FULL.md` in the
//! repository root for the full functional specification this crate implements.

pub mod backsub;
pub mod config;
pub mod engine;
pub mod gather;
pub mod io;
pub mod orchestrator;
pub mod partition;
pub mod pivot;
pub mod residual;
pub mod trace;
pub mod transport;

#[cfg(feature = "synthetic-generator")]
pub mod synth;

pub use orchestrator::Orchestrator;
pub use partition::Partitioner;
pub use transport::Transport;
