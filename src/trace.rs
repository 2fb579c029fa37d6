//! Rank-prefixed trace lines, gated by the `DEBUG` environment variable.
//!
//! Read once at startup (see [`crate::config::Config::debug`]), this is the
//! only process-wide state outside the transport handle. No structured
//! logging framework is introduced here — plain `eprintln!` matches the
//! teacher codebase's own ambient style for run-time reporting.

use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Enables or disables trace output; call once, at startup, from [`crate::config::Config`].
pub fn set_enabled(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Emits `message` prefixed with the participant's rank, if tracing is enabled.
pub fn trace(rank: usize, message: &str) {
    if enabled() {
        eprintln!("[rank {rank}] {message}");
    }
}
