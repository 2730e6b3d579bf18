//! Interruptible waiting between copy passes.
//!
//! The copy loop sleeps one second between passes. A process-wide flag,
//! set from a signal handler or another thread, turns the next sleep
//! into an error so a blocking copy stops instead of running out its
//! timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Request that the next [`sleep`] call return an error.
///
/// A single atomic store, safe to call from a signal handler.
pub fn request_interrupt() {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

/// Whether an interrupt has been requested.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

#[cfg(test)]
pub fn reset() {
    INTERRUPTED.store(false, Ordering::Relaxed);
}

/// Sleep for `interval`, checking the interrupt flag as we go.
///
/// Sleeps in small chunks so a request arriving mid-wait is noticed
/// within about 50ms rather than after the full interval.
pub fn sleep(interval: Duration) -> Result<()> {
    let chunk = Duration::from_millis(50);
    let mut slept = Duration::ZERO;
    while slept < interval {
        if interrupted() {
            bail!("Interrupted while waiting for more console output");
        }
        let step = chunk.min(interval - slept);
        thread::sleep(step);
        slept += step;
    }
    if interrupted() {
        bail!("Interrupted while waiting for more console output");
    }
    Ok(())
}
