//! The bounded copy loop.
//!
//! [`copy_log`] repeatedly reads new bytes from a [`LogSource`] and appends
//! them to a sink until the source stops growing, the size limit is
//! crossed, or (when following a live log) the timeout expires. A copy cut
//! short by a limit gets a trailing marker line in the destination so the
//! file itself says it is incomplete.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::interrupt;
use crate::listener::BuildListener;
use crate::source::LogSource;

/// Appended to the destination when the copy stops at the size limit.
pub const SIZE_LIMIT_MARKER: &str = "\nACID: log truncated (size exceeded)\n";

/// Appended to the destination when a blocking copy runs past its timeout.
pub const TIMEOUT_MARKER: &str = "\nACID: log truncated (timeout)\n";

/// Delay between passes while waiting for a live log to grow.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

// ── Outcome ─────────────────────────────────────────────────────────────

/// How a copy ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOutcome {
    /// The source stopped growing (or we were not following it) and every
    /// byte seen so far is in the destination.
    Complete,
    /// The copy stopped because the source grew past the size limit.
    TruncatedBySize,
    /// The copy stopped because the timeout expired while following.
    TruncatedByTimeout,
}

impl CopyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyOutcome::Complete => "complete",
            CopyOutcome::TruncatedBySize => "truncated_by_size",
            CopyOutcome::TruncatedByTimeout => "truncated_by_timeout",
        }
    }

    pub fn is_truncated(&self) -> bool {
        !matches!(self, CopyOutcome::Complete)
    }
}

impl fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a finished copy did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub outcome: CopyOutcome,
    /// Bytes read from the source and written to the sink. Marker lines
    /// are not counted.
    pub bytes_copied: u64,
}

// ── The loop ────────────────────────────────────────────────────────────

/// Copy `source` into `sink`, bounded by `size_limit` bytes and, when
/// `block` is set, by `timeout`.
///
/// With `block` unset a single pass copies whatever the source holds right
/// now. With it set the loop keeps polling once per second until a pass
/// finds no new bytes. Limit diagnostics go to `listener`; the sink only
/// ever receives source bytes plus at most one trailing marker.
pub fn copy_log<W: Write>(
    source: &mut dyn LogSource,
    sink: &mut W,
    block: bool,
    size_limit: u64,
    timeout: Duration,
    listener: &dyn BuildListener,
) -> Result<CopyReport> {
    let start = Instant::now();
    copy_log_with(
        source,
        sink,
        block,
        size_limit,
        timeout,
        listener,
        move || start.elapsed(),
        || interrupt::sleep(POLL_INTERVAL),
    )
}

/// [`copy_log`] with the clock and the inter-pass wait injected, so tests
/// can drive the loop without real time passing.
#[allow(clippy::too_many_arguments)]
pub fn copy_log_with<W: Write>(
    source: &mut dyn LogSource,
    sink: &mut W,
    block: bool,
    size_limit: u64,
    timeout: Duration,
    listener: &dyn BuildListener,
    elapsed: impl Fn() -> Duration,
    mut wait: impl FnMut() -> Result<()>,
) -> Result<CopyReport> {
    let mut offset: u64 = 0;
    let mut bytes_copied: u64 = 0;

    loop {
        let prev_offset = offset;
        let (chunk, next_offset) = source
            .read_from(offset)
            .context("Failed to read console log")?;
        offset = next_offset;

        if !chunk.is_empty() {
            sink.write_all(&chunk)
                .context("Failed to write to workspace file")?;
            bytes_copied += chunk.len() as u64;
        }

        // The size check runs after the write. A read is never split, so
        // the destination can overrun the limit by at most one read.
        if offset > size_limit {
            listener.log(&format!(
                "Reached log size limit of {size_limit} bytes. Aborting."
            ));
            sink.write_all(SIZE_LIMIT_MARKER.as_bytes())
                .context("Failed to write to workspace file")?;
            return Ok(CopyReport {
                outcome: CopyOutcome::TruncatedBySize,
                bytes_copied,
            });
        }

        if block && elapsed() > timeout {
            listener.log(&format!(
                "Timeout exceeded ({} seconds). Aborting.",
                timeout.as_secs()
            ));
            sink.write_all(TIMEOUT_MARKER.as_bytes())
                .context("Failed to write to workspace file")?;
            return Ok(CopyReport {
                outcome: CopyOutcome::TruncatedByTimeout,
                bytes_copied,
            });
        }

        if prev_offset >= offset || !block {
            return Ok(CopyReport {
                outcome: CopyOutcome::Complete,
                bytes_copied,
            });
        }

        wait()?;
    }
}
