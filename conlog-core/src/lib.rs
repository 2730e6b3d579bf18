//! Copy a build's console log into a workspace file, bounded by a size
//! limit and, when following a live log, a timeout.
//!
//! Domain model:
//!   - `copier`    — the bounded polling copy loop and truncation markers
//!   - `source`    — `LogSource` port plus the file-backed adapter
//!   - `workspace` — destination directory, confined file creation
//!   - `expand`    — `$VAR`/`${VAR}` placeholder expansion for file names
//!   - `listener`  — build log port, `[conlog]`-tagged lines
//!   - `status`    — build result recording (success/unstable/failure)
//!   - `step`      — loop + ports + lifecycle logging, failure absorbed
//!
//! Runtime support:
//!   - `config`    — runtime config from env vars and `~/.conlog/config`
//!   - `event_log` — append-only JSONL record of copy attempts
//!   - `interrupt` — signal flag and interruptible sleeping
//!
//! `step::perform` is the all-in-one entry point hosts call; `copier`
//! exposes the bare loop for callers that bring their own sink.

pub mod config;
pub mod copier;
pub mod event_log;
pub mod expand;
pub mod interrupt;
pub mod listener;
pub mod source;
pub mod status;
pub mod step;
pub mod workspace;

// Re-export the types most callers touch.
pub use copier::{copy_log, CopyOutcome, CopyReport, SIZE_LIMIT_MARKER, TIMEOUT_MARKER};
pub use status::BuildResult;
pub use step::StepReport;
