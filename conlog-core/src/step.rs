//! The copy step.
//!
//! [`perform`] ties the copy loop to its ports, logs the lifecycle lines a
//! build log shows, and absorbs every failure into the recorded build
//! result. An I/O failure downgrades the build to unstable; it never fails
//! it and never propagates as an `Err`.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::config::CopyConfig;
use crate::copier::{copy_log, CopyOutcome, CopyReport};
use crate::event_log::EventLog;
use crate::expand::EnvExpander;
use crate::listener::BuildListener;
use crate::source::LogSource;
use crate::status::BuildResult;
use crate::workspace::Workspace;

/// What one run of the step did, for callers and for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Result recorded against the build: `success` or `unstable`.
    pub result: BuildResult,
    /// Destination file name after placeholder expansion.
    pub file_name: String,
    /// How the copy ended; `None` when the step was skipped or failed.
    pub outcome: Option<CopyOutcome>,
    pub bytes_copied: u64,
    pub duration_s: u64,
    /// Rendered error chain when the copy failed.
    pub error: Option<String>,
    /// False when the step was disabled and did nothing.
    pub performed: bool,
}

/// Copy the console log into the workspace per `cfg`.
///
/// Never returns an error: a failed copy is reported through the listener
/// and recorded as [`BuildResult::Unstable`] so the surrounding build keeps
/// going. Truncation by a limit still counts as success.
pub fn perform(
    source: &mut dyn LogSource,
    env: &dyn EnvExpander,
    workspace: &Workspace,
    listener: &dyn BuildListener,
    events: &EventLog,
    cfg: &CopyConfig,
) -> StepReport {
    if !cfg.enabled {
        return StepReport {
            result: BuildResult::Success,
            file_name: cfg.file_name.clone(),
            outcome: None,
            bytes_copied: 0,
            duration_s: 0,
            error: None,
            performed: false,
        };
    }

    let file_name = env.expand(&cfg.file_name);
    listener.log(&format!(
        "Writing console log to workspace file {file_name} started"
    ));
    events.copy_start(
        &file_name,
        workspace.root(),
        cfg.block,
        cfg.size_limit,
        cfg.timeout.as_secs(),
    );

    let start = Instant::now();
    match try_copy(source, workspace, listener, &file_name, cfg) {
        Ok(report) => {
            let duration_s = start.elapsed().as_secs();
            listener.log(&format!(
                "Wrote console log to workspace file {file_name} successfully"
            ));
            events.copy_result(&file_name, report.outcome, report.bytes_copied, duration_s);
            StepReport {
                result: BuildResult::Success,
                file_name,
                outcome: Some(report.outcome),
                bytes_copied: report.bytes_copied,
                duration_s,
                error: None,
                performed: true,
            }
        }
        Err(err) => {
            let duration_s = start.elapsed().as_secs();
            let error = format!("{err:#}");
            listener.log(&format!(
                "Writing console log to workspace file {file_name} failed: {error}"
            ));
            events.copy_failed(&file_name, &error, duration_s);
            StepReport {
                result: BuildResult::Unstable,
                file_name,
                outcome: None,
                bytes_copied: 0,
                duration_s,
                error: Some(error),
                performed: true,
            }
        }
    }
}

// The sink file is dropped on every path out of here, success or error.
fn try_copy(
    source: &mut dyn LogSource,
    workspace: &Workspace,
    listener: &dyn BuildListener,
    file_name: &str,
    cfg: &CopyConfig,
) -> Result<CopyReport> {
    let mut sink = workspace.create_file(file_name)?;
    copy_log(
        source,
        &mut sink,
        cfg.block,
        cfg.size_limit,
        cfg.timeout,
        listener,
    )
}
