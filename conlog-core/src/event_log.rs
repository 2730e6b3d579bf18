//! Append-only JSONL record of copy attempts.
//!
//! One JSON object per line, written to `copy.log` under the logs
//! directory. Three event kinds:
//!
//! | `event`       | extra fields                                             |
//! |---------------|----------------------------------------------------------|
//! | `copy_start`  | `file`, `workspace`, `block`, `size_limit`, `timeout_s`  |
//! | `copy_result` | `file`, `outcome`, `bytes_copied`, `duration_s`          |
//! | `copy_failed` | `file`, `error`, `duration_s`                            |
//!
//! Every event carries a `ts` timestamp. Writes are best effort: a copy
//! never fails because its event could not be recorded.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::copier::CopyOutcome;

pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Event log stored as `copy.log` inside `logs_dir`.
    pub fn new(logs_dir: &Path) -> Self {
        Self {
            path: logs_dir.join("copy.log"),
        }
    }

    pub fn copy_start(
        &self,
        file: &str,
        workspace: &Path,
        block: bool,
        size_limit: u64,
        timeout_s: u64,
    ) {
        self.emit(json!({
            "event": "copy_start",
            "file": file,
            "workspace": workspace.display().to_string(),
            "block": block,
            "size_limit": size_limit,
            "timeout_s": timeout_s,
        }));
    }

    pub fn copy_result(&self, file: &str, outcome: CopyOutcome, bytes_copied: u64, duration_s: u64) {
        self.emit(json!({
            "event": "copy_result",
            "file": file,
            "outcome": outcome.as_str(),
            "bytes_copied": bytes_copied,
            "duration_s": duration_s,
        }));
    }

    pub fn copy_failed(&self, file: &str, error: &str, duration_s: u64) {
        self.emit(json!({
            "event": "copy_failed",
            "file": file,
            "error": error,
            "duration_s": duration_s,
        }));
    }

    /// Append one event line, stamping `ts` unless the caller set one.
    fn emit(&self, mut event: Value) {
        if let Some(obj) = event.as_object_mut() {
            if !obj.contains_key("ts") {
                obj.insert("ts".to_string(), json!(now_ts()));
            }
        }
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(file, "{event}");
        }
    }
}

fn now_ts() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
