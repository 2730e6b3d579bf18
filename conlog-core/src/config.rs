//! Runtime configuration for the copy step.
//!
//! Resolution order: **env var > `~/.conlog/config` file > hardcoded default**.
//!
//! ```text
//! Field        Env Var             Config Key   Default
//! ──────────── ─────────────────── ──────────── ─────────────
//! enabled      CONLOG_ENABLED      enabled      true
//! file_name    CONLOG_FILE_NAME    file_name    "console.log"
//! block        CONLOG_BLOCK        block        false
//! size_limit   CONLOG_SIZE_LIMIT   size_limit   1048576 bytes
//! timeout      CONLOG_TIMEOUT      timeout      300s
//! conlog_dir   CONLOG_DIR          —            ~/.conlog
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

/// Default destination file name inside the workspace.
pub const DEFAULT_FILE_NAME: &str = "console.log";

/// Default cap on copied bytes (1 MiB).
pub const DEFAULT_SIZE_LIMIT: u64 = 1024 * 1024;

/// Default cap on how long a blocking copy follows a live log.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for one console log copy.
///
/// All fields follow the resolution order: env var > `~/.conlog/config` file > hardcoded default.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Whether the copy step runs at all (`CONLOG_ENABLED`; default true).
    pub enabled: bool,
    /// Destination file name inside the workspace, expanded against the
    /// build environment before use (`CONLOG_FILE_NAME`; default "console.log").
    pub file_name: String,
    /// Follow a still-growing log instead of copying once (`CONLOG_BLOCK`; default false).
    pub block: bool,
    /// Stop copying once the source offset passes this many bytes
    /// (`CONLOG_SIZE_LIMIT`; default 1048576).
    pub size_limit: u64,
    /// Give up on a blocking copy after this long (`CONLOG_TIMEOUT` seconds; default 300).
    pub timeout: Duration,
}

impl CopyConfig {
    /// Load config from env vars, `<conlog_dir>/config`, and hardcoded defaults.
    ///
    /// Resolution order: env var > config file > default.
    pub fn load(conlog_dir: &Path) -> Result<Self> {
        Self::load_with_env(conlog_dir, |k| env::var(k).ok())
    }

    fn load_with_env(conlog_dir: &Path, get_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::defaults();

        // 1. Apply config file overrides
        let config_file = conlog_dir.join("config");
        if config_file.exists() {
            parse_config_file(&config_file, |key, value| {
                cfg.apply_file_entry(key, value);
            })?;
        }

        // 2. Apply env var overrides (env wins over file)
        cfg.apply_env_overrides(get_env);

        Ok(cfg)
    }

    pub fn defaults() -> Self {
        Self {
            enabled: true,
            file_name: DEFAULT_FILE_NAME.to_string(),
            block: false,
            size_limit: DEFAULT_SIZE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn apply_file_entry(&mut self, key: &str, value: &str) {
        match key {
            // Booleans flip only on exact "true"/"false"; anything else
            // is ignored so a typo cannot silently disable the step.
            "enabled" => {
                if let Ok(b) = value.parse::<bool>() {
                    self.enabled = b;
                }
            }
            "file_name" => self.file_name = value.to_string(),
            "block" => {
                if let Ok(b) = value.parse::<bool>() {
                    self.block = b;
                }
            }
            "size_limit" => {
                if let Ok(n) = value.parse::<u64>() {
                    self.size_limit = n;
                }
            }
            "timeout" => {
                if let Ok(n) = value.parse::<u64>() {
                    self.timeout = Duration::from_secs(n);
                }
            }
            _ => {}
        }
    }

    fn apply_env_overrides(&mut self, get_env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get_env("CONLOG_ENABLED") {
            if let Ok(b) = v.parse::<bool>() {
                self.enabled = b;
            }
        }
        if let Some(v) = get_env("CONLOG_FILE_NAME") {
            self.file_name = v;
        }
        if let Some(v) = get_env("CONLOG_BLOCK") {
            if let Ok(b) = v.parse::<bool>() {
                self.block = b;
            }
        }
        if let Some(v) = get_env("CONLOG_SIZE_LIMIT") {
            if let Ok(n) = v.parse::<u64>() {
                self.size_limit = n;
            }
        }
        if let Some(v) = get_env("CONLOG_TIMEOUT") {
            if let Ok(n) = v.parse::<u64>() {
                self.timeout = Duration::from_secs(n);
            }
        }
    }
}

/// Base directory for conlog state.
///
/// Resolution: `CONLOG_DIR` env > `~/.conlog` > `.conlog` in the current
/// directory when `HOME` is unset.
pub fn default_conlog_dir() -> PathBuf {
    if let Ok(dir) = env::var("CONLOG_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home).join(".conlog");
    }
    PathBuf::from(".conlog")
}

/// Parse a `key=value` config file, calling `f` for each entry.
///
/// Lines starting with `#` and empty lines are skipped.
fn parse_config_file(path: &Path, mut f: impl FnMut(&str, &str)) -> Result<()> {
    let content = fs::read_to_string(path)?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            f(k.trim(), v.trim());
        }
    }
    Ok(())
}

/// The set of recognized config file keys.
pub const KNOWN_KEYS: &[&str] = &["enabled", "file_name", "block", "size_limit", "timeout"];

/// Validation status for a single config file entry.
#[derive(Debug, PartialEq)]
pub enum ConfigEntryStatus {
    /// Key and value are valid.
    Ok,
    /// Key is recognized but the value cannot be parsed as the expected type.
    InvalidValue {
        /// Human-readable description of what was expected.
        note: String,
    },
    /// Key is not recognized. May include a suggestion for the closest known key.
    UnknownKey {
        /// Closest known key, if one is within edit-distance 3.
        suggestion: Option<String>,
    },
}

/// A single parsed and validated entry from the config file.
#[derive(Debug)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub status: ConfigEntryStatus,
}

/// Parse and validate all entries in the config file at `path`.
///
/// Comment lines, blank lines, and lines without `=` are skipped.
/// Returns one [`ConfigEntry`] per data line with its validation status.
pub fn validate_config_file(path: &Path) -> Result<Vec<ConfigEntry>> {
    let content = fs::read_to_string(path)?;
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim().to_string();
        let value = v.trim().to_string();
        let status = validate_config_entry(&key, &value);
        entries.push(ConfigEntry { key, value, status });
    }
    Ok(entries)
}

fn validate_config_entry(key: &str, value: &str) -> ConfigEntryStatus {
    match key {
        "enabled" | "block" => {
            if value.parse::<bool>().is_ok() {
                ConfigEntryStatus::Ok
            } else {
                ConfigEntryStatus::InvalidValue {
                    note: "expected \"true\" or \"false\"".to_string(),
                }
            }
        }
        "size_limit" => {
            if value.parse::<u64>().is_ok() {
                ConfigEntryStatus::Ok
            } else {
                ConfigEntryStatus::InvalidValue {
                    note: "expected a positive integer (bytes)".to_string(),
                }
            }
        }
        "timeout" => {
            if value.parse::<u64>().is_ok() {
                ConfigEntryStatus::Ok
            } else {
                ConfigEntryStatus::InvalidValue {
                    note: "expected a positive integer (seconds)".to_string(),
                }
            }
        }
        "file_name" => ConfigEntryStatus::Ok,
        _ => ConfigEntryStatus::UnknownKey {
            suggestion: closest_known_key(key),
        },
    }
}

/// Return the closest known config key to `input`, or `None` if no key is
/// within edit-distance 3.
fn closest_known_key(input: &str) -> Option<String> {
    const MAX_DISTANCE: usize = 3;
    let mut best: Option<(&str, usize)> = None;
    for key in KNOWN_KEYS {
        let d = edit_distance(input, key);
        if d <= MAX_DISTANCE && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((key, d));
        }
    }
    best.map(|(k, _)| k.to_string())
}

/// Levenshtein distance, single-row dynamic programming.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let sub = if ca == cb { diag } else { diag + 1 };
            row[j + 1] = sub.min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }
    row[b.len()]
}
