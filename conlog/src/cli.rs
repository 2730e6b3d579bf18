use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use conlog_core::{
    config::{default_conlog_dir, validate_config_file, ConfigEntryStatus, CopyConfig},
    event_log::EventLog,
    expand::BuildEnv,
    listener::ConsoleListener,
    source::FileLogSource,
    step,
    status::BuildResult,
    workspace::Workspace,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_HASH: &str = env!("CONLOG_GIT_SHA");

#[derive(Parser)]
#[command(
    name = "conlog",
    version,
    about = "Copy a build's console log into a workspace file",
    long_about = "conlog copies a (possibly still growing) console log into a workspace file,\nbounded by a size limit and, when following, a timeout. A failed copy marks\nthe build unstable instead of failing it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy a console log into the workspace
    Copy {
        /// Path of the console log to read
        source: PathBuf,

        /// Destination file name inside the workspace. `$VAR` and `${VAR}`
        /// expand against the environment. Defaults to the configured
        /// file_name (console.log).
        dest: Option<String>,

        /// Workspace directory the destination is confined to
        #[arg(long, default_value = ".")]
        workspace: PathBuf,

        /// Keep polling while the source grows instead of copying once
        #[arg(long)]
        block: bool,

        /// Stop copying once the source offset passes this many bytes
        #[arg(long)]
        size_limit: Option<u64>,

        /// Give up on a blocking copy after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the step report as a single JSON line
        #[arg(long)]
        json: bool,
    },

    /// Check the conlog directory and validate the config file
    Doctor,

    /// Print version
    Version,
}

pub fn run(cli: Cli) -> Result<BuildResult> {
    match cli.command {
        Commands::Copy {
            source,
            dest,
            workspace,
            block,
            size_limit,
            timeout,
            json,
        } => cmd_copy(source, dest, workspace, block, size_limit, timeout, json),
        Commands::Doctor => cmd_doctor(),
        Commands::Version => {
            println!("conlog {VERSION} ({GIT_HASH})");
            Ok(BuildResult::Success)
        }
    }
}

fn cmd_copy(
    source: PathBuf,
    dest: Option<String>,
    workspace: PathBuf,
    block: bool,
    size_limit: Option<u64>,
    timeout: Option<u64>,
    json: bool,
) -> Result<BuildResult> {
    let dir = default_conlog_dir();
    let mut cfg = CopyConfig::load(&dir)?;

    // CLI flags override the loaded config for this invocation.
    if let Some(dest) = dest {
        cfg.file_name = dest;
    }
    if block {
        cfg.block = true;
    }
    if let Some(bytes) = size_limit {
        cfg.size_limit = bytes;
    }
    if let Some(secs) = timeout {
        cfg.timeout = Duration::from_secs(secs);
    }

    let logs_dir = dir.join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let events = EventLog::new(&logs_dir);

    let mut log = FileLogSource::new(source);
    let env = BuildEnv::from_process_env();
    let ws = Workspace::new(workspace);

    let report = step::perform(&mut log, &env, &ws, &ConsoleListener, &events, &cfg);

    if json {
        println!("{}", serde_json::to_string(&report)?);
    }

    // The build starts successful; the step can only degrade it.
    Ok(BuildResult::Success.combine(report.result))
}

fn cmd_doctor() -> Result<BuildResult> {
    let dir = default_conlog_dir();
    let mut errors = 0u32;
    let mut warnings = 0u32;

    let ok = |msg: &str| println!("  OK  {msg}");
    let mut err = |msg: &str| {
        println!("  ERR {msg}");
        errors += 1;
    };
    let mut warn = |msg: &str| {
        println!(" WARN {msg}");
        warnings += 1;
    };
    let info = |msg: &str| println!("  --  {msg}");

    println!();
    println!("=== conlog doctor ===");
    println!();

    println!("Directories:");
    if dir.exists() {
        ok(&format!("{} exists", dir.display()));
    } else {
        warn(&format!(
            "{} missing (created on the first copy)",
            dir.display()
        ));
    }

    println!();
    println!("Effective settings:");
    let cfg = CopyConfig::load(&dir)?;
    info(&format!("enabled    = {}", cfg.enabled));
    info(&format!("file_name  = {}", cfg.file_name));
    info(&format!("block      = {}", cfg.block));
    info(&format!("size_limit = {} bytes", cfg.size_limit));
    info(&format!("timeout    = {}s", cfg.timeout.as_secs()));

    println!();
    let config_file = dir.join("config");
    println!("Config ({}):", config_file.display());

    if !config_file.exists() {
        info("No config file found (using all defaults)");
    } else {
        let entries = validate_config_file(&config_file)?;
        if entries.is_empty() {
            info("Config file is empty (using all defaults)");
        } else {
            for entry in &entries {
                let display = format!("{}={}", entry.key, entry.value);
                match &entry.status {
                    ConfigEntryStatus::Ok => ok(&display),
                    ConfigEntryStatus::InvalidValue { note } => {
                        err(&format!("{display}  — invalid value, {note}"));
                    }
                    ConfigEntryStatus::UnknownKey {
                        suggestion: Some(s),
                    } => {
                        warn(&format!("unknown key \"{display}\" — did you mean \"{s}\"?"));
                    }
                    ConfigEntryStatus::UnknownKey { suggestion: None } => {
                        warn(&format!("unknown key \"{display}\""));
                    }
                }
            }
        }
    }

    println!();
    if errors == 0 && warnings == 0 {
        println!("All checks passed.");
    } else if errors == 0 {
        println!("{warnings} warning(s).");
    } else {
        let mut summary = format!("{errors} error(s)");
        if warnings > 0 {
            summary += &format!(", {warnings} warning(s)");
        }
        println!("{summary}.");
    }

    if errors > 0 {
        bail!("doctor found {errors} error(s)");
    }
    Ok(BuildResult::Success)
}

/// Route SIGINT/SIGTERM into the interrupt flag so a blocking copy aborts
/// its wait instead of dying mid-write.
#[cfg(unix)]
pub fn install_signal_handlers() {
    extern "C" fn on_signal(_: libc::c_int) {
        // A single atomic store; safe in a signal handler.
        conlog_core::interrupt::request_interrupt();
    }

    unsafe {
        libc::signal(libc::SIGINT, on_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, on_signal as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install_signal_handlers() {}
