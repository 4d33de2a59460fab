// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (spec §6 "Configuration"): a TOML file with
//! environment-variable overrides for the paths a freshly installed
//! daemon needs before it can even read that file.

use crate::error::DaemonError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the state directory: `CONTROLLER_STATE_DIR` > `XDG_STATE_HOME/controller` >
/// `~/.local/state/controller`.
fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("CONTROLLER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("controller"));
    }
    let home = std::env::var("HOME").map_err(|_| DaemonError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/controller"))
}

/// Resolve the control-plane socket path: `CONTROLLER_SOCKET_PATH` >
/// `$XDG_RUNTIME_DIR/controller.sock` > `<state_dir>/controller.sock`.
fn default_socket_path(state_dir: &std::path::Path) -> PathBuf {
    if let Ok(path) = std::env::var("CONTROLLER_SOCKET_PATH") {
        return PathBuf::from(path);
    }
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("controller.sock");
    }
    state_dir.join("controller.sock")
}

/// Raw, all-optional shape deserialized from the TOML config file (spec
/// §6's recognized option list); every field falls back to its documented
/// default when absent.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    max_workers: Option<usize>,
    heartbeat_interval_ms: Option<u64>,
    stream_window_chars: Option<usize>,
    output_buffer_bytes: Option<usize>,
    intervention_grace_ms: Option<u64>,
    stall_threshold_ms: Option<u64>,
    worker_retry_limit: Option<u32>,
    acceptance_min_file_bytes: Option<u64>,
    #[serde(default)]
    phase_budgets: HashMap<String, u64>,
    rules_path: Option<PathBuf>,
    event_log_path: Option<PathBuf>,
    event_log_max_bytes: Option<u64>,
    socket_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    log_level: Option<String>,
    working_dir: Option<PathBuf>,
}

/// Fully resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The child program invoked once per task, under a pty.
    pub command: String,
    pub args: Vec<String>,
    pub max_workers: usize,
    pub heartbeat_interval: Duration,
    pub stream_window_chars: usize,
    pub output_buffer_bytes: usize,
    pub intervention_grace: Duration,
    pub stall_threshold: Duration,
    pub worker_retry_limit: u32,
    pub acceptance_min_file_bytes: u64,
    /// Per-phase duration overrides (minutes), keyed by phase name.
    pub phase_budgets: HashMap<String, u64>,
    pub rules_path: Option<PathBuf>,
    pub event_log_path: PathBuf,
    pub event_log_max_bytes: u64,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
    pub state_dir: PathBuf,
    /// Directory phase artifacts are written to and resolved against (spec
    /// §6 "Artifact gating... relative to the controller's working
    /// directory"). Defaults to the directory `wardend` was started in.
    pub working_dir: PathBuf,
}

impl Config {
    /// Load configuration: `CONTROLLER_CONFIG_PATH` env var, or
    /// `<state_dir>/config.toml` if present, layered with built-in
    /// defaults. The child `command` has no default — it names the
    /// program under supervision and must be configured explicitly, via
    /// the config file or `CONTROLLER_COMMAND`.
    pub fn load() -> Result<Self, DaemonError> {
        let state_dir = state_dir()?;
        let config_path = std::env::var("CONTROLLER_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| state_dir.join("config.toml"));

        let file: FileConfig = if config_path.exists() {
            let text = std::fs::read_to_string(&config_path)?;
            toml::from_str(&text).map_err(|source| DaemonError::ConfigParse { path: config_path, source })?
        } else {
            FileConfig::default()
        };

        let command = std::env::var("CONTROLLER_COMMAND").ok().or(file.command).ok_or(DaemonError::MissingCommand)?;

        let socket_path = file.socket_path.unwrap_or_else(|| default_socket_path(&state_dir));
        let working_dir = match std::env::var("CONTROLLER_WORKING_DIR").ok().map(PathBuf::from).or(file.working_dir) {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        Ok(Self {
            command,
            args: file.args,
            max_workers: file.max_workers.unwrap_or(4),
            heartbeat_interval: Duration::from_millis(file.heartbeat_interval_ms.unwrap_or(180_000)),
            stream_window_chars: file.stream_window_chars.unwrap_or(1000),
            output_buffer_bytes: file.output_buffer_bytes.unwrap_or(1_000_000),
            intervention_grace: Duration::from_millis(file.intervention_grace_ms.unwrap_or(500)),
            stall_threshold: Duration::from_millis(file.stall_threshold_ms.unwrap_or(30_000)),
            worker_retry_limit: file.worker_retry_limit.unwrap_or(1),
            acceptance_min_file_bytes: file.acceptance_min_file_bytes.unwrap_or(warden_engine::DEFAULT_MIN_FILE_BYTES),
            phase_budgets: file.phase_budgets,
            rules_path: file.rules_path,
            event_log_path: file.event_log_path.unwrap_or_else(|| state_dir.join("events.jsonl")),
            event_log_max_bytes: file.event_log_max_bytes.unwrap_or(64 * 1024 * 1024),
            lock_path: state_dir.join("daemon.pid"),
            log_path: file.log_path.unwrap_or_else(|| state_dir.join("daemon.log")),
            log_level: file.log_level.unwrap_or_else(|| "info".to_string()),
            socket_path,
            state_dir,
            working_dir,
        })
    }

    /// Apply `phase_budgets` overrides on top of the default phase table.
    pub fn phases(&self) -> Vec<warden_core::PhaseConfig> {
        let mut phases = warden_engine::default_phases();
        for phase in &mut phases {
            if let Some(&minutes) = self.phase_budgets.get(&phase.name) {
                phase.duration_minutes = minutes;
            }
        }
        phases
    }

    pub fn supervisor_config(&self) -> warden_engine::SupervisorConfig {
        warden_engine::SupervisorConfig {
            worker_retry_limit: self.worker_retry_limit,
            executor_config: warden_engine::PtyExecutorConfig {
                heartbeat_interval: self.heartbeat_interval,
                stream_window_chars: self.stream_window_chars,
                stall_threshold: self.stall_threshold,
                intervention_grace: self.intervention_grace,
                output_buffer_bytes: self.output_buffer_bytes,
            },
            min_acceptance_file_bytes: self.acceptance_min_file_bytes,
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
