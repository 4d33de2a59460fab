// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wardend: the supervised execution controller's daemon process.
//!
//! Owns the Supervisor, the Phase Controller, and the Event Log. Exposes
//! them over a Unix socket (see `listener`) and otherwise just waits for a
//! shutdown signal.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Instant;

use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{broadcast, mpsc, Notify};
use tracing::{error, info, warn};

use warden_adapters::RealPtyAdapter;
use warden_daemon::listener::{ListenCtx, Listener};
use warden_daemon::{Config, DaemonError};
use warden_rules::RuleSet;
use warden_storage::EventLog;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: usize = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("wardend {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: wardend [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    rotate_log_if_needed(&config.log_path);
    let _log_guard = setup_logging(&config)?;

    info!("starting controller daemon");

    let lock = match warden_daemon::lock::acquire(&config.lock_path) {
        Ok(lock) => lock,
        Err(DaemonError::LockHeld(path)) => {
            eprintln!("wardend is already running (lock held at {})", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to acquire daemon lock");
            return Err(e.into());
        }
    };

    match run(config).await {
        Ok(()) => {
            drop(lock);
            info!("controller daemon stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "controller daemon exited with an error");
            drop(lock);
            Err(e.into())
        }
    }
}

async fn run(config: Config) -> Result<(), DaemonError> {
    let ruleset = Arc::new(match &config.rules_path {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::parse(warden_rules::DEFAULT_RULE_SET_TOML).expect("built-in rule set is well-formed"),
    });

    let adapters: Vec<Arc<RealPtyAdapter>> =
        (0..config.max_workers.max(1)).map(|_| Arc::new(RealPtyAdapter::new())).collect();

    let command = config.command.clone();
    let args = config.args.clone();
    let working_dir = config.working_dir.to_string_lossy().into_owned();
    let spawn_spec_fn: warden_engine::SpawnSpecFn = Arc::new(move |task| {
        let mut spec = warden_adapters::SpawnSpec::new(command.clone());
        spec.args = args.clone();
        spec.cwd = Some(working_dir.clone());
        if let Some(phase) = &task.phase_scope {
            let phase_cfg = warden_engine::default_phases().into_iter().find(|p| &p.name == phase);
            if let Some(phase_cfg) = phase_cfg {
                spec.env = warden_engine::phase_env(&phase_cfg, &working_dir);
            }
        }
        spec
    });

    let (event_tx, mut event_rx) = mpsc::channel(1024);
    let supervisor = warden_engine::spawn(
        adapters,
        ruleset,
        spawn_spec_fn,
        std::collections::HashMap::new(),
        config.supervisor_config(),
        warden_core::SystemClock,
        event_tx,
    );

    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let unix_listener = UnixListener::bind(&config.socket_path)?;

    let shutdown = Arc::new(Notify::new());
    let (events, _) = broadcast::channel(4096);
    let ctx = Arc::new(ListenCtx {
        supervisor,
        events: events.clone(),
        phases: config.phases(),
        root: config.working_dir.clone(),
        start_time: Instant::now(),
        shutdown: Arc::clone(&shutdown),
    });

    let mut event_log = EventLog::open(&config.event_log_path, config.event_log_max_bytes)?;
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Err(err) = event_log.append(&event) {
                warn!(error = %err, "failed to append to event log");
            }
            let _ = events.send(event);
            if event_log.needs_flush() {
                if let Err(err) = event_log.flush() {
                    warn!(error = %err, "failed to flush event log");
                }
            }
        }
    });

    let listener = Listener::new(unix_listener, Arc::clone(&ctx));
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %config.socket_path.display(), "daemon ready");
    println!("READY");

    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested via command"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    let _ = std::fs::remove_file(&config.socket_path);
    Ok(())
}

fn print_help() {
    println!("wardend {}", env!("CARGO_PKG_VERSION"));
    println!("Supervised execution controller daemon");
    println!();
    println!("USAGE:");
    println!("    wardend");
    println!();
    println!("wardend is typically started by the `warden` CLI and should not be");
    println!("invoked directly. It listens on a Unix socket for commands from `warden`.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(DaemonError::NoStateDir)?,
        config.log_path.file_name().ok_or(DaemonError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
