// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden` - thin CLI client for `wardend`.

mod client;
mod commands;
mod env;
mod error;

use anyhow::Result;
use clap::Parser;

use crate::client::DaemonClient;
use crate::commands::Command;

#[derive(Parser)]
#[command(name = "warden", version, about = "Control a running wardend daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::connect()?;
    if let Err(err) = cli.command.run(client).await {
        eprintln!("error: {}", format_error(&err));
        std::process::exit(1);
    }
    Ok(())
}

/// Render an `anyhow` error chain without repeating the same message twice
/// when a wrapping context matches its source verbatim.
fn format_error(err: &anyhow::Error) -> String {
    let mut parts = vec![err.to_string()];
    for cause in err.chain().skip(1) {
        let rendered = cause.to_string();
        if parts.last().map(|s| s.as_str()) != Some(rendered.as_str()) {
            parts.push(rendered);
        }
    }
    parts.join(": ")
}
