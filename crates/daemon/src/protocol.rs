// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication (spec §4.4, §6).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use warden_core::{AcceptanceCriteria, CycleReport, Event};
use warden_engine::StatusSnapshot;

/// Request from a client (the `warden` CLI, or any other attached client)
/// to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,

    /// Version handshake, exchanged as the first frame of a connection.
    Hello { version: String },

    /// Create a task.
    Submit {
        prompt: String,
        #[serde(default)]
        priority: i64,
        #[serde(default)]
        acceptance: AcceptanceCriteria,
        #[serde(default)]
        phase_scope: Option<String>,
    },

    /// Deliver corrective text to a running task.
    Intervene { task_id: String, text: String },

    /// Terminate a task.
    Kill {
        task_id: String,
        #[serde(default)]
        reason: Option<String>,
    },

    /// Respond to an approval gate raised by an intervention-declared
    /// custom rule. No shipped rule in this implementation raises such a
    /// gate (see `DESIGN.md`); accepted for wire-protocol completeness.
    Approve { task_id: String },
    Deny { task_id: String },

    /// Subscribe to the live event stream, optionally filtered to one task.
    /// Once sent, the connection is held open and every matching `Event`
    /// is pushed to the client as `Response::Event` until it disconnects.
    Subscribe {
        #[serde(default)]
        task_id: Option<String>,
    },

    /// Get daemon/supervisor status.
    Status,

    /// Run one full phase-controller cycle against a fresh prompt,
    /// blocking until the cycle completes or a phase fails.
    RunCycle { prompt: String },

    /// Request daemon shutdown.
    Shutdown {
        /// Kill all in-flight tasks before stopping.
        #[serde(default)]
        kill: bool,
    },
}

/// Response from the daemon to a client.
///
/// Does not derive `PartialEq`: `StatusSnapshot` and `CycleReport` carry
/// `Task`/`PhaseRun` values that don't implement it either, and nothing
/// here needs whole-enum equality outside of JSON round-trip tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success.
    Ok,

    /// Health check response.
    Pong,

    /// Version handshake response.
    Hello { version: String },

    /// Task was created.
    Submitted { task_id: String },

    /// Current supervisor status.
    Status { snapshot: StatusSnapshot },

    /// Result of a full phase-controller cycle.
    CycleResult { report: CycleReport },

    /// One event pushed to a `Subscribe`d client.
    Event { event: Event },

    /// Daemon is shutting down.
    ShuttingDown,

    /// Error response.
    Error { message: String },
}

/// Protocol-level (framing) errors, distinct from request-handling errors
/// which are carried inside `Response::Error`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timeout")]
    Timeout,
}

/// Maximum message size (64 MiB, spec §4.4 default).
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Default IPC timeout.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Protocol version, exchanged in the initial `Hello` frame so client/server
/// skew is detectable (spec §4.4 "ambient detail"). The reference codebase
/// appends a build git hash; this workspace has no build script producing
/// one, so the crate version alone is the compatibility token.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encode a message to JSON bytes (without the length prefix).
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: json.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(json)
}

/// Decode a message from wire format.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read a length-prefixed message from an async reader.
pub async fn read_message<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write a length-prefixed message to an async writer.
pub async fn write_message<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let len = data.len();
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }
    writer.write_all(&(len as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a request with timeout.
pub async fn read_request<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader)).await.map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write a response with timeout.
pub async fn write_response<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data)).await.map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
