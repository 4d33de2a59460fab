// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use tokio::net::UnixStream;
use warden_daemon::protocol::{self, ProtocolError, Request, Response};

use crate::error::ClientError;

const TIMEOUT: Duration = Duration::from_secs(5);

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an already-running daemon. Does not start one — per this
    /// controller's scope, daemon lifecycle is the operator's concern (a
    /// systemd unit, a supervisor, or running `wardend` directly), not the
    /// CLI's.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = crate::env::socket_path()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path));
        }
        Ok(Self { socket_path })
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(request)?;
        tokio::time::timeout(TIMEOUT, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes = tokio::time::timeout(TIMEOUT, protocol::read_message(&mut reader))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Open a connection and stream `Event`s from a `Subscribe` request
    /// until the daemon closes the connection or `on_event` asks to stop.
    pub async fn subscribe(
        &self,
        task_id: Option<String>,
        mut on_event: impl FnMut(warden_core::Event) -> bool,
    ) -> Result<(), ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&Request::Subscribe { task_id })?;
        protocol::write_message(&mut writer, &data).await?;

        loop {
            let bytes = match protocol::read_message(&mut reader).await {
                Ok(bytes) => bytes,
                Err(ProtocolError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            match protocol::decode(&bytes)? {
                Response::Event { event } => {
                    if !on_event(event) {
                        return Ok(());
                    }
                }
                other => return Err(ClientError::Rejected(format!("unexpected response while subscribed: {other:?}"))),
            }
        }
    }

    /// Helper for requests that expect `Ok` or `Error`.
    pub async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
