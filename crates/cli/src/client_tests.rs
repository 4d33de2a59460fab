// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tokio::net::UnixListener;
use warden_daemon::protocol::Request;

fn clear_env() {
    for var in ["CONTROLLER_STATE_DIR", "CONTROLLER_SOCKET_PATH", "XDG_RUNTIME_DIR", "XDG_STATE_HOME"] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn connect_fails_when_no_socket_present() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("CONTROLLER_SOCKET_PATH", dir.path().join("missing.sock"));
    let err = DaemonClient::connect().unwrap_err();
    assert!(matches!(err, ClientError::DaemonNotRunning(_)));
    clear_env();
}

/// Accept one connection, read one request, reply with a canned response.
async fn serve_once(listener: UnixListener, response: Response) {
    let (stream, _) = listener.accept().await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    let _request: Request = {
        let bytes = protocol::read_message(&mut reader).await.unwrap();
        protocol::decode(&bytes).unwrap()
    };
    let data = protocol::encode(&response).unwrap();
    protocol::write_message(&mut writer, &data).await.unwrap();
}

#[tokio::test]
#[serial]
async fn send_round_trips_a_pong() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("controller.sock");
    std::env::set_var("CONTROLLER_SOCKET_PATH", &socket_path);
    let listener = UnixListener::bind(&socket_path).unwrap();
    let server = tokio::spawn(serve_once(listener, Response::Pong));

    let client = DaemonClient::connect().unwrap();
    let response = client.send(&Request::Ping).await.unwrap();
    assert!(matches!(response, Response::Pong));

    server.await.unwrap();
    clear_env();
}

#[tokio::test]
#[serial]
async fn send_simple_surfaces_a_rejection() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("controller.sock");
    std::env::set_var("CONTROLLER_SOCKET_PATH", &socket_path);
    let listener = UnixListener::bind(&socket_path).unwrap();
    let server = tokio::spawn(serve_once(listener, Response::Error { message: "no such task".to_string() }));

    let client = DaemonClient::connect().unwrap();
    let err = client.send_simple(&Request::Kill { task_id: "t1".to_string(), reason: None }).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(msg) if msg == "no such task"));

    server.await.unwrap();
    clear_env();
}

#[tokio::test]
#[serial]
async fn subscribe_stops_after_on_event_returns_false() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("controller.sock");
    std::env::set_var("CONTROLLER_SOCKET_PATH", &socket_path);
    let listener = UnixListener::bind(&socket_path).unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let _request: Request = {
            let bytes = protocol::read_message(&mut reader).await.unwrap();
            protocol::decode(&bytes).unwrap()
        };
        for _ in 0..2 {
            let event = warden_core::Event::new(0, None, None, warden_core::EventKind::Heartbeat);
            let data = protocol::encode(&Response::Event { event }).unwrap();
            protocol::write_message(&mut writer, &data).await.unwrap();
        }
    });

    let client = DaemonClient::connect().unwrap();
    let mut seen = 0;
    client.subscribe(None, |_event| {
        seen += 1;
        false
    }).await.unwrap();
    assert_eq!(seen, 1);

    let _ = server.abort();
}
