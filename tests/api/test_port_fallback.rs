// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup port fallback

use paddle_ocr_gateway::api::{bind_first_available, ServeError};
use tokio::net::TcpListener;

/// Reserve an ephemeral port and keep it occupied
async fn occupied_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Find a port that is free right now
async fn free_port() -> u16 {
    let (listener, port) = occupied_port().await;
    drop(listener);
    port
}

#[tokio::test]
async fn test_binds_first_free_port() {
    let port = free_port().await;
    let listener = bind_first_available("127.0.0.1", &[port]).await.unwrap();
    assert_eq!(listener.local_addr().unwrap().port(), port);
}

#[tokio::test]
async fn test_skips_occupied_port() {
    let (_held, busy) = occupied_port().await;
    let free = free_port().await;

    let listener = bind_first_available("127.0.0.1", &[busy, free]).await.unwrap();
    assert_eq!(listener.local_addr().unwrap().port(), free);
}

#[tokio::test]
async fn test_fails_when_all_ports_busy() {
    let (_a, first) = occupied_port().await;
    let (_b, second) = occupied_port().await;

    let result = bind_first_available("127.0.0.1", &[first, second]).await;
    match result {
        Err(ServeError::NoPortAvailable { host, ports }) => {
            assert_eq!(host, "127.0.0.1");
            assert_eq!(ports, vec![first, second]);
        }
        other => panic!("expected NoPortAvailable, got {:?}", other.map(|l| l.local_addr())),
    }
}
