// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the Socket.IO transport against a local websocket
//! server.

#![cfg(feature = "socketio")]

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use mount_kelvin::protocol::{SocketIoTransport, Transport, TransportEvent};
use mount_kelvin::{EngineIoVersion, Integration, ReconnectPolicy, SiteConfig};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

const SITE_FRAME: &str = r#"42["site",{"data":{"locations":{"rooms":[{"id":"r1","name":"Kitchen"}]},"devices":[{"id":"d1","type":"dimmable","name":"Lamp","roomId":"r1","state":{"on":true,"bri":42}}],"scenes":[{"id":"s1","name":"Dinner"}]}}]"#;

const OPEN_V4: &str = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;
const SUBSCRIBE_FRAME: &str = r#"42["subscribe",{"siteKey":"site-key"}]"#;

type ServerSocket = WebSocketStream<TcpStream>;

async fn listen() -> (TcpListener, SiteConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let config = SiteConfig::new("site-key")
        .unwrap()
        .with_base_url(&format!("http://{address}"))
        .unwrap()
        .with_connect_timeout(Duration::from_secs(5));
    (listener, config)
}

async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn send(socket: &mut ServerSocket, frame: &str) {
    socket.send(Message::text(frame)).await.unwrap();
}

async fn recv(socket: &mut ServerSocket) -> String {
    loop {
        match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => return text.as_str().to_string(),
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

/// Plays the Engine.IO v4 server side and returns every frame received.
fn serve_v4(listener: TcpListener) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let mut received = Vec::new();

        send(&mut socket, OPEN_V4).await;
        received.push(recv(&mut socket).await);

        send(&mut socket, r#"40{"sid":"ns"}"#).await;
        received.push(recv(&mut socket).await);

        send(&mut socket, "2").await;
        received.push(recv(&mut socket).await);

        send(&mut socket, "42[\"status\",{}]").await;
        send(&mut socket, "4garbage").await;
        send(&mut socket, SITE_FRAME).await;
        send(&mut socket, "41").await;

        received
    })
}

#[tokio::test]
async fn v4_handshake_subscribe_and_site_event() {
    let (listener, config) = listen().await;
    let server = serve_v4(listener);

    let mut transport = SocketIoTransport::new(&config).unwrap();
    transport.connect().await.unwrap();
    assert!(transport.is_connected());

    assert_eq!(
        transport.next_event().await.unwrap(),
        Some(TransportEvent::Connected)
    );
    transport
        .emit("subscribe", json!({ "siteKey": "site-key" }))
        .await
        .unwrap();

    let status = transport.next_event().await.unwrap();
    assert_eq!(status, Some(TransportEvent::event("status", json!({}))));

    let Some(TransportEvent::Event { name, payload }) = transport.next_event().await.unwrap()
    else {
        panic!("expected site event");
    };
    assert_eq!(name, "site");
    assert_eq!(payload["data"]["devices"][0]["state"]["bri"], 42);

    assert!(matches!(
        transport.next_event().await.unwrap(),
        Some(TransportEvent::Closed { .. })
    ));
    assert!(!transport.is_connected());
    assert_eq!(transport.next_event().await.unwrap(), None);

    let received = server.await.unwrap();
    assert_eq!(received, ["40", SUBSCRIBE_FRAME, "3"]);
}

#[tokio::test]
async fn v3_client_sends_heartbeats() {
    let (listener, config) = listen().await;
    let config = config.with_engine_io_version(EngineIoVersion::V3);

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;

        send(
            &mut socket,
            r#"0{"sid":"abc","upgrades":[],"pingInterval":100,"pingTimeout":1000}"#,
        )
        .await;
        send(&mut socket, "40").await;

        let mut frames: Vec<String> = Vec::new();
        while !(frames.iter().any(|f| f == "2") && frames.iter().any(|f| f.starts_with("42"))) {
            frames.push(recv(&mut socket).await);
        }
        send(&mut socket, "3").await;
        send(&mut socket, SITE_FRAME).await;
        socket.close(None).await.unwrap();

        frames
    });

    let mut transport = SocketIoTransport::new(&config).unwrap();
    assert!(transport.url().as_str().contains("EIO=3"));
    transport.connect().await.unwrap();

    assert_eq!(
        transport.next_event().await.unwrap(),
        Some(TransportEvent::Connected)
    );
    transport
        .emit("subscribe", json!({ "siteKey": "site-key" }))
        .await
        .unwrap();

    let site = transport.next_event().await.unwrap();
    assert!(matches!(site, Some(TransportEvent::Event { ref name, .. }) if name == "site"));

    let frames = server.await.unwrap();
    assert!(frames.iter().any(|f| f == SUBSCRIBE_FRAME));
    assert!(frames.iter().all(|f| f != "40"));
}

#[tokio::test]
async fn integration_over_websocket() {
    let (listener, config) = listen().await;
    let server = serve_v4(listener);

    let mut integration = Integration::socketio(&config).unwrap();
    integration.run().await.unwrap();

    let light = integration.light("d1").unwrap();
    assert_eq!(light.room_name(), Some("Kitchen"));
    assert!(light.is_on());
    assert_eq!(integration.scenes().len(), 1);

    server.await.unwrap();
}

#[tokio::test]
async fn silent_server_is_detected() {
    let (listener, config) = listen().await;

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        send(
            &mut socket,
            r#"0{"sid":"abc","upgrades":[],"pingInterval":50,"pingTimeout":50}"#,
        )
        .await;
        assert_eq!(recv(&mut socket).await, "40");
        send(&mut socket, "40").await;

        // Never ping; wait for the client to hang up.
        while let Some(Ok(_)) = socket.next().await {}
    });

    let mut transport = SocketIoTransport::new(&config).unwrap();
    transport.connect().await.unwrap();
    assert_eq!(
        transport.next_event().await.unwrap(),
        Some(TransportEvent::Connected)
    );

    let event = tokio::time::timeout(Duration::from_secs(2), transport.next_event())
        .await
        .expect("dead session was not detected")
        .unwrap();
    assert_eq!(event, Some(TransportEvent::disconnected("ping timeout")));
    assert!(!transport.is_connected());

    server.await.unwrap();
}

#[tokio::test]
async fn server_pings_keep_session_alive() {
    let (listener, config) = listen().await;

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        send(
            &mut socket,
            r#"0{"sid":"abc","upgrades":[],"pingInterval":100,"pingTimeout":100}"#,
        )
        .await;
        assert_eq!(recv(&mut socket).await, "40");
        send(&mut socket, "40").await;

        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            send(&mut socket, "2").await;
            assert_eq!(recv(&mut socket).await, "3");
        }
        send(&mut socket, SITE_FRAME).await;
        send(&mut socket, "41").await;
    });

    let mut transport = SocketIoTransport::new(&config).unwrap();
    transport.connect().await.unwrap();
    assert_eq!(
        transport.next_event().await.unwrap(),
        Some(TransportEvent::Connected)
    );

    let site = transport.next_event().await.unwrap();
    assert!(matches!(site, Some(TransportEvent::Event { ref name, .. }) if name == "site"));

    server.await.unwrap();
}

#[tokio::test]
async fn integration_resubscribes_after_connection_loss() {
    let (listener, config) = listen().await;
    let config = config.with_reconnect(ReconnectPolicy::new(
        Duration::from_millis(10),
        Duration::from_millis(50),
    ));

    let server = tokio::spawn(async move {
        let mut subscribes = Vec::new();

        let mut first = accept(&listener).await;
        send(&mut first, OPEN_V4).await;
        assert_eq!(recv(&mut first).await, "40");
        send(&mut first, "40").await;
        subscribes.push(recv(&mut first).await);
        drop(first);

        let mut second = accept(&listener).await;
        send(&mut second, OPEN_V4).await;
        assert_eq!(recv(&mut second).await, "40");
        send(&mut second, "40").await;
        subscribes.push(recv(&mut second).await);
        send(&mut second, SITE_FRAME).await;
        send(&mut second, "41").await;

        subscribes
    });

    let mut integration = Integration::socketio(&config).unwrap();
    integration.run().await.unwrap();

    assert!(integration.light("d1").is_some());
    assert_eq!(server.await.unwrap(), [SUBSCRIBE_FRAME, SUBSCRIBE_FRAME]);
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    let (listener, config) = listen().await;
    drop(listener);

    let mut transport = SocketIoTransport::new(&config).unwrap();
    assert!(transport.connect().await.is_err());
    assert!(!transport.is_connected());
}
