// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Socket.IO transport over a websocket.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::config::{EngineIoVersion, SiteConfig};
use crate::error::ProtocolError;
use crate::protocol::engine_io::{Packet, SocketPacket};
use crate::protocol::{Transport, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What woke up the read loop.
enum Wake {
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    Heartbeat,
    PingTimeout,
}

/// Socket.IO client transport for the Mount Kelvin realtime API.
///
/// Connects to `{base}/socket.io/?EIO=<v>&transport=websocket` with the
/// base URL's scheme switched to `ws`/`wss`. Only the default namespace is
/// used.
///
/// A session that stays silent for longer than `pingInterval + pingTimeout`
/// is treated as dead and reported as [`TransportEvent::Disconnected`].
/// Reconnecting is done by calling [`connect`](Transport::connect) again.
///
/// # Examples
///
/// ```no_run
/// use mount_kelvin::protocol::{SocketIoTransport, Transport, TransportEvent};
/// use mount_kelvin::SiteConfig;
///
/// # async fn example() -> mount_kelvin::Result<()> {
/// let config = SiteConfig::new("my-site-key")?;
/// let mut transport = SocketIoTransport::new(&config)?;
///
/// transport.connect().await?;
/// while let Some(event) = transport.next_event().await? {
///     if event == TransportEvent::Connected {
///         transport
///             .emit("subscribe", serde_json::json!({ "siteKey": "my-site-key" }))
///             .await?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct SocketIoTransport {
    endpoint: Url,
    version: EngineIoVersion,
    socket: Option<WsStream>,
    /// Client heartbeat period, only used with Engine.IO v3.
    ping_interval: Option<Duration>,
    next_ping: Option<Instant>,
    /// Longest silence tolerated from the server.
    ping_window: Option<Duration>,
    ping_deadline: Option<Instant>,
}

impl std::fmt::Debug for SocketIoTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketIoTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("version", &self.version)
            .field("connected", &self.socket.is_some())
            .finish_non_exhaustive()
    }
}

impl SocketIoTransport {
    /// Creates a transport for the configured site.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` if the base URL cannot be
    /// turned into a websocket URL.
    pub fn new(config: &SiteConfig) -> Result<Self, ProtocolError> {
        let version = config.engine_io_version();
        Ok(Self {
            endpoint: Self::endpoint(config.base_url(), version)?,
            version,
            socket: None,
            ping_interval: None,
            next_ping: None,
            ping_window: None,
            ping_deadline: None,
        })
    }

    /// Builds the websocket endpoint for an API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` for schemes other than
    /// `http`/`https`.
    pub fn endpoint(base_url: &Url, version: EngineIoVersion) -> Result<Url, ProtocolError> {
        let scheme = match base_url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => {
                return Err(ProtocolError::InvalidAddress(format!(
                    "unsupported scheme {other}"
                )));
            }
        };

        let mut url = base_url.clone();
        url.set_scheme(scheme)
            .map_err(|()| ProtocolError::InvalidAddress(base_url.to_string()))?;
        url.set_path("/socket.io/");
        url.set_query(Some(&format!(
            "EIO={}&transport=websocket",
            version.as_query()
        )));
        Ok(url)
    }

    /// Returns the websocket endpoint.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.endpoint
    }

    /// Returns `true` while the websocket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), ProtocolError> {
        let socket = self.socket.as_mut().ok_or(ProtocolError::NotConnected)?;
        let frame = packet.encode();
        tracing::trace!(frame = %frame, "Sending engine.io frame");
        socket.send(Message::text(frame)).await?;
        Ok(())
    }

    async fn wait(&mut self) -> Option<Wake> {
        let heartbeat = self.next_ping;
        let deadline = self.ping_deadline;
        let socket = self.socket.as_mut()?;

        let wake = tokio::select! {
            frame = socket.next() => Wake::Frame(frame),
            () = sleep_until(heartbeat) => Wake::Heartbeat,
            () = sleep_until(deadline) => Wake::PingTimeout,
        };
        Some(wake)
    }

    fn close(&mut self) {
        self.socket = None;
        self.next_ping = None;
        self.ping_interval = None;
        self.ping_window = None;
        self.ping_deadline = None;
    }

    /// Handles one engine.io packet, returning an event for the caller if
    /// the packet produced one.
    async fn handle_packet(
        &mut self,
        packet: Packet,
    ) -> Result<Option<TransportEvent>, ProtocolError> {
        match packet {
            Packet::Open(info) => {
                tracing::debug!(
                    sid = %info.sid,
                    ping_interval = info.ping_interval,
                    ping_timeout = info.ping_timeout,
                    "Engine.io session opened"
                );
                if info.ping_interval > 0 && info.ping_timeout > 0 {
                    let window = Duration::from_millis(info.ping_interval + info.ping_timeout);
                    self.ping_window = Some(window);
                    self.ping_deadline = Some(Instant::now() + window);
                }
                match self.version {
                    EngineIoVersion::V4 => {
                        self.send_packet(&Packet::Message(SocketPacket::Connect(None)))
                            .await?;
                    }
                    EngineIoVersion::V3 => {
                        if info.ping_interval > 0 {
                            let interval = Duration::from_millis(info.ping_interval);
                            self.ping_interval = Some(interval);
                            self.next_ping = Some(Instant::now() + interval);
                        }
                    }
                }
                Ok(None)
            }
            Packet::Ping => {
                self.send_packet(&Packet::Pong).await?;
                Ok(None)
            }
            Packet::Pong | Packet::Upgrade | Packet::Noop => Ok(None),
            Packet::Close => {
                self.close();
                Ok(Some(TransportEvent::disconnected("server closed the session")))
            }
            Packet::Message(SocketPacket::Connect(_)) => Ok(Some(TransportEvent::Connected)),
            Packet::Message(SocketPacket::Disconnect) => {
                self.close();
                Ok(Some(TransportEvent::closed("server disconnected the namespace")))
            }
            Packet::Message(SocketPacket::Event { name, payload }) => {
                Ok(Some(TransportEvent::Event { name, payload }))
            }
            Packet::Message(SocketPacket::Ack(_)) => Ok(None),
            Packet::Message(SocketPacket::ConnectError(err)) => {
                self.close();
                Err(ProtocolError::ConnectionFailed(format!(
                    "namespace connect refused: {err}"
                )))
            }
        }
    }
}

impl Transport for SocketIoTransport {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        tracing::debug!(url = %self.endpoint, "Opening websocket");
        self.close();
        let (socket, _response) = connect_async(self.endpoint.as_str()).await?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn emit(&mut self, event: &str, payload: Value) -> Result<(), ProtocolError> {
        self.send_packet(&Packet::Message(SocketPacket::event(event, payload)))
            .await
    }

    async fn next_event(&mut self) -> Result<Option<TransportEvent>, ProtocolError> {
        loop {
            let Some(wake) = self.wait().await else {
                return Ok(None);
            };

            let frame = match wake {
                Wake::Heartbeat => {
                    self.send_packet(&Packet::Ping).await?;
                    self.next_ping = self.ping_interval.map(|interval| Instant::now() + interval);
                    continue;
                }
                Wake::PingTimeout => {
                    tracing::warn!(url = %self.endpoint, "No heartbeat from server");
                    self.close();
                    return Ok(Some(TransportEvent::disconnected("ping timeout")));
                }
                Wake::Frame(None) => {
                    self.close();
                    return Ok(Some(TransportEvent::disconnected("websocket stream ended")));
                }
                Wake::Frame(Some(Err(e))) => {
                    self.close();
                    return Err(e.into());
                }
                Wake::Frame(Some(Ok(message))) => {
                    self.ping_deadline = self.ping_window.map(|window| Instant::now() + window);
                    message
                }
            };

            match frame {
                Message::Text(text) => {
                    let packet = match Packet::decode(text.as_str()) {
                        Ok(packet) => packet,
                        Err(e) => {
                            tracing::warn!(error = %e, "Ignoring malformed frame");
                            continue;
                        }
                    };
                    if let Some(event) = self.handle_packet(packet).await? {
                        return Ok(Some(event));
                    }
                }
                Message::Close(frame) => {
                    self.close();
                    let reason = frame.map_or_else(
                        || "websocket closed".to_string(),
                        |f| format!("websocket closed: {}", f.reason.as_str()),
                    );
                    return Ok(Some(TransportEvent::disconnected(reason)));
                }
                Message::Binary(_) => {
                    tracing::trace!("Ignoring binary frame");
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

/// Sleeps until `deadline`, or forever without one.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
