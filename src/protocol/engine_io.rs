// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine.IO and Socket.IO packet codec.
//!
//! Mount Kelvin pushes site updates over Socket.IO. On a websocket every
//! text frame is one Engine.IO packet: a single digit packet type followed
//! by its data. Engine.IO `message` packets carry Socket.IO packets, which
//! again start with a type digit, then an optional `/namespace,` prefix, an
//! optional ack id and a JSON body.
//!
//! ```text
//! 0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}   open
//! 2                                                         ping
//! 40                                                        connect (default namespace)
//! 42["site",{"data":{...}}]                                 event
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProtocolError;

/// Handshake data sent by the server in the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    /// Engine.IO session id.
    pub sid: String,
    /// Heartbeat interval in milliseconds.
    #[serde(default)]
    pub ping_interval: u64,
    /// Heartbeat timeout in milliseconds.
    #[serde(default)]
    pub ping_timeout: u64,
}

/// An Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Session handshake.
    Open(OpenInfo),
    /// Session closed by the peer.
    Close,
    /// Heartbeat request.
    Ping,
    /// Heartbeat reply.
    Pong,
    /// Socket.IO payload.
    Message(SocketPacket),
    /// Transport upgrade marker.
    Upgrade,
    /// No-op packet.
    Noop,
}

/// A Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect request (client) or acknowledgement (server).
    Connect(Option<Value>),
    /// Namespace disconnect.
    Disconnect,
    /// Named event with its first argument.
    Event {
        /// Event name.
        name: String,
        /// First event argument, `Null` if none was sent.
        payload: Value,
    },
    /// Acknowledgement of an event sent with an ack id.
    Ack(Value),
    /// Namespace connection refused.
    ConnectError(Value),
}

impl Packet {
    /// Decodes a websocket text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnexpectedPacket` for empty frames, unknown
    /// packet types, binary Socket.IO packets and malformed JSON bodies.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ProtocolError::UnexpectedPacket("empty frame".to_string()))?;
        let body = chars.as_str();

        match kind {
            '0' => serde_json::from_str(body)
                .map(Self::Open)
                .map_err(|e| ProtocolError::UnexpectedPacket(format!("bad open packet: {e}"))),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => SocketPacket::decode(body).map(Self::Message),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ProtocolError::UnexpectedPacket(format!(
                "unknown engine packet type {other:?}"
            ))),
        }
    }

    /// Encodes the packet as a websocket text frame.
    ///
    /// Open packets are only ever sent by servers and encode to their type
    /// digit alone.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(_) => "0".to_string(),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Message(packet) => format!("4{}", packet.encode()),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    /// Creates an event packet.
    #[must_use]
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            name: name.into(),
            payload,
        }
    }

    fn decode(body: &str) -> Result<Self, ProtocolError> {
        let mut chars = body.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ProtocolError::UnexpectedPacket("empty message".to_string()))?;
        let data = skip_ack_id(skip_namespace(chars.as_str()));

        match kind {
            '0' => Ok(Self::Connect(parse_optional_json(data)?)),
            '1' => Ok(Self::Disconnect),
            '2' => decode_event(data),
            '3' => Ok(Self::Ack(parse_optional_json(data)?.unwrap_or(Value::Null))),
            '4' => Ok(Self::ConnectError(
                parse_optional_json(data)?.unwrap_or(Value::Null),
            )),
            '5' | '6' => Err(ProtocolError::UnexpectedPacket(
                "binary packets are not supported".to_string(),
            )),
            other => Err(ProtocolError::UnexpectedPacket(format!(
                "unknown socket packet type {other:?}"
            ))),
        }
    }

    fn encode(&self) -> String {
        match self {
            Self::Connect(None) => "0".to_string(),
            Self::Connect(Some(auth)) => format!("0{auth}"),
            Self::Disconnect => "1".to_string(),
            Self::Event { name, payload } => {
                let args = if payload.is_null() {
                    Value::Array(vec![Value::String(name.clone())])
                } else {
                    Value::Array(vec![Value::String(name.clone()), payload.clone()])
                };
                format!("2{args}")
            }
            Self::Ack(args) => format!("3{args}"),
            Self::ConnectError(err) => format!("4{err}"),
        }
    }
}

/// Strips a `/namespace,` prefix.
fn skip_namespace(data: &str) -> &str {
    if data.starts_with('/') {
        data.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        data
    }
}

/// Strips a leading numeric ack id.
fn skip_ack_id(data: &str) -> &str {
    data.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn parse_optional_json(data: &str) -> Result<Option<Value>, ProtocolError> {
    if data.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| ProtocolError::UnexpectedPacket(format!("bad packet body: {e}")))
}

fn decode_event(data: &str) -> Result<SocketPacket, ProtocolError> {
    let Some(Value::Array(mut args)) = parse_optional_json(data)? else {
        return Err(ProtocolError::UnexpectedPacket(
            "event body is not an array".to_string(),
        ));
    };
    if args.is_empty() {
        return Err(ProtocolError::UnexpectedPacket(
            "event without a name".to_string(),
        ));
    }

    let name = match args.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(ProtocolError::UnexpectedPacket(format!(
                "event name is not a string: {other}"
            )));
        }
    };
    let payload = if args.is_empty() {
        Value::Null
    } else {
        args.swap_remove(0)
    };

    Ok(SocketPacket::Event { name, payload })
}
