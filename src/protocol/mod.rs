// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementations for talking to the Mount Kelvin service.
//!
//! # Protocols
//!
//! - [`CommandClient`]: HTTP commands (`applyDevice`, `applyScene`)
//! - [`SocketIoTransport`]: realtime site updates over Socket.IO
//!
//! The realtime side is abstracted behind the [`Transport`] trait so the
//! [`Communicator`](crate::Communicator) can be driven by any event source.

pub mod engine_io;
mod http;
#[cfg(feature = "socketio")]
mod socketio;

pub use http::{CommandClient, DeviceCommand, DeviceCommandState, SceneCommand};
#[cfg(feature = "socketio")]
pub use socketio::SocketIoTransport;

use serde_json::Value;

use crate::error::ProtocolError;

/// Something that happened on a realtime transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The session is established and events can be emitted.
    Connected,
    /// The server pushed a named event.
    Event {
        /// Event name.
        name: String,
        /// Event payload.
        payload: Value,
    },
    /// The connection was lost. The session may be resumed by connecting
    /// again.
    Disconnected {
        /// Human readable reason.
        reason: String,
    },
    /// The server ended the session on purpose.
    Closed {
        /// Human readable reason.
        reason: String,
    },
}

impl TransportEvent {
    /// Creates an event notification.
    #[must_use]
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            name: name.into(),
            payload,
        }
    }

    /// Creates a disconnect notification.
    #[must_use]
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected {
            reason: reason.into(),
        }
    }

    /// Creates a notification for a session the server ended.
    #[must_use]
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::Closed {
            reason: reason.into(),
        }
    }
}

/// Trait for realtime event sources.
///
/// A transport is driven by a single task: [`connect`](Self::connect), then
/// [`next_event`](Self::next_event) until it returns `None` or reports a
/// disconnect. After [`TransportEvent::Disconnected`] the same transport can
/// be connected again. Heartbeats and other protocol housekeeping happen
/// inside `next_event`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Opens the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection cannot be established.
    async fn connect(&mut self) -> Result<(), ProtocolError>;

    /// Emits a named event to the server.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport is not connected or the
    /// write fails.
    async fn emit(&mut self, event: &str, payload: Value) -> Result<(), ProtocolError>;

    /// Waits for the next event.
    ///
    /// Returns `Ok(None)` once the transport is closed.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if reading fails or a frame is malformed.
    async fn next_event(&mut self) -> Result<Option<TransportEvent>, ProtocolError>;
}
