// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Realtime subscription and command sink for one site.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::watch;

use crate::config::{ReconnectPolicy, SiteConfig, SiteKey};
use crate::error::ProtocolError;
use crate::model::{Light, Scene};
use crate::protocol::{CommandClient, Transport, TransportEvent};
use crate::snapshot::parse_site_event;
use crate::subscription::SiteCallbacks;
use crate::types::Brightness;

/// Name of the event carrying site snapshots.
pub const SITE_EVENT: &str = "site";

/// Name of the event requesting snapshots for a site.
pub const SUBSCRIBE_EVENT: &str = "subscribe";

/// Connection state of a [`Communicator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. Initial and final state.
    Disconnected,
    /// Opening the realtime connection.
    Connecting,
    /// Subscribed and receiving snapshots.
    Connected,
    /// The session was lost and is being resumed.
    Reconnecting {
        /// Attempt number, counted from 1 for each lost session.
        attempt: u32,
    },
    /// The connection attempt or the session failed.
    Failed(String),
}

impl ConnectionState {
    /// Returns true if snapshots are being received.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the last session ended with an error.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Subscribes to one site and dispatches its snapshots.
///
/// [`run`](Self::run) connects the transport, emits `subscribe` with the
/// site key once the session is up, then parses every `site` event and
/// hands the lights and scenes to the registered callbacks. Events are
/// handled strictly one at a time.
///
/// A lost session is resumed following the configured
/// [`ReconnectPolicy`], and `subscribe` is emitted again once the new
/// session is up. `run` returns when the server closes the session, when
/// the transport has no more events, or when reconnecting gives up.
///
/// # Examples
///
/// ```no_run
/// use mount_kelvin::{Communicator, SiteConfig};
///
/// # async fn example() -> mount_kelvin::Result<()> {
/// let config = SiteConfig::from_env()?;
/// let mut communicator = Communicator::socketio(&config)?;
///
/// communicator.callbacks().on_lights_updated(|lights| {
///     println!("{} lights", lights.len());
///     Ok(())
/// });
///
/// communicator.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct Communicator<T> {
    transport: T,
    commands: CommandClient,
    site_key: SiteKey,
    connect_timeout: Duration,
    reconnect: ReconnectPolicy,
    callbacks: Arc<SiteCallbacks>,
    state_tx: watch::Sender<ConnectionState>,
}

/// How a session ended.
enum SessionEnd {
    /// Closed by the server, or the transport ran out of events.
    Closed,
    /// Connection lost.
    Lost(String),
}

#[cfg(feature = "socketio")]
impl Communicator<crate::protocol::SocketIoTransport> {
    /// Creates a communicator using the Socket.IO transport.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the HTTP client or the websocket endpoint
    /// cannot be created.
    pub fn socketio(config: &SiteConfig) -> Result<Self, ProtocolError> {
        let transport = crate::protocol::SocketIoTransport::new(config)?;
        Self::new(config, transport)
    }
}

impl<T: Transport> Communicator<T> {
    /// Creates a communicator driving `transport`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Http` if the HTTP client cannot be created.
    pub fn new(config: &SiteConfig, transport: T) -> Result<Self, ProtocolError> {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            transport,
            commands: CommandClient::new(config)?,
            site_key: config.site_key().clone(),
            connect_timeout: config.connect_timeout(),
            reconnect: config.reconnect(),
            callbacks: Arc::new(SiteCallbacks::new()),
            state_tx,
        })
    }

    /// Returns the callback registry.
    #[must_use]
    pub fn callbacks(&self) -> &Arc<SiteCallbacks> {
        &self.callbacks
    }

    /// Returns the command client shared by all parsed entities.
    #[must_use]
    pub fn commands(&self) -> &CommandClient {
        &self.commands
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Returns a receiver following connection state changes.
    #[must_use]
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    // =========================================================================
    // Subscription loop
    // =========================================================================

    /// Connects, subscribes and dispatches snapshots until the session
    /// ends for good.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Timeout` if the first connection takes longer
    /// than the configured connect timeout, the error of the last reconnect
    /// attempt once the reconnect policy gives up, or the transport error
    /// that ended the session when reconnecting is disabled. A session the
    /// server closes returns `Ok(())`.
    pub async fn run(&mut self) -> Result<(), ProtocolError> {
        self.set_state(ConnectionState::Connecting);
        tracing::info!(site = %self.site_key, "Connecting");

        if let Err(e) = self.connect().await {
            tracing::warn!(site = %self.site_key, error = %e, "Connection failed");
            self.set_state(ConnectionState::Failed(e.to_string()));
            return Err(e);
        }

        loop {
            match self.event_loop().await {
                Ok(SessionEnd::Closed) => {
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
                Ok(SessionEnd::Lost(reason)) => {
                    tracing::info!(site = %self.site_key, reason = %reason, "Connection lost");
                    if !self.reconnect.is_enabled() {
                        self.set_state(ConnectionState::Disconnected);
                        return Ok(());
                    }
                }
                Err(e) => {
                    tracing::warn!(site = %self.site_key, error = %e, "Session failed");
                    if !self.reconnect.is_enabled() {
                        self.set_state(ConnectionState::Failed(e.to_string()));
                        return Err(e);
                    }
                }
            }

            if let Err(e) = self.reconnect().await {
                tracing::error!(site = %self.site_key, error = %e, "Giving up reconnecting");
                self.set_state(ConnectionState::Failed(e.to_string()));
                return Err(e);
            }
        }
    }

    async fn connect(&mut self) -> Result<(), ProtocolError> {
        let timeout = self.connect_timeout;
        tokio::time::timeout(timeout, self.transport.connect())
            .await
            .unwrap_or_else(|_| {
                Err(ProtocolError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            })
    }

    async fn reconnect(&mut self) -> Result<(), ProtocolError> {
        let mut last_error = None;

        for attempt in 1.. {
            let Some(delay) = self.reconnect.delay(attempt) else {
                break;
            };
            self.set_state(ConnectionState::Reconnecting { attempt });
            tracing::info!(site = %self.site_key, attempt, delay = ?delay, "Reconnecting");
            tokio::time::sleep(delay).await;

            match self.connect().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        site = %self.site_key,
                        attempt,
                        error = %e,
                        "Reconnect attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ProtocolError::NotConnected))
    }

    async fn event_loop(&mut self) -> Result<SessionEnd, ProtocolError> {
        while let Some(event) = self.transport.next_event().await? {
            match event {
                TransportEvent::Connected => {
                    self.subscribe().await?;
                    self.set_state(ConnectionState::Connected);
                }
                TransportEvent::Event { name, payload } if name == SITE_EVENT => {
                    self.handle_site(&payload);
                }
                TransportEvent::Event { name, .. } => {
                    tracing::trace!(event = %name, "Ignoring event");
                }
                TransportEvent::Disconnected { reason } => return Ok(SessionEnd::Lost(reason)),
                TransportEvent::Closed { reason } => {
                    tracing::info!(site = %self.site_key, reason = %reason, "Session closed");
                    return Ok(SessionEnd::Closed);
                }
            }
        }

        tracing::info!(site = %self.site_key, "Transport closed");
        Ok(SessionEnd::Closed)
    }

    async fn subscribe(&mut self) -> Result<(), ProtocolError> {
        let payload = json!({ "siteKey": self.site_key.expose() });
        self.transport.emit(SUBSCRIBE_EVENT, payload).await?;
        tracing::info!(site = %self.site_key, "Subscribed to site updates");
        Ok(())
    }

    fn handle_site(&self, payload: &Value) {
        let site = match parse_site_event(payload, &self.commands) {
            Ok(site) => site,
            Err(e) => {
                tracing::error!(error = %e, "Dropping malformed site snapshot");
                return;
            }
        };

        tracing::debug!(
            rooms = site.rooms.len(),
            lights = site.lights.len(),
            scenes = site.scenes.len(),
            "Site snapshot received"
        );
        self.callbacks.dispatch_lights(&site.lights);
        self.callbacks.dispatch_scenes(&site.scenes);
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Turns a light on. See [`Light::turn_on`].
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered.
    pub async fn turn_on(
        &self,
        light: &Light,
        brightness: Option<Brightness>,
    ) -> Result<(), ProtocolError> {
        light.turn_on(brightness).await
    }

    /// Turns a light off.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered.
    pub async fn turn_off(&self, light: &Light) -> Result<(), ProtocolError> {
        light.turn_off().await
    }

    /// Activates a scene.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered.
    pub async fn activate_scene(&self, scene: &Scene) -> Result<(), ProtocolError> {
        scene.activate().await
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Communicator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("transport", &self.transport)
            .field("site_key", &self.site_key)
            .field("state", &*self.state_tx.borrow())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
