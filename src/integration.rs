// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ready-made wiring of communicator, platforms and registries.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use crate::communicator::{Communicator, ConnectionState};
use crate::config::SiteConfig;
use crate::error::ProtocolError;
use crate::event::{EntityEvent, EventBus};
use crate::model::{Light, Scene};
use crate::protocol::{CommandClient, Transport};
use crate::reconcile::{EntityRegistry, Platform};

/// Light platform backed by the in-memory registry.
pub type LightPlatform = Platform<Light, EntityRegistry<Light>>;

/// Scene platform backed by the in-memory registry.
pub type ScenePlatform = Platform<Scene, EntityRegistry<Scene>>;

/// Cloneable read access to the entities of a running [`Integration`].
///
/// The integration's run loop is the only writer. Handles lock the
/// platforms briefly and return clones.
#[derive(Debug, Clone)]
pub struct IntegrationHandle {
    lights: Arc<Mutex<LightPlatform>>,
    scenes: Arc<Mutex<ScenePlatform>>,
    events: EventBus,
    commands: CommandClient,
    connection: watch::Receiver<ConnectionState>,
}

impl IntegrationHandle {
    /// Subscribes to entity events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.events.subscribe()
    }

    /// Returns all registered lights in registration order.
    #[must_use]
    pub fn lights(&self) -> Vec<Light> {
        self.lights.lock().host().all().into_iter().cloned().collect()
    }

    /// Returns the light with the given device id.
    #[must_use]
    pub fn light(&self, id: &str) -> Option<Light> {
        self.lights.lock().host().get(id).cloned()
    }

    /// Returns all registered scenes in registration order.
    #[must_use]
    pub fn scenes(&self) -> Vec<Scene> {
        self.scenes.lock().host().all().into_iter().cloned().collect()
    }

    /// Returns the scene with the given id.
    #[must_use]
    pub fn scene(&self, id: &str) -> Option<Scene> {
        self.scenes.lock().host().get(id).cloned()
    }

    /// Removes a light from the registry. Later snapshots will not re-add it.
    pub fn remove_light(&self, id: &str) -> Option<Light> {
        self.lights.lock().host_mut().remove(id)
    }

    /// Removes a scene from the registry. Later snapshots will not re-add it.
    pub fn remove_scene(&self, id: &str) -> Option<Scene> {
        self.scenes.lock().host_mut().remove(id)
    }

    /// Returns the command client.
    #[must_use]
    pub fn commands(&self) -> &CommandClient {
        &self.commands
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.borrow().clone()
    }
}

/// A site integration: one subscription feeding a light and a scene
/// platform.
///
/// # Examples
///
/// ```no_run
/// use mount_kelvin::{Integration, SiteConfig};
///
/// # async fn example() -> mount_kelvin::Result<()> {
/// let config = SiteConfig::from_env()?;
/// let mut integration = Integration::socketio(&config)?;
///
/// let handle = integration.handle();
/// tokio::spawn(async move {
///     let mut events = handle.subscribe();
///     while let Ok(event) = events.recv().await {
///         println!("{event}");
///     }
/// });
///
/// integration.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Integration<T> {
    communicator: Communicator<T>,
    handle: IntegrationHandle,
}

#[cfg(feature = "socketio")]
impl Integration<crate::protocol::SocketIoTransport> {
    /// Creates an integration using the Socket.IO transport.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the HTTP client or the websocket endpoint
    /// cannot be created.
    pub fn socketio(config: &SiteConfig) -> Result<Self, ProtocolError> {
        Ok(Self::with_communicator(Communicator::socketio(config)?))
    }
}

impl<T: Transport> Integration<T> {
    /// Creates an integration driving `transport`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Http` if the HTTP client cannot be created.
    pub fn new(config: &SiteConfig, transport: T) -> Result<Self, ProtocolError> {
        Ok(Self::with_communicator(Communicator::new(config, transport)?))
    }

    /// Wires platforms onto an existing communicator.
    #[must_use]
    pub fn with_communicator(communicator: Communicator<T>) -> Self {
        let events = EventBus::new();
        let lights = Arc::new(Mutex::new(Platform::new(EntityRegistry::new(
            events.clone(),
        ))));
        let scenes = Arc::new(Mutex::new(Platform::new(EntityRegistry::new(
            events.clone(),
        ))));

        let platform = Arc::clone(&lights);
        communicator.callbacks().on_lights_updated(move |fresh| {
            platform.lock().entities_updated(fresh.to_vec());
            Ok(())
        });
        let platform = Arc::clone(&scenes);
        communicator.callbacks().on_scenes_updated(move |fresh| {
            platform.lock().entities_updated(fresh.to_vec());
            Ok(())
        });

        let handle = IntegrationHandle {
            lights,
            scenes,
            events,
            commands: communicator.commands().clone(),
            connection: communicator.watch_connection(),
        };

        Self {
            communicator,
            handle,
        }
    }

    /// Returns a cloneable handle for reading entities while running.
    #[must_use]
    pub fn handle(&self) -> IntegrationHandle {
        self.handle.clone()
    }

    /// Returns the underlying communicator.
    #[must_use]
    pub fn communicator(&self) -> &Communicator<T> {
        &self.communicator
    }

    /// Subscribes to entity events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.handle.subscribe()
    }

    /// Returns all registered lights.
    #[must_use]
    pub fn lights(&self) -> Vec<Light> {
        self.handle.lights()
    }

    /// Returns the light with the given device id.
    #[must_use]
    pub fn light(&self, id: &str) -> Option<Light> {
        self.handle.light(id)
    }

    /// Returns all registered scenes.
    #[must_use]
    pub fn scenes(&self) -> Vec<Scene> {
        self.handle.scenes()
    }

    /// Returns the scene with the given id.
    #[must_use]
    pub fn scene(&self, id: &str) -> Option<Scene> {
        self.handle.scene(id)
    }

    /// Returns the command client.
    #[must_use]
    pub fn commands(&self) -> &CommandClient {
        self.handle.commands()
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.communicator.connection_state()
    }

    /// Runs the subscription, resuming lost sessions, until the server
    /// closes it or reconnecting gives up.
    ///
    /// Registered entities survive a reconnect. The first snapshot of the
    /// new session is reconciled against them like any other.
    ///
    /// # Errors
    ///
    /// See [`Communicator::run`].
    pub async fn run(&mut self) -> Result<(), ProtocolError> {
        self.communicator.run().await
    }
}
