// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light entity.

use crate::error::ProtocolError;
use crate::model::{Entity, EntityKind};
use crate::protocol::CommandClient;
use crate::types::{Brightness, LightType};

/// A light of the site.
///
/// Built from a device entry of a site snapshot. The light keeps a clone of
/// the site's [`CommandClient`] so it can be switched directly.
///
/// # Examples
///
/// ```
/// use mount_kelvin::{CommandClient, Entity, Light, SiteConfig};
/// use mount_kelvin::types::{Brightness, LightType};
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let light = Light::new("d1", LightType::Dimmable, "Lamp", commands)
///     .with_room_name(Some("Kitchen".to_string()))
///     .with_state(true, Some(Brightness::new(80)));
///
/// assert_eq!(light.display_name(), "Lamp (Kitchen)");
/// assert!(light.supports_brightness());
/// ```
#[derive(Debug, Clone)]
pub struct Light {
    id: String,
    light_type: LightType,
    name: String,
    room_name: Option<String>,
    is_on: bool,
    brightness: Option<Brightness>,
    available: bool,
    commands: CommandClient,
}

impl Light {
    /// Creates a light that is off, with unknown brightness and no room.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        light_type: LightType,
        name: impl Into<String>,
        commands: CommandClient,
    ) -> Self {
        Self {
            id: id.into(),
            light_type,
            name: name.into(),
            room_name: None,
            is_on: false,
            brightness: None,
            available: true,
            commands,
        }
    }

    /// Sets the name of the room the light is in.
    #[must_use]
    pub fn with_room_name(mut self, room_name: Option<String>) -> Self {
        self.room_name = room_name;
        self
    }

    /// Sets the reported on/off state and brightness.
    #[must_use]
    pub fn with_state(mut self, is_on: bool, brightness: Option<Brightness>) -> Self {
        self.is_on = is_on;
        self.brightness = brightness;
        self
    }

    /// Returns the device identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the device type.
    #[must_use]
    pub fn light_type(&self) -> &LightType {
        &self.light_type
    }

    /// Returns the raw device name, without the room.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the room name, if the device belongs to a known room.
    #[must_use]
    pub fn room_name(&self) -> Option<&str> {
        self.room_name.as_deref()
    }

    /// Returns `true` if the light is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Returns the last reported brightness.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    /// Returns `true` if brightness control should be offered.
    #[must_use]
    pub fn supports_brightness(&self) -> bool {
        self.light_type.supports_brightness()
    }

    /// Returns the command client used by this light.
    #[must_use]
    pub fn commands(&self) -> &CommandClient {
        &self.commands
    }

    /// Brightness sent by [`turn_on`](Self::turn_on).
    ///
    /// The requested brightness wins, then the last reported one. An unknown
    /// or zero brightness turns the light on at full brightness.
    #[must_use]
    pub fn turn_on_brightness(&self, requested: Option<Brightness>) -> Brightness {
        requested
            .or(self.brightness)
            .filter(|bri| !bri.is_zero())
            .unwrap_or(Brightness::MAX)
    }

    /// Turns the light on.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered. The
    /// failure is also logged.
    pub async fn turn_on(&self, brightness: Option<Brightness>) -> Result<(), ProtocolError> {
        let brightness = self.turn_on_brightness(brightness);
        tracing::debug!(light = %self.display_name(), brightness = %brightness, "Turn on");

        self.commands
            .turn_on(&self.id, brightness)
            .await
            .inspect_err(|e| {
                tracing::warn!(light = %self.display_name(), error = %e, "Failed to turn on");
            })
    }

    /// Turns the light off.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered. The
    /// failure is also logged.
    pub async fn turn_off(&self) -> Result<(), ProtocolError> {
        tracing::debug!(light = %self.display_name(), "Turn off");

        self.commands.turn_off(&self.id).await.inspect_err(|e| {
            tracing::warn!(light = %self.display_name(), error = %e, "Failed to turn off");
        })
    }
}

impl Entity for Light {
    const KIND: EntityKind = EntityKind::Light;

    fn unique_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        match &self.room_name {
            Some(room) => format!("{} ({room})", self.name),
            None => self.name.clone(),
        }
    }

    fn equals(&self, other: &Self) -> bool {
        self.light_type == other.light_type
            && self.name == other.name
            && self.room_name == other.room_name
            && self.is_on == other.is_on
            && self.brightness == other.brightness
    }

    fn assign_from(&mut self, other: &Self) {
        self.light_type.clone_from(&other.light_type);
        self.name.clone_from(&other.name);
        self.room_name.clone_from(&other.room_name);
        self.is_on = other.is_on;
        self.brightness = other.brightness;
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn set_available(&mut self, available: bool) -> bool {
        let changed = self.available != available;
        self.available = available;
        changed
    }
}
