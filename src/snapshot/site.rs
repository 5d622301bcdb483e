// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire format of the `site` event.

use serde::Deserialize;

/// Payload of a `site` event.
///
/// ```json
/// { "data": { "locations": { "rooms": [] }, "devices": [], "scenes": [] } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEvent {
    /// The full site snapshot.
    pub data: SiteSnapshot,
}

/// A full description of one site's rooms, devices and scenes.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSnapshot {
    /// Room container.
    #[serde(default)]
    pub locations: SiteLocations,
    /// All devices of the site.
    pub devices: Vec<RawDevice>,
    /// All scenes of the site. Absent in older payloads.
    #[serde(default)]
    pub scenes: Vec<RawScene>,
}

/// The `locations` object of a snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteLocations {
    /// All rooms of the site.
    #[serde(default)]
    pub rooms: Vec<RawRoom>,
}

/// A room entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoom {
    /// Room identity.
    pub id: String,
    /// Room name.
    pub name: String,
}

/// A device entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    /// Device identity.
    pub id: String,
    /// Device type, e.g. `dimmable`.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Device name.
    pub name: String,
    /// Identity of the room the device is in.
    #[serde(rename = "roomId", default)]
    pub room_id: Option<String>,
    /// Reported state.
    pub state: RawDeviceState,
}

/// Reported state of a device.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawDeviceState {
    /// Whether the device is on.
    pub on: bool,
    /// Brightness (0-255), only reported by dimmable devices.
    #[serde(default)]
    pub bri: Option<u8>,
}

/// A scene entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScene {
    /// Scene identity.
    pub id: String,
    /// Scene name.
    pub name: String,
}
