// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of site snapshots into domain entities.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::model::{Light, Room, Scene};
use crate::protocol::CommandClient;
use crate::types::{Brightness, LightType};

use super::site::{RawDevice, RawRoom, RawScene, SiteEvent, SiteSnapshot};

/// Entities parsed from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct ParsedSite {
    /// Rooms of the site.
    pub rooms: Vec<Room>,
    /// One light per device.
    pub lights: Vec<Light>,
    /// Scenes of the site.
    pub scenes: Vec<Scene>,
}

/// Parses the payload of a `site` event.
///
/// # Errors
///
/// Returns `ParseError::MissingField` if the payload has no `data` field,
/// `ParseError::InvalidValue` if `data` is not an object and
/// `ParseError::Json` if a required field is missing or has the wrong
/// type (for example a device without `id` or `state.on`, or a brightness
/// outside 0-255).
///
/// # Examples
///
/// ```
/// use mount_kelvin::{CommandClient, Entity, SiteConfig};
/// use mount_kelvin::snapshot::parse_site_event;
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let payload = serde_json::json!({
///     "data": {
///         "locations": { "rooms": [{ "id": "r1", "name": "Kitchen" }] },
///         "devices": [{
///             "id": "d1", "type": "dimmable", "name": "Lamp", "roomId": "r1",
///             "state": { "on": true, "bri": 80 }
///         }],
///         "scenes": []
///     }
/// });
///
/// let site = parse_site_event(&payload, &commands).unwrap();
/// assert_eq!(site.lights[0].display_name(), "Lamp (Kitchen)");
/// ```
pub fn parse_site_event(
    payload: &Value,
    commands: &CommandClient,
) -> Result<ParsedSite, ParseError> {
    match payload.get("data") {
        None => return Err(ParseError::MissingField("data".to_string())),
        Some(data) if !data.is_object() => {
            return Err(ParseError::InvalidValue {
                field: "data".to_string(),
                message: format!("expected an object, got {data}"),
            });
        }
        Some(_) => {}
    }
    let event = SiteEvent::deserialize(payload)?;
    Ok(parse_site(&event.data, commands))
}

/// Converts a snapshot into rooms, lights and scenes.
///
/// Rooms are resolved first so every light can be named after its room.
/// A device whose room is unknown keeps its plain name.
#[must_use]
pub fn parse_site(snapshot: &SiteSnapshot, commands: &CommandClient) -> ParsedSite {
    let rooms = parse_rooms(&snapshot.locations.rooms);
    let lights = parse_lights(&snapshot.devices, &rooms, commands);
    let scenes = parse_scenes(&snapshot.scenes, commands);

    ParsedSite {
        rooms,
        lights,
        scenes,
    }
}

fn parse_rooms(rooms: &[RawRoom]) -> Vec<Room> {
    rooms
        .iter()
        .map(|room| Room::new(&room.id, &room.name))
        .collect()
}

fn parse_lights(devices: &[RawDevice], rooms: &[Room], commands: &CommandClient) -> Vec<Light> {
    devices
        .iter()
        .map(|device| {
            let room_name = device
                .room_id
                .as_deref()
                .and_then(|room_id| rooms.iter().find(|room| room.id == room_id))
                .map(|room| room.name.clone());
            let light_type = LightType::from(device.device_type.as_str());

            Light::new(&device.id, light_type, &device.name, commands.clone())
                .with_room_name(room_name)
                .with_state(device.state.on, device.state.bri.map(Brightness::new))
        })
        .collect()
}

fn parse_scenes(scenes: &[RawScene], commands: &CommandClient) -> Vec<Scene> {
    scenes
        .iter()
        .map(|scene| Scene::new(&scene.id, &scene.name, commands.clone()))
        .collect()
}
