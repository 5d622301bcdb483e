// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared contract of reconcilable entities.

use std::fmt;

/// Kind of entity exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A controllable light.
    Light,
    /// An activatable scene.
    Scene,
}

impl EntityKind {
    /// Returns the host platform name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Scene => "scene",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity that can be matched across snapshots and updated in place.
///
/// Every snapshot produces fresh entity values. The host keeps the first
/// value it saw for each unique id and updates it from later snapshots with
/// [`update_from`](Self::update_from), which only reports a change when an
/// observable attribute actually differs.
///
/// Availability is not an attribute: it belongs to the reconciler, which
/// marks entities missing from a snapshot as unavailable.
///
/// # Examples
///
/// ```
/// use mount_kelvin::{CommandClient, Entity, Light, SiteConfig};
/// use mount_kelvin::types::{Brightness, LightType};
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let mut registered = Light::new("d1", LightType::Dimmable, "Lamp", commands.clone())
///     .with_state(true, Some(Brightness::new(100)));
/// let fresh = Light::new("d1", LightType::Dimmable, "Lamp", commands)
///     .with_state(true, Some(Brightness::new(150)));
///
/// assert!(registered.update_from(&fresh));
/// assert!(!registered.update_from(&fresh));
/// assert_eq!(registered.brightness(), Some(Brightness::new(150)));
/// ```
pub trait Entity: Clone {
    /// Kind used to look the entity up in the host directory.
    const KIND: EntityKind;

    /// Stable identity shared by all snapshots of the same entity.
    fn unique_id(&self) -> &str;

    /// Name shown to users.
    fn display_name(&self) -> String;

    /// Returns `true` if every observable attribute equals `other`'s.
    ///
    /// Identity is not compared; callers only compare entities with the
    /// same unique id.
    fn equals(&self, other: &Self) -> bool;

    /// Copies every observable attribute from `other`.
    fn assign_from(&mut self, other: &Self);

    /// Returns `false` while the entity is missing from the latest snapshot.
    fn is_available(&self) -> bool;

    /// Sets availability, returning `true` if it changed.
    fn set_available(&mut self, available: bool) -> bool;

    /// Updates this entity from a fresher value of the same entity.
    ///
    /// Returns `true` if anything was copied. Calling it again with the
    /// same source is a no-op returning `false`.
    ///
    /// # Panics
    ///
    /// Panics if `other` has a different unique id.
    fn update_from(&mut self, other: &Self) -> bool {
        assert_eq!(
            self.unique_id(),
            other.unique_id(),
            "only the same {} can be updated",
            Self::KIND
        );
        if self.equals(other) {
            return false;
        }
        self.assign_from(other);
        true
    }
}
