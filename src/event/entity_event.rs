// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity event types.

use crate::model::EntityKind;

/// Events emitted by an [`EntityRegistry`](crate::reconcile::EntityRegistry).
///
/// Events only carry the entity kind and identity. Subscribers look the
/// entity up in the registry to read its current attributes.
///
/// # Examples
///
/// ```
/// use mount_kelvin::event::EntityEvent;
/// use mount_kelvin::EntityKind;
///
/// let event = EntityEvent::added(EntityKind::Light, "d1");
/// assert_eq!(event.unique_id(), "d1");
/// assert_eq!(event.kind(), EntityKind::Light);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent {
    /// An entity was registered for the first time.
    Added {
        /// Kind of the entity.
        kind: EntityKind,
        /// Identity of the entity.
        unique_id: String,
    },

    /// A registered entity changed its attributes or became available again.
    Updated {
        /// Kind of the entity.
        kind: EntityKind,
        /// Identity of the entity.
        unique_id: String,
    },

    /// A registered entity is missing from the latest snapshot.
    Unavailable {
        /// Kind of the entity.
        kind: EntityKind,
        /// Identity of the entity.
        unique_id: String,
    },

    /// An entity was removed from the registry.
    Removed {
        /// Kind of the entity.
        kind: EntityKind,
        /// Identity of the entity.
        unique_id: String,
    },
}

impl EntityEvent {
    /// Creates an `Added` event.
    #[must_use]
    pub fn added(kind: EntityKind, unique_id: impl Into<String>) -> Self {
        Self::Added {
            kind,
            unique_id: unique_id.into(),
        }
    }

    /// Creates an `Updated` event.
    #[must_use]
    pub fn updated(kind: EntityKind, unique_id: impl Into<String>) -> Self {
        Self::Updated {
            kind,
            unique_id: unique_id.into(),
        }
    }

    /// Creates an `Unavailable` event.
    #[must_use]
    pub fn unavailable(kind: EntityKind, unique_id: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            unique_id: unique_id.into(),
        }
    }

    /// Creates a `Removed` event.
    #[must_use]
    pub fn removed(kind: EntityKind, unique_id: impl Into<String>) -> Self {
        Self::Removed {
            kind,
            unique_id: unique_id.into(),
        }
    }

    /// Returns the kind of the entity this event is about.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Added { kind, .. }
            | Self::Updated { kind, .. }
            | Self::Unavailable { kind, .. }
            | Self::Removed { kind, .. } => *kind,
        }
    }

    /// Returns the identity of the entity this event is about.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Added { unique_id, .. }
            | Self::Updated { unique_id, .. }
            | Self::Unavailable { unique_id, .. }
            | Self::Removed { unique_id, .. } => unique_id,
        }
    }
}

impl std::fmt::Display for EntityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            Self::Added { .. } => "added",
            Self::Updated { .. } => "updated",
            Self::Unavailable { .. } => "unavailable",
            Self::Removed { .. } => "removed",
        };
        write!(f, "{} {} {action}", self.kind(), self.unique_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_cover_every_variant() {
        let events = [
            EntityEvent::added(EntityKind::Light, "a"),
            EntityEvent::updated(EntityKind::Light, "a"),
            EntityEvent::unavailable(EntityKind::Light, "a"),
            EntityEvent::removed(EntityKind::Light, "a"),
        ];

        for event in &events {
            assert_eq!(event.kind(), EntityKind::Light);
            assert_eq!(event.unique_id(), "a");
        }
    }

    #[test]
    fn display_names_the_action() {
        let event = EntityEvent::unavailable(EntityKind::Scene, "s1");
        assert_eq!(event.to_string(), "scene s1 unavailable");
    }
}
