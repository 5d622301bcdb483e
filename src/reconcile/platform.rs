// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciler bound to a host.

use crate::model::Entity;

use super::{EntityHost, Reconciler};

/// Counts reported by [`Platform::entities_updated`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Entities handed to the host for the first time.
    pub added: usize,
    /// Registered entities that changed.
    pub changed: usize,
    /// Registered entities that went missing.
    pub stale: usize,
}

impl UpdateSummary {
    /// Returns `true` if the snapshot changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.stale == 0
    }
}

/// One entity kind of the integration: a reconciler feeding a host.
///
/// # Examples
///
/// ```
/// use mount_kelvin::event::EventBus;
/// use mount_kelvin::reconcile::{EntityRegistry, Platform};
/// use mount_kelvin::{CommandClient, Scene, SiteConfig};
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let mut platform = Platform::new(EntityRegistry::new(EventBus::new()));
///
/// let snapshot = vec![Scene::new("s1", "Dinner", commands)];
/// assert_eq!(platform.entities_updated(snapshot.clone()).added, 1);
/// assert!(platform.entities_updated(snapshot).is_empty());
/// ```
#[derive(Debug)]
pub struct Platform<E, H> {
    reconciler: Reconciler<E>,
    host: H,
}

impl<E: Entity, H: EntityHost<E>> Platform<E, H> {
    /// Creates a platform around a host.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            reconciler: Reconciler::new(),
            host,
        }
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<E> {
        &self.reconciler
    }

    /// Applies a full snapshot of this kind to the host.
    ///
    /// New entities are handed to the host first, then every changed or
    /// stale entity is reported with [`EntityHost::entity_updated`].
    pub fn entities_updated(&mut self, fresh: Vec<E>) -> UpdateSummary {
        let result = self.reconciler.reconcile(fresh, &mut self.host);
        let summary = UpdateSummary {
            added: result.added.len(),
            changed: result.changed.len(),
            stale: result.stale.len(),
        };

        if !result.added.is_empty() {
            self.host.add_entities(result.added);
        }
        for entity in result.changed.iter().chain(&result.stale) {
            self.host.entity_updated(entity);
        }

        if !summary.is_empty() {
            tracing::debug!(
                kind = %E::KIND,
                added = summary.added,
                changed = summary.changed,
                stale = summary.stale,
                "Snapshot applied"
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EntityEvent, EventBus};
    use crate::model::{EntityKind, Light};
    use crate::protocol::CommandClient;
    use crate::reconcile::EntityRegistry;
    use crate::types::{Brightness, LightType};
    use crate::SiteConfig;

    fn commands() -> CommandClient {
        CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap()
    }

    fn light(id: &str, bri: u8) -> Light {
        Light::new(id, LightType::Dimmable, "Lamp", commands())
            .with_state(true, Some(Brightness::new(bri)))
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<EntityEvent>) -> Vec<EntityEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn snapshots_flow_into_registry() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut platform = Platform::new(EntityRegistry::new(bus));

        let first = platform.entities_updated(vec![light("a", 10), light("b", 20)]);
        assert_eq!(
            first,
            UpdateSummary {
                added: 2,
                changed: 0,
                stale: 0
            }
        );

        let second = platform.entities_updated(vec![light("a", 11)]);
        assert_eq!(
            second,
            UpdateSummary {
                added: 0,
                changed: 1,
                stale: 1
            }
        );

        let registry = platform.host();
        assert_eq!(
            registry.get("a").and_then(Light::brightness),
            Some(Brightness::new(11))
        );
        assert!(!registry.get("b").unwrap().is_available());

        assert_eq!(
            drain(&mut rx),
            [
                EntityEvent::added(EntityKind::Light, "a"),
                EntityEvent::added(EntityKind::Light, "b"),
                EntityEvent::updated(EntityKind::Light, "a"),
                EntityEvent::unavailable(EntityKind::Light, "b"),
            ]
        );
    }

    #[test]
    fn removed_entity_is_not_re_added() {
        let mut platform = Platform::new(EntityRegistry::new(EventBus::new()));
        platform.entities_updated(vec![light("a", 10)]);

        platform.host_mut().remove("a");
        let summary = platform.entities_updated(vec![light("a", 50)]);

        assert!(summary.is_empty());
        assert!(platform.host().is_empty());
        assert!(platform.reconciler().is_tracked("a"));
    }
}
