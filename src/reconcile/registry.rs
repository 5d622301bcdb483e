// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory entity host.

use std::collections::HashMap;

use crate::event::{EntityEvent, EventBus};
use crate::model::{Entity, EntityKind};

use super::{EntityDirectory, EntityHost};

/// In-memory host for one entity kind.
///
/// Entities are keyed by unique id and iterated in the order they were
/// added. Every change is published on the registry's [`EventBus`].
///
/// # Examples
///
/// ```
/// use mount_kelvin::event::EventBus;
/// use mount_kelvin::reconcile::{EntityHost, EntityRegistry};
/// use mount_kelvin::{CommandClient, Scene, SiteConfig};
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let mut registry = EntityRegistry::new(EventBus::new());
///
/// registry.add_entities(vec![Scene::new("s1", "Dinner", commands)]);
/// assert_eq!(registry.get("s1").map(Scene::name), Some("Dinner"));
/// ```
#[derive(Debug)]
pub struct EntityRegistry<E> {
    entities: HashMap<String, E>,
    order: Vec<String>,
    events: EventBus,
}

impl<E: Entity> EntityRegistry<E> {
    /// Creates an empty registry publishing on `events`.
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            entities: HashMap::new(),
            order: Vec::new(),
            events,
        }
    }

    /// Returns the event bus this registry publishes on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the entity with the given identity.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<&E> {
        self.entities.get(unique_id)
    }

    /// Returns all entities in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<&E> {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .collect()
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes an entity, as if the user deleted it from the host.
    ///
    /// The reconciler keeps tracking the identity, so later snapshots
    /// containing it are skipped rather than re-added.
    pub fn remove(&mut self, unique_id: &str) -> Option<E> {
        let removed = self.entities.remove(unique_id)?;
        self.order.retain(|id| id != unique_id);

        tracing::debug!(kind = %E::KIND, unique_id = %unique_id, "Entity removed");
        self.events.publish(EntityEvent::removed(E::KIND, unique_id));
        Some(removed)
    }
}

impl<E: Entity> EntityDirectory<E> for EntityRegistry<E> {
    fn get_existing_mut(&mut self, kind: EntityKind, unique_id: &str) -> Option<&mut E> {
        if kind != E::KIND {
            return None;
        }
        self.entities.get_mut(unique_id)
    }
}

impl<E: Entity> EntityHost<E> for EntityRegistry<E> {
    fn add_entities(&mut self, entities: Vec<E>) {
        for entity in entities {
            let unique_id = entity.unique_id().to_string();
            if self.entities.contains_key(&unique_id) {
                tracing::debug!(
                    kind = %E::KIND,
                    unique_id = %unique_id,
                    "Entity already registered"
                );
                continue;
            }

            tracing::info!(kind = %E::KIND, entity = %entity.display_name(), "Entity added");
            self.entities.insert(unique_id.clone(), entity);
            self.order.push(unique_id.clone());
            self.events.publish(EntityEvent::added(E::KIND, unique_id));
        }
    }

    fn entity_updated(&mut self, entity: &E) {
        let event = if entity.is_available() {
            EntityEvent::updated(E::KIND, entity.unique_id())
        } else {
            EntityEvent::unavailable(E::KIND, entity.unique_id())
        };
        self.events.publish(event);
    }
}
