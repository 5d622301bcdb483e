// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot reconciliation.

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::model::Entity;

use super::EntityDirectory;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation<E> {
    /// Entities seen for the first time, in snapshot order.
    pub added: Vec<E>,
    /// Registered entities that changed, after the update, in snapshot order.
    pub changed: Vec<E>,
    /// Registered entities that just went missing from the snapshot.
    pub stale: Vec<E>,
}

impl<E> Reconciliation<E> {
    /// Returns `true` if the pass found nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.stale.is_empty()
    }
}

impl<E> Default for Reconciliation<E> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            changed: Vec::new(),
            stale: Vec::new(),
        }
    }
}

/// Detects new, changed and missing entities across full snapshots.
///
/// The reconciler remembers every identity it has ever reported as added.
/// Identities are never forgotten: an entity that disappears and comes back
/// is updated in place instead of being added a second time.
///
/// # Examples
///
/// ```
/// use mount_kelvin::reconcile::{EntityDirectory, Reconciler};
/// use mount_kelvin::{CommandClient, Entity, EntityKind, Scene, SiteConfig};
///
/// struct Hosted(Vec<Scene>);
///
/// impl EntityDirectory<Scene> for Hosted {
///     fn get_existing_mut(&mut self, _kind: EntityKind, id: &str) -> Option<&mut Scene> {
///         self.0.iter_mut().find(|scene| scene.id() == id)
///     }
/// }
///
/// let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
/// let mut reconciler = Reconciler::new();
/// let mut host = Hosted(Vec::new());
///
/// let first = reconciler.reconcile(vec![Scene::new("s1", "Dinner", commands.clone())], &mut host);
/// assert_eq!(first.added.len(), 1);
/// host.0.extend(first.added);
///
/// let second = reconciler.reconcile(vec![Scene::new("s1", "Supper", commands)], &mut host);
/// assert!(second.added.is_empty());
/// assert_eq!(second.changed[0].name(), "Supper");
/// ```
#[derive(Debug)]
pub struct Reconciler<E> {
    tracked: HashSet<String>,
    order: Vec<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Reconciler<E> {
    /// Creates a reconciler that tracks nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracked: HashSet::new(),
            order: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Returns `true` if `unique_id` has been reported as added before.
    #[must_use]
    pub fn is_tracked(&self, unique_id: &str) -> bool {
        self.tracked.contains(unique_id)
    }

    /// Returns the number of tracked identities.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Reconciles a full snapshot of one entity kind against the host.
    ///
    /// Untracked identities are returned in `added` and tracked from now
    /// on; the caller hands them to the host. Tracked identities are looked
    /// up in `directory` and updated in place; those that actually changed
    /// are cloned into `changed`. Tracked identities absent from `fresh`
    /// are marked unavailable and reported in `stale` once.
    ///
    /// A tracked identity the directory cannot find is skipped.
    pub fn reconcile<D>(&mut self, fresh: Vec<E>, directory: &mut D) -> Reconciliation<E>
    where
        D: EntityDirectory<E> + ?Sized,
    {
        let mut result = Reconciliation::default();
        let mut seen: HashSet<String> = HashSet::with_capacity(fresh.len());

        for entity in fresh {
            let unique_id = entity.unique_id().to_string();
            if !seen.insert(unique_id.clone()) {
                tracing::debug!(
                    kind = %E::KIND,
                    unique_id = %unique_id,
                    "Ignoring duplicate entity in snapshot"
                );
                continue;
            }

            if self.tracked.insert(unique_id.clone()) {
                self.order.push(unique_id);
                result.added.push(entity);
                continue;
            }

            let Some(existing) = directory.get_existing_mut(E::KIND, &unique_id) else {
                tracing::debug!(
                    kind = %E::KIND,
                    unique_id = %unique_id,
                    "Tracked entity not found in directory"
                );
                continue;
            };

            let updated = existing.update_from(&entity);
            let revived = existing.set_available(true);
            if updated || revived {
                tracing::debug!(
                    kind = %E::KIND,
                    entity = %existing.display_name(),
                    revived,
                    "Updating entity"
                );
                result.changed.push(existing.clone());
            }
        }

        for unique_id in self.order.iter().filter(|id| !seen.contains(id.as_str())) {
            let Some(existing) = directory.get_existing_mut(E::KIND, unique_id) else {
                continue;
            };
            if existing.set_available(false) {
                tracing::debug!(
                    kind = %E::KIND,
                    entity = %existing.display_name(),
                    "Entity missing from snapshot"
                );
                result.stale.push(existing.clone());
            }
        }

        result
    }
}

impl<E: Entity> Default for Reconciler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, Light};
    use crate::protocol::CommandClient;
    use crate::types::{Brightness, LightType};
    use crate::SiteConfig;

    /// Directory backed by a plain vector, recording lookups.
    #[derive(Default)]
    struct VecDirectory {
        lights: Vec<Light>,
        lookups: Vec<(EntityKind, String)>,
    }

    impl EntityDirectory<Light> for VecDirectory {
        fn get_existing_mut(&mut self, kind: EntityKind, unique_id: &str) -> Option<&mut Light> {
            self.lookups.push((kind, unique_id.to_string()));
            self.lights.iter_mut().find(|light| light.id() == unique_id)
        }
    }

    fn commands() -> CommandClient {
        CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap()
    }

    fn light(id: &str, on: bool, bri: u8) -> Light {
        Light::new(id, LightType::Dimmable, format!("Lamp {id}"), commands())
            .with_state(on, Some(Brightness::new(bri)))
    }

    fn ids(lights: &[Light]) -> Vec<&str> {
        lights.iter().map(Light::id).collect()
    }

    /// Runs a pass and hands new entities to the directory like a platform.
    fn pass(
        reconciler: &mut Reconciler<Light>,
        directory: &mut VecDirectory,
        fresh: Vec<Light>,
    ) -> Reconciliation<Light> {
        let result = reconciler.reconcile(fresh, directory);
        directory.lights.extend(result.added.iter().cloned());
        result
    }

    #[test]
    fn first_snapshot_adds_everything_in_order() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        let result = pass(
            &mut reconciler,
            &mut directory,
            vec![light("b", true, 10), light("a", false, 20)],
        );

        assert_eq!(ids(&result.added), ["b", "a"]);
        assert!(result.changed.is_empty());
        assert!(result.stale.is_empty());
        assert!(directory.lookups.is_empty());
        assert_eq!(reconciler.tracked_count(), 2);
    }

    #[test]
    fn identical_snapshot_reports_nothing() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();
        let snapshot = || vec![light("a", true, 10), light("b", false, 20)];

        pass(&mut reconciler, &mut directory, snapshot());
        let second = pass(&mut reconciler, &mut directory, snapshot());

        assert!(second.is_empty());
    }

    #[test]
    fn changed_entity_is_updated_in_place() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        pass(
            &mut reconciler,
            &mut directory,
            vec![light("a", true, 10), light("b", true, 20)],
        );
        let result = pass(
            &mut reconciler,
            &mut directory,
            vec![light("a", true, 10), light("b", false, 20)],
        );

        assert!(result.added.is_empty());
        assert_eq!(ids(&result.changed), ["b"]);
        assert!(!result.changed[0].is_on());
        assert!(!directory.lights[1].is_on());
        assert!(
            directory
                .lookups
                .iter()
                .all(|(kind, _)| *kind == EntityKind::Light)
        );
    }

    #[test]
    fn new_and_changed_in_one_pass() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        pass(&mut reconciler, &mut directory, vec![light("a", true, 10)]);
        let result = pass(
            &mut reconciler,
            &mut directory,
            vec![light("c", true, 1), light("a", true, 99)],
        );

        assert_eq!(ids(&result.added), ["c"]);
        assert_eq!(ids(&result.changed), ["a"]);
        assert_eq!(result.changed[0].brightness(), Some(Brightness::new(99)));
    }

    #[test]
    fn duplicate_ids_are_added_once() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        let result = pass(
            &mut reconciler,
            &mut directory,
            vec![light("a", true, 10), light("a", false, 10)],
        );

        assert_eq!(ids(&result.added), ["a"]);
        assert!(result.changed.is_empty());
    }

    #[test]
    fn lookup_miss_is_skipped() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        reconciler.reconcile(vec![light("a", true, 10)], &mut directory);
        let result = reconciler.reconcile(vec![light("a", false, 10)], &mut directory);

        assert!(result.is_empty());
        assert_eq!(directory.lookups, [(EntityKind::Light, "a".to_string())]);
    }

    #[test]
    fn missing_entity_becomes_stale_once() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        pass(
            &mut reconciler,
            &mut directory,
            vec![light("a", true, 10), light("b", true, 10)],
        );

        let first = pass(&mut reconciler, &mut directory, vec![light("a", true, 10)]);
        assert_eq!(ids(&first.stale), ["b"]);
        assert!(!first.stale[0].is_available());

        let second = pass(&mut reconciler, &mut directory, vec![light("a", true, 10)]);
        assert!(second.is_empty());
    }

    #[test]
    fn reappearing_entity_is_changed_not_added() {
        let mut reconciler = Reconciler::new();
        let mut directory = VecDirectory::default();

        pass(&mut reconciler, &mut directory, vec![light("a", true, 10)]);
        pass(&mut reconciler, &mut directory, Vec::new());

        let result = pass(&mut reconciler, &mut directory, vec![light("a", true, 10)]);

        assert!(result.added.is_empty());
        assert_eq!(ids(&result.changed), ["a"]);
        assert!(result.changed[0].is_available());
        assert_eq!(directory.lights.len(), 1);
    }

    #[test]
    fn empty_snapshot_on_empty_reconciler() {
        let mut reconciler: Reconciler<Light> = Reconciler::new();
        let mut directory = VecDirectory::default();

        assert!(reconciler.reconcile(Vec::new(), &mut directory).is_empty());
        assert!(!reconciler.is_tracked("a"));
    }
}
