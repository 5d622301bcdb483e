// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for site updates.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`SiteCallbacks`] - Registry storing and dispatching the callbacks

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::model::{Light, Scene};

/// Error a callback may return. It is logged and otherwise ignored.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by site callbacks.
pub type CallbackResult = Result<(), CallbackError>;

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later.
/// Identifiers increase with registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type LightsCallback = Arc<dyn Fn(&[Light]) -> CallbackResult + Send + Sync>;
type ScenesCallback = Arc<dyn Fn(&[Scene]) -> CallbackResult + Send + Sync>;

/// Registry of site update callbacks.
///
/// Callbacks are independent: each registered callback is invoked for every
/// snapshot, in registration order, and a failing callback does not keep
/// the others from running.
///
/// The registry is thread-safe. Callbacks may register or unregister other
/// callbacks while being dispatched; the change applies to the next
/// snapshot.
///
/// # Examples
///
/// ```
/// use mount_kelvin::subscription::SiteCallbacks;
///
/// let callbacks = SiteCallbacks::new();
/// let id = callbacks.on_lights_updated(|lights| {
///     println!("{} lights", lights.len());
///     Ok(())
/// });
///
/// assert!(callbacks.unsubscribe(id));
/// ```
pub struct SiteCallbacks {
    next_id: AtomicU64,
    lights: RwLock<BTreeMap<SubscriptionId, LightsCallback>>,
    scenes: RwLock<BTreeMap<SubscriptionId, ScenesCallback>>,
}

impl SiteCallbacks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            lights: RwLock::new(BTreeMap::new()),
            scenes: RwLock::new(BTreeMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a callback receiving the lights of every snapshot.
    pub fn on_lights_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Light]) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lights.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving the scenes of every snapshot.
    pub fn on_scenes_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Scene]) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.scenes.write().insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lights.write().remove(&id).is_some() || self.scenes.write().remove(&id).is_some()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.lights.write().clear();
        self.scenes.write().clear();
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.read().len() + self.scenes.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Calls every lights callback, returning how many failed.
    pub fn dispatch_lights(&self, lights: &[Light]) -> usize {
        let callbacks: Vec<_> = self.lights.read().values().cloned().collect();
        count_failures("lights", callbacks.iter().map(|callback| callback(lights)))
    }

    /// Calls every scenes callback, returning how many failed.
    pub fn dispatch_scenes(&self, scenes: &[Scene]) -> usize {
        let callbacks: Vec<_> = self.scenes.read().values().cloned().collect();
        count_failures("scenes", callbacks.iter().map(|callback| callback(scenes)))
    }
}

fn count_failures(target: &str, results: impl Iterator<Item = CallbackResult>) -> usize {
    results
        .filter(|result| {
            if let Err(e) = result {
                tracing::warn!(callback = target, error = %e, "Site callback failed");
                true
            } else {
                false
            }
        })
        .count()
}

impl Default for SiteCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SiteCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCallbacks")
            .field("lights", &self.lights.read().len())
            .field("scenes", &self.scenes.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use parking_lot::Mutex;

    use super::*;
    use crate::protocol::CommandClient;
    use crate::types::LightType;
    use crate::SiteConfig;

    fn lights() -> Vec<Light> {
        let commands = CommandClient::new(&SiteConfig::new("key").unwrap()).unwrap();
        vec![Light::new("d1", LightType::Dimmable, "Lamp", commands)]
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let callbacks = SiteCallbacks::new();
        let a = callbacks.on_lights_updated(|_| Ok(()));
        let b = callbacks.on_scenes_updated(|_| Ok(()));

        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(callbacks.len(), 2);
    }

    #[test]
    fn dispatch_runs_in_registration_order() {
        let callbacks = SiteCallbacks::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            callbacks.on_lights_updated(move |_| {
                calls.lock().push(tag);
                Ok(())
            });
        }

        assert_eq!(callbacks.dispatch_lights(&lights()), 0);
        assert_eq!(*calls.lock(), ["first", "second", "third"]);
    }

    #[test]
    fn failing_callback_does_not_stop_others() {
        let callbacks = SiteCallbacks::new();
        let reached = Arc::new(AtomicUsize::new(0));

        callbacks.on_lights_updated(|_| Err("boom".into()));
        let counter = Arc::clone(&reached);
        callbacks.on_lights_updated(move |lights| {
            counter.fetch_add(lights.len(), Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(callbacks.dispatch_lights(&lights()), 1);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_callback() {
        let callbacks = SiteCallbacks::new();
        let reached = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&reached);
        let id = callbacks.on_scenes_updated(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(callbacks.unsubscribe(id));
        assert!(!callbacks.unsubscribe(id));

        callbacks.dispatch_scenes(&[]);
        assert_eq!(reached.load(Ordering::SeqCst), 0);
        assert!(callbacks.is_empty());
    }

    #[test]
    fn callback_may_unsubscribe_during_dispatch() {
        let callbacks = Arc::new(SiteCallbacks::new());
        let registry = Arc::clone(&callbacks);
        let own_id = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&own_id);
        let id = callbacks.on_scenes_updated(move |_| {
            if let Some(id) = *slot.lock() {
                registry.unsubscribe(id);
            }
            Ok(())
        });
        *own_id.lock() = Some(id);

        callbacks.dispatch_scenes(&[]);
        assert!(callbacks.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let callbacks = SiteCallbacks::new();
        callbacks.on_lights_updated(|_| Ok(()));
        callbacks.on_scenes_updated(|_| Ok(()));

        callbacks.clear();
        assert!(callbacks.is_empty());
    }
}
