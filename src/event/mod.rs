// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for entity lifecycle changes.
//!
//! [`EntityRegistry`](crate::reconcile::EntityRegistry) publishes an
//! [`EntityEvent`] on its [`EventBus`] whenever an entity is added, updated,
//! goes missing from a snapshot or is removed. A UI can subscribe to the
//! bus instead of polling the registry.
//!
//! # Examples
//!
//! ```
//! use mount_kelvin::event::{EntityEvent, EventBus};
//! use mount_kelvin::EntityKind;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(EntityEvent::added(EntityKind::Light, "d1"));
//! ```

mod entity_event;
mod event_bus;

pub use entity_event::EntityEvent;
pub use event_bus::EventBus;
