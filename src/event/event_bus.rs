// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting entity events.

use tokio::sync::broadcast;

use super::EntityEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Event bus for broadcasting entity events to multiple subscribers.
///
/// Backed by a tokio broadcast channel, so every subscriber gets its own
/// copy of each event. A subscriber that falls more than the channel
/// capacity behind loses the oldest events and receives
/// `RecvError::Lagged`.
///
/// Clones share the same channel.
///
/// # Examples
///
/// ```
/// use mount_kelvin::event::{EntityEvent, EventBus};
/// use mount_kelvin::EntityKind;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EntityEvent::added(EntityKind::Scene, "s1"));
/// assert_eq!(rx.try_recv().unwrap().unique_id(), "s1");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EntityEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus buffering at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// Without subscribers the event is discarded.
    pub fn publish(&self, event: EntityEvent) {
        tracing::trace!(event = %event, "Publishing entity event");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn subscriber_count_follows_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(EntityEvent::updated(EntityKind::Light, "d1"));

        assert_eq!(
            rx1.recv().await.unwrap(),
            EntityEvent::updated(EntityKind::Light, "d1")
        );
        assert_eq!(rx2.recv().await.unwrap().unique_id(), "d1");
    }

    #[test]
    fn publish_without_subscribers_is_discarded() {
        let bus = EventBus::with_capacity(4);
        bus.publish(EntityEvent::added(EntityKind::Light, "d1"));

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let _rx = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
