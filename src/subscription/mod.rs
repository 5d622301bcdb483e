// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for site updates.
//!
//! The [`Communicator`](crate::Communicator) parses every `site` event and
//! hands the resulting lights and scenes to the callbacks registered in its
//! [`SiteCallbacks`].
//!
//! ```
//! use mount_kelvin::subscription::SiteCallbacks;
//!
//! let callbacks = SiteCallbacks::new();
//! let sub_id = callbacks.on_scenes_updated(|scenes| {
//!     for scene in scenes {
//!         println!("scene {}", scene.name());
//!     }
//!     Ok(())
//! });
//!
//! callbacks.unsubscribe(sub_id);
//! ```

mod callback;

pub use callback::{CallbackError, CallbackResult, SiteCallbacks, SubscriptionId};
