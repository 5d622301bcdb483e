// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain entities of a Mount Kelvin site.
//!
//! - [`Room`] - plain value, used to name lights
//! - [`Light`] - switchable, optionally dimmable light
//! - [`Scene`] - activatable scene
//!
//! Lights and scenes implement [`Entity`], the contract used by the
//! [`Reconciler`](crate::reconcile::Reconciler) to detect real changes.

mod entity;
mod light;
mod room;
mod scene;

pub use entity::{Entity, EntityKind};
pub use light::Light;
pub use room::Room;
pub use scene::Scene;
