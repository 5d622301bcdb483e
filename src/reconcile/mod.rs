// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of full snapshots against registered entities.
//!
//! Every `site` event describes the whole site. The [`Reconciler`] works
//! out which entities are new, which registered ones actually changed and
//! which went missing, so the host only re-renders what differs.
//!
//! - [`EntityDirectory`] / [`EntityHost`] - what the reconciler needs from
//!   the host
//! - [`Platform`] - a reconciler bound to one host
//! - [`EntityRegistry`] - an in-memory host publishing
//!   [`EntityEvent`](crate::event::EntityEvent)s

mod directory;
mod platform;
mod reconciler;
mod registry;

pub use directory::{EntityDirectory, EntityHost};
pub use platform::{Platform, UpdateSummary};
pub use reconciler::{Reconciler, Reconciliation};
pub use registry::EntityRegistry;
