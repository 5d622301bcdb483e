// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side traits used by the reconciler.

use crate::model::{Entity, EntityKind};

/// Lookup of entities the host already owns.
///
/// The reconciler never stores entities itself. It asks the directory for
/// the registered instance of an identity and updates it in place.
pub trait EntityDirectory<E: Entity> {
    /// Returns the registered entity for `unique_id`, or `None` if the host
    /// does not know it (anymore).
    fn get_existing_mut(&mut self, kind: EntityKind, unique_id: &str) -> Option<&mut E>;
}

/// A host that takes ownership of new entities and renders updates.
pub trait EntityHost<E: Entity>: EntityDirectory<E> {
    /// Registers entities seen for the first time.
    fn add_entities(&mut self, entities: Vec<E>);

    /// Called after a registered entity changed its attributes or its
    /// availability.
    fn entity_updated(&mut self, entity: &E);
}
