// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene entity.

use crate::error::ProtocolError;
use crate::model::{Entity, EntityKind};
use crate::protocol::CommandClient;

/// A scene of the site. Scenes have no state; they can only be activated.
#[derive(Debug, Clone)]
pub struct Scene {
    id: String,
    name: String,
    available: bool,
    commands: CommandClient,
}

impl Scene {
    /// Creates a scene.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, commands: CommandClient) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available: true,
            commands,
        }
    }

    /// Returns the scene identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the scene name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Activates the scene.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered. The
    /// failure is also logged.
    pub async fn activate(&self) -> Result<(), ProtocolError> {
        tracing::debug!(scene = %self.name, "Activate scene");

        self.commands
            .activate_scene(&self.id)
            .await
            .inspect_err(|e| {
                tracing::warn!(scene = %self.name, error = %e, "Failed to activate scene");
            })
    }
}

impl Entity for Scene {
    const KIND: EntityKind = EntityKind::Scene;

    fn unique_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn equals(&self, other: &Self) -> bool {
        self.name == other.name
    }

    fn assign_from(&mut self, other: &Self) {
        self.name.clone_from(&other.name);
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn set_available(&mut self, available: bool) -> bool {
        let changed = self.available != available;
        self.available = available;
        changed
    }
}
