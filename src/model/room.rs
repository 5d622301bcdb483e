// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room value type.

/// A room of the site. Only used to name lights while parsing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Room {
    /// Room identity.
    pub id: String,
    /// Room name.
    pub name: String,
}

impl Room {
    /// Creates a room.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
