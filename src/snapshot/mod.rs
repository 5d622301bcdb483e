// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Site snapshot parsing.
//!
//! Mount Kelvin pushes the whole site on every change instead of deltas.
//! [`parse_site_event`] turns one such push into flat collections of
//! [`Room`](crate::Room), [`Light`](crate::Light) and
//! [`Scene`](crate::Scene) values. Parsing is pure; a malformed snapshot
//! fails as a whole.

mod parser;
mod site;

pub use parser::{ParsedSite, parse_site, parse_site_event};
pub use site::{
    RawDevice, RawDeviceState, RawRoom, RawScene, SiteEvent, SiteLocations, SiteSnapshot,
};
