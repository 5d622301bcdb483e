// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Mount Kelvin light control.
//!
//! # Types
//!
//! - [`Brightness`] - Brightness level (0-255)
//! - [`LightType`] - Dimmable or on/off light

mod brightness;
mod light_type;

pub use brightness::Brightness;
pub use light_type::LightType;
