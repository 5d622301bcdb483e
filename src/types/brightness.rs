// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for dimmable lights.
//!
//! Mount Kelvin reports and accepts brightness on the 0-255 scale, so the
//! full range of a `u8` is valid.

use std::fmt;

/// Brightness level on the 0-255 scale used by the Mount Kelvin API.
///
/// # Examples
///
/// ```
/// use mount_kelvin::types::Brightness;
///
/// let bri = Brightness::new(128);
/// assert_eq!(bri.value(), 128);
///
/// assert_eq!(Brightness::MAX.value(), 255);
/// assert_eq!(Brightness::from_percent(50).value(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest brightness (0).
    pub const MIN: Self = Self(0);

    /// Full brightness (255). Used when turning on a light whose
    /// brightness is unknown.
    pub const MAX: Self = Self(255);

    /// Creates a brightness value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Creates a brightness from a percentage, clamping above 100.
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        let percent = u16::from(percent.min(100));
        // (percent * 255 + 50) / 100 is at most 255
        #[allow(clippy::cast_possible_truncation)]
        let value = ((percent * 255 + 50) / 100) as u8;
        Self(value)
    }

    /// Returns the raw 0-255 value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a rounded percentage (0-100).
    #[must_use]
    pub fn as_percent(&self) -> u8 {
        let value = u16::from(self.0);
        // (value * 100 + 127) / 255 is at most 100
        #[allow(clippy::cast_possible_truncation)]
        let percent = ((value * 100 + 127) / 255) as u8;
        percent
    }

    /// Returns `true` for a brightness of zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}
