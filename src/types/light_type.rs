// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light device type.

use std::fmt;
use std::str::FromStr;

/// Kind of light reported by Mount Kelvin.
///
/// Only `dimmable` devices expose brightness control. Every other device
/// type is an on/off light that keeps the type string the service reported,
/// so a change between two on/off types is still a change.
///
/// # Examples
///
/// ```
/// use mount_kelvin::types::LightType;
///
/// let kind: LightType = "dimmable".parse().unwrap();
/// assert!(kind.supports_brightness());
///
/// let kind: LightType = "onoff".parse().unwrap();
/// assert_eq!(kind, LightType::NonDimmable("onoff".to_string()));
/// assert_eq!(kind.as_str(), "onoff");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Brightness can be controlled.
    Dimmable,
    /// On/off only, with the reported device type.
    NonDimmable(String),
}

impl LightType {
    const DIMMABLE: &'static str = "dimmable";

    /// Creates an on/off light type.
    #[must_use]
    pub fn non_dimmable(device_type: impl Into<String>) -> Self {
        Self::NonDimmable(device_type.into())
    }

    /// Returns the device type as reported by the service.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dimmable => Self::DIMMABLE,
            Self::NonDimmable(device_type) => device_type,
        }
    }

    /// Returns `true` if brightness control should be exposed.
    #[must_use]
    pub const fn supports_brightness(&self) -> bool {
        matches!(self, Self::Dimmable)
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LightType {
    fn from(device_type: &str) -> Self {
        if device_type == Self::DIMMABLE {
            Self::Dimmable
        } else {
            Self::non_dimmable(device_type)
        }
    }
}

impl FromStr for LightType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dimmable_supports_brightness() {
        assert_eq!("dimmable".parse::<LightType>(), Ok(LightType::Dimmable));
        assert!(!LightType::non_dimmable("relay").supports_brightness());
    }

    #[test]
    fn other_types_keep_the_reported_name() {
        let relay: LightType = "relay".parse().unwrap();
        let onoff: LightType = "onoff".parse().unwrap();
        assert_eq!(relay.to_string(), "relay");
        assert_ne!(relay, onoff);
    }

    #[test]
    fn type_match_is_exact() {
        assert_eq!(
            "Dimmable".parse::<LightType>(),
            Ok(LightType::non_dimmable("Dimmable"))
        );
    }
}
