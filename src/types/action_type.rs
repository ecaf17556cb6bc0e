// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-type codes reported by the gateway.

use std::fmt;

/// Kind of device behind an action.
///
/// The gateway reports a small integer code per action. Codes the library
/// does not know are preserved in [`ActionType::Unknown`] so they can be
/// logged, but no entity is created for them.
///
/// # Examples
///
/// ```
/// use nhc_hub::types::ActionType;
///
/// assert_eq!(ActionType::from_code(2), ActionType::Dimmable);
/// assert_eq!(ActionType::from_code(9), ActionType::Unknown(9));
/// assert!(!ActionType::Unknown(9).is_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// On/off light or switched socket (code 1).
    OnOff,
    /// Dimmable light (code 2).
    Dimmable,
    /// Cover, blind or shutter (code 4).
    Cover,
    /// Any other code.
    Unknown(u8),
}

impl ActionType {
    /// Maps a gateway type code to an action type.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::OnOff,
            2 => Self::Dimmable,
            4 => Self::Cover,
            other => Self::Unknown(other),
        }
    }

    /// Returns the gateway type code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::OnOff => 1,
            Self::Dimmable => 2,
            Self::Cover => 4,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns `true` if the library maps this type to an entity.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns `true` for both light types.
    #[must_use]
    pub const fn is_light(&self) -> bool {
        matches!(self, Self::OnOff | Self::Dimmable)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnOff => f.write_str("on/off"),
            Self::Dimmable => f.write_str("dimmable"),
            Self::Cover => f.write_str("cover"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

impl From<u8> for ActionType {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}
