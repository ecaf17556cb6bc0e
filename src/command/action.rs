// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed command vocabulary for actions.

use std::fmt;

use crate::types::{ActionType, Brightness};

/// A command for one action, mapped to the gateway's `value1` field.
///
/// Lights use percentages: off is 0, on is 100 and any level in between
/// dims. Covers use the gateway's motor sentinels instead of positions:
/// 255 opens, 254 closes and 253 stops.
///
/// # Examples
///
/// ```
/// use nhc_hub::command::ActionCommand;
/// use nhc_hub::types::Brightness;
///
/// assert_eq!(ActionCommand::TurnOff.value1(), 0);
/// assert_eq!(ActionCommand::SetBrightness(Brightness::clamped(40)).value1(), 40);
/// assert_eq!(ActionCommand::StopCover.value1(), 253);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCommand {
    /// Switch a light fully on.
    TurnOn,
    /// Switch a light off.
    TurnOff,
    /// Dim a light to the given level.
    SetBrightness(Brightness),
    /// Start opening a cover.
    OpenCover,
    /// Start closing a cover.
    CloseCover,
    /// Stop a moving cover.
    StopCover,
}

impl ActionCommand {
    /// `value1` sent to open a cover.
    pub const COVER_OPEN: u8 = 255;
    /// `value1` sent to close a cover.
    pub const COVER_CLOSE: u8 = 254;
    /// `value1` sent to stop a cover.
    pub const COVER_STOP: u8 = 253;

    /// Returns the gateway `value1` for this command.
    #[must_use]
    pub const fn value1(&self) -> u8 {
        match self {
            Self::TurnOn => Brightness::MAX.value(),
            Self::TurnOff => Brightness::MIN.value(),
            Self::SetBrightness(level) => level.value(),
            Self::OpenCover => Self::COVER_OPEN,
            Self::CloseCover => Self::COVER_CLOSE,
            Self::StopCover => Self::COVER_STOP,
        }
    }

    /// Returns `true` if the command makes sense for the given action type.
    ///
    /// Brightness levels other than 0 and 100 need a dimmable light.
    #[must_use]
    pub fn applies_to(&self, action_type: ActionType) -> bool {
        match self {
            Self::TurnOn | Self::TurnOff => action_type.is_light(),
            Self::SetBrightness(level) => match action_type {
                ActionType::Dimmable => true,
                ActionType::OnOff => *level == Brightness::MIN || *level == Brightness::MAX,
                _ => false,
            },
            Self::OpenCover | Self::CloseCover | Self::StopCover => {
                action_type == ActionType::Cover
            }
        }
    }
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn => f.write_str("turn on"),
            Self::TurnOff => f.write_str("turn off"),
            Self::SetBrightness(level) => write!(f, "set brightness {level}"),
            Self::OpenCover => f.write_str("open"),
            Self::CloseCover => f.write_str("close"),
            Self::StopCover => f.write_str("stop"),
        }
    }
}
