// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for dimmable lights.
//!
//! The gateway works in percent (0-100) while home-automation hosts
//! usually express brightness on a 0-255 scale. [`Brightness`] keeps the
//! gateway's percentage and converts at the edge.

use std::fmt;

use crate::error::ValueError;

/// Brightness level as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use nhc_hub::types::Brightness;
///
/// let level = Brightness::new(40).unwrap();
/// assert_eq!(level.value(), 40);
/// assert_eq!(level.to_scale_255(), 102);
///
/// assert_eq!(Brightness::from_scale_255(255), Brightness::MAX);
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Fully dimmed (0%).
    pub const MIN: Self = Self(0);

    /// Full brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Converts a host brightness on the 0-255 scale to a percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    pub const fn from_scale_255(value: u8) -> Self {
        // Rounded integer division; 255 maps to exactly 100.
        Self(((value as u16 * 100 + 127) / 255) as u8)
    }

    /// Returns the brightness on the host's 0-255 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    pub const fn to_scale_255(&self) -> u8 {
        ((self.0 as u16 * 255 + 50) / 100) as u8
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 0..=100 {
            assert_eq!(Brightness::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn brightness_invalid_value() {
        assert_eq!(
            Brightness::new(150),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: 150
            })
        );
    }

    #[test]
    fn brightness_clamped() {
        assert_eq!(Brightness::clamped(50).value(), 50);
        assert_eq!(Brightness::clamped(255).value(), 100);
    }

    #[test]
    fn scale_255_conversion() {
        assert_eq!(Brightness::from_scale_255(0), Brightness::MIN);
        assert_eq!(Brightness::from_scale_255(128).value(), 50);
        assert_eq!(Brightness::from_scale_255(255), Brightness::MAX);

        assert_eq!(Brightness::MIN.to_scale_255(), 0);
        assert_eq!(Brightness::clamped(50).to_scale_255(), 128);
        assert_eq!(Brightness::MAX.to_scale_255(), 255);
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::clamped(75).to_string(), "75%");
    }
}
