// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Niko Home Control actions.
//!
//! # Types
//!
//! - [`ActionId`] - Opaque gateway-assigned action identifier
//! - [`ActionType`] - Device-type code (on/off light, dimmer, cover, unknown)
//! - [`Brightness`] - Dimmer level as a percentage (0-100%)

mod action_id;
mod action_type;
mod brightness;

pub use action_id::ActionId;
pub use action_type::ActionType;
pub use brightness::Brightness;
