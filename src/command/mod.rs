// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway command definitions.
//!
//! Two layers live here:
//!
//! | Type | Purpose | Example |
//! |------|---------|---------|
//! | [`ActionCommand`] | What an entity wants an action to do | Open a cover |
//! | [`GatewayRequest`] | The JSON request sent over the wire | `{"cmd":"executeactions",...}` |
//!
//! # Examples
//!
//! ```
//! use nhc_hub::command::{ActionCommand, GatewayRequest};
//! use nhc_hub::types::ActionId;
//!
//! let request = GatewayRequest::execute(ActionId::from(12u32), ActionCommand::OpenCover.value1());
//! assert_eq!(
//!     request.to_line().unwrap(),
//!     r#"{"cmd":"executeactions","id":12,"value1":255}"#
//! );
//! ```

mod action;
mod request;

pub use action::ActionCommand;
pub use request::GatewayRequest;
