// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached action state.
//!
//! The [`StateCache`] keeps the last snapshot the gateway listed, refreshed on
//! demand but never more often than its throttle interval allows. Push events
//! update single values in between.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use nhc_hub::action::ActionUpdate;
//! use nhc_hub::state::StateCache;
//! use nhc_hub::types::ActionId;
//!
//! let cache = StateCache::new(Duration::from_secs(1));
//! assert!(!cache.is_available());
//!
//! cache.apply_update(&ActionUpdate::new(2u32, 0));
//! assert_eq!(cache.get(&ActionId::from(2u32)), Some(0));
//! ```

mod cache;

pub use cache::{Refresh, StateCache};
