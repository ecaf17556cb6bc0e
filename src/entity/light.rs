// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light entities.

use std::sync::Arc;

use crate::action::ActionRecord;
use crate::command::ActionCommand;
use crate::hub::Hub;
use crate::protocol::{GatewayClient, TcpGateway};
use crate::types::{ActionId, ActionType, Brightness};

use super::base::EntityCore;

/// A switched or dimmable light.
///
/// Brightness is exposed on the host's 0-255 scale; the gateway works in
/// percent.
#[derive(Debug)]
pub struct LightEntity<C: GatewayClient = TcpGateway> {
    core: EntityCore<C>,
}

impl<C: GatewayClient> LightEntity<C> {
    /// Unique id prefix.
    pub const PREFIX: &'static str = "light";

    /// Wraps a light action of `hub`.
    ///
    /// Returns `None` if the action is not a light.
    #[must_use]
    pub fn new(hub: Arc<Hub<C>>, record: ActionRecord) -> Option<Self> {
        record.action_type().is_light().then(|| Self {
            core: EntityCore::new(hub, record, Self::PREFIX),
        })
    }

    /// Returns the action id.
    #[must_use]
    pub fn id(&self) -> &ActionId {
        self.core.id()
    }

    /// Returns the unique id, `light-<action id>`.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        self.core.unique_id()
    }

    /// Returns the light's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core.record().name()
    }

    /// Returns `true` for dimmable lights.
    #[must_use]
    pub fn is_dimmable(&self) -> bool {
        self.core.record().action_type() == ActionType::Dimmable
    }

    /// Returns `true` if the light is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.core.value() != 0
    }

    /// Returns the brightness on the 0-255 scale, `None` for switched lights.
    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.is_dimmable()
            .then(|| Brightness::clamped(self.core.value()).to_scale_255())
    }

    /// Returns `true` if the last update reached the gateway.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.core.is_available()
    }

    /// Turns the light on, optionally at a 0-255 brightness.
    ///
    /// Switched lights ignore the brightness. Any non-zero brightness keeps
    /// the light at least at 1%.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::send_command`].
    pub async fn turn_on(&self, brightness: Option<u8>) -> crate::Result<()> {
        let command = match brightness {
            Some(level) if self.is_dimmable() => {
                let percent = Brightness::from_scale_255(level).value().max(u8::from(level > 0));
                ActionCommand::SetBrightness(Brightness::clamped(percent))
            }
            _ => ActionCommand::TurnOn,
        };
        self.core.send(command).await
    }

    /// Turns the light off.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::send_command`].
    pub async fn turn_off(&self) -> crate::Result<()> {
        self.core.send(ActionCommand::TurnOff).await
    }

    /// Refreshes the hub and reads the light's state.
    ///
    /// Failures are logged; the light keeps its last state and reports
    /// itself unavailable.
    pub async fn update(&self) {
        self.core.update().await;
    }

    /// Starts following pushed updates. Returns `false` if already attached.
    pub fn attach(&self) -> bool {
        self.core.attach()
    }

    /// Stops following pushed updates. Returns `false` if not attached.
    pub fn detach(&self) -> bool {
        self.core.detach()
    }
}
