// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover entities.

use std::sync::Arc;

use crate::action::ActionRecord;
use crate::command::ActionCommand;
use crate::hub::Hub;
use crate::protocol::{GatewayClient, TcpGateway};
use crate::types::{ActionId, ActionType};

use super::base::EntityCore;

/// A shutter or blind.
///
/// The gateway reports the position in percent, 0 being fully closed.
/// Moving is done with open, close and stop commands.
#[derive(Debug)]
pub struct CoverEntity<C: GatewayClient = TcpGateway> {
    core: EntityCore<C>,
}

impl<C: GatewayClient> CoverEntity<C> {
    /// Unique id prefix.
    pub const PREFIX: &'static str = "shutter";

    /// Wraps a cover action of `hub`.
    ///
    /// Returns `None` if the action is not a cover.
    #[must_use]
    pub fn new(hub: Arc<Hub<C>>, record: ActionRecord) -> Option<Self> {
        (record.action_type() == ActionType::Cover).then(|| Self {
            core: EntityCore::new(hub, record, Self::PREFIX),
        })
    }

    /// Returns the action id.
    #[must_use]
    pub fn id(&self) -> &ActionId {
        self.core.id()
    }

    /// Returns the unique id, `shutter-<action id>`.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        self.core.unique_id()
    }

    /// Returns the cover's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core.record().name()
    }

    /// Returns the position in percent.
    #[must_use]
    pub fn position(&self) -> u8 {
        self.core.value()
    }

    /// Returns `true` when fully closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.position() == 0
    }

    /// Returns `true` if the last update reached the gateway.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.core.is_available()
    }

    /// Starts opening the cover.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::send_command`].
    pub async fn open(&self) -> crate::Result<()> {
        self.core.send(ActionCommand::OpenCover).await
    }

    /// Starts closing the cover.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::send_command`].
    pub async fn close(&self) -> crate::Result<()> {
        self.core.send(ActionCommand::CloseCover).await
    }

    /// Stops the cover.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::send_command`].
    pub async fn stop(&self) -> crate::Result<()> {
        self.core.send(ActionCommand::StopCover).await
    }

    /// Refreshes the hub and reads the cover's position.
    ///
    /// Failures are logged; the cover keeps its last position and reports
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
