// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Throttled snapshot cache.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::action::{ActionRecord, ActionUpdate};
use crate::error::ProtocolError;
use crate::protocol::GatewayClient;
use crate::types::ActionId;

/// Outcome of a [`StateCache::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// A snapshot was fetched; carries the number of listed actions.
    Fetched(usize),
    /// The previous snapshot is younger than the throttle interval.
    Throttled,
}

#[derive(Debug, Default)]
struct Snapshot {
    /// Records in listing order.
    records: Vec<ActionRecord>,
    /// Last known value per action.
    values: HashMap<ActionId, u8>,
    available: bool,
    last_refresh: Option<Instant>,
}

/// Last known state of every action on one gateway.
///
/// The value map is mutated from two places: snapshot refreshes on the
/// polling path and single updates from the event bridge. Both go through
/// one write lock, so readers see either the whole new snapshot or none of
/// it. When a refresh and a push event for the same action race, whichever
/// lands last wins.
///
/// Refreshes are serialized: concurrent callers wait for the one in flight
/// and then find the snapshot fresh.
#[derive(Debug)]
pub struct StateCache {
    snapshot: RwLock<Snapshot>,
    refresh_gate: tokio::sync::Mutex<()>,
    throttle: Duration,
}

impl StateCache {
    /// Creates an empty, unavailable cache.
    #[must_use]
    pub fn new(throttle: Duration) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            throttle,
        }
    }

    /// Returns the minimum interval between two fetching refreshes.
    #[must_use]
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Fetches a new snapshot from the gateway.
    ///
    /// Without `force`, a snapshot younger than the throttle interval is kept
    /// and no request is made. On success every listed action's value is
    /// replaced at once and the cache becomes available. Actions missing from
    /// the new listing keep their last known value.
    ///
    /// The throttle counts from the last *successful* refresh. A failed
    /// forced refresh inside that window does not reset it, so a following
    /// unforced call still returns [`Refresh::Throttled`] while
    /// [`is_available`](Self::is_available) stays `false`. Force the refresh
    /// to retry sooner.
    ///
    /// # Errors
    ///
    /// Returns the transport error after marking the cache unavailable;
    /// cached values are left untouched.
    pub async fn refresh<C: GatewayClient>(
        &self,
        client: &C,
        force: bool,
    ) -> Result<Refresh, ProtocolError> {
        let _gate = self.refresh_gate.lock().await;

        if !force && self.is_fresh() {
            tracing::trace!("Snapshot is fresh, skipping refresh");
            return Ok(Refresh::Throttled);
        }

        match client.list_actions_raw().await {
            Ok(raw) => {
                let records: Vec<ActionRecord> = raw.into_iter().map(ActionRecord::from).collect();
                let count = records.len();
                self.replace(records);
                tracing::debug!(count, "Refreshed action snapshot");
                Ok(Refresh::Fetched(count))
            }
            Err(e) => {
                self.snapshot.write().available = false;
                tracing::warn!(error = %e, "Failed to refresh action snapshot");
                Err(e)
            }
        }
    }

    fn is_fresh(&self) -> bool {
        self.snapshot
            .read()
            .last_refresh
            .is_some_and(|at| at.elapsed() < self.throttle)
    }

    fn replace(&self, records: Vec<ActionRecord>) {
        let mut snapshot = self.snapshot.write();

        let listed: HashSet<&ActionId> = records.iter().map(ActionRecord::id).collect();
        let retained: Vec<ActionRecord> = snapshot
            .records
            .iter()
            .filter(|record| !listed.contains(record.id()))
            .cloned()
            .collect();
        if !retained.is_empty() {
            tracing::debug!(count = retained.len(), "Keeping actions missing from snapshot");
        }

        for record in &records {
            snapshot.values.insert(record.id().clone(), record.value());
        }
        let mut merged = records;
        merged.extend(retained);

        snapshot.records = merged;
        snapshot.available = true;
        snapshot.last_refresh = Some(Instant::now());
    }

    /// Applies a pushed value.
    ///
    /// Returns the previous value, if the action was known.
    pub fn apply_update(&self, update: &ActionUpdate) -> Option<u8> {
        self.snapshot
            .write()
            .values
            .insert(update.id.clone(), update.value)
    }

    /// Returns the last known value of an action.
    ///
    /// Never performs I/O. Values stay readable while the cache is
    /// unavailable.
    #[must_use]
    pub fn get(&self, id: &ActionId) -> Option<u8> {
        self.snapshot.read().values.get(id).copied()
    }

    /// Returns the records of every known action, in listing order.
    #[must_use]
    pub fn records(&self) -> Vec<ActionRecord> {
        self.snapshot.read().records.clone()
    }

    /// Returns a copy of every known value.
    #[must_use]
    pub fn values(&self) -> HashMap<ActionId, u8> {
        self.snapshot.read().values.clone()
    }

    /// Returns `true` if the last refresh succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.snapshot.read().available
    }

    /// Returns when the last successful refresh completed.
    #[must_use]
    pub fn last_refresh(&self) -> Option<Instant> {
        self.snapshot.read().last_refresh
    }

    /// Returns the number of known actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.read().values.len()
    }

    /// Returns `true` if no action is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
