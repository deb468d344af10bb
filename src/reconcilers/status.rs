// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Status update helpers for the cidry resources.
//!
//! Reconciliation touches several status fields (phase, capacities, the
//! message log); updating them one patch at a time would trigger one
//! "object updated" event per field and a tight re-reconcile loop. The
//! updaters in this module collect all changes in memory and apply them in
//! a single `patch_status` call, skipping the call entirely when nothing
//! actually changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use cidry::crd::{Subnet, SubnetPhase};
//! use cidry::reconcilers::status::SubnetStatusUpdater;
//!
//! async fn reconcile(client: kube::Client, subnet: Subnet) -> anyhow::Result<()> {
//!     let mut status = SubnetStatusUpdater::new(&subnet);
//!     status.set_capacity(65_536);
//!     status.set_capacity_left(65_536);
//!     status.set_phase(SubnetPhase::Active);
//!     status.apply(&client).await
//! }
//! ```

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

use crate::crd::{
    NetworkGlobal, NetworkGlobalStatus, Subnet, SubnetPhase, SubnetSpecific, SubnetStatus,
};

/// Centralized status updater for `Subnet` resources.
///
/// Collects status changes during one reconciliation pass and applies them
/// atomically in a single Kubernetes API call.
pub struct SubnetStatusUpdater {
    namespace: String,
    name: String,
    current_status: Option<SubnetStatus>,
    new_status: SubnetStatus,
    has_changes: bool,
}

impl SubnetStatusUpdater {
    /// Create a new status updater for a `Subnet`.
    ///
    /// Initializes with the current status from the subnet, or with an empty
    /// status if none has been recorded yet.
    #[must_use]
    pub fn new(subnet: &Subnet) -> Self {
        let current_status = subnet.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: subnet.namespace().unwrap_or_default(),
            name: subnet.name_any(),
            current_status,
            new_status,
            has_changes: false,
        }
    }

    /// Set the lifecycle phase (in-memory only, no API call).
    pub fn set_phase(&mut self, phase: SubnetPhase) {
        self.new_status.phase = Some(phase);
        self.has_changes = true;
    }

    /// Set the subnet's total address capacity (in-memory only, no API call).
    pub fn set_capacity(&mut self, capacity: i64) {
        self.new_status.capacity = Some(capacity);
        self.has_changes = true;
    }

    /// Set the subnet's unclaimed capacity (in-memory only, no API call).
    pub fn set_capacity_left(&mut self, capacity_left: i64) {
        self.new_status.capacity_left = Some(capacity_left);
        self.has_changes = true;
    }

    /// Set the placement classification (in-memory only, no API call).
    pub fn set_specific(&mut self, specific: SubnetSpecific) {
        self.new_status.specific = Some(specific);
        self.has_changes = true;
    }

    /// Append a human-readable message (in-memory only, no API call).
    ///
    /// Redelivered events would otherwise append the same message on every
    /// pass, so a message identical to the most recent one is dropped.
    pub fn push_message(&mut self, message: &str) {
        if self.new_status.messages.last().is_some_and(|m| m == message) {
            return;
        }
        self.new_status.messages.push(message.to_string());
        self.has_changes = true;
    }

    /// Check if the status has actually changed compared to the current status.
    ///
    /// Returns `true` if there are semantic changes that warrant an API update.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        if !self.has_changes {
            return false;
        }

        match &self.current_status {
            None => true, // First status update
            Some(current) => *current != self.new_status,
        }
    }

    /// Apply the collected status changes to Kubernetes (single atomic API call).
    ///
    /// Skips the call when the status is semantically unchanged, preventing
    /// unnecessary reconciliation loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "Subnet {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<Subnet> = Api::namespaced(client.clone(), &self.namespace);

        let patch = json!({
            "status": self.new_status
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated Subnet {}/{} status: phase {:?}, {} message(s)",
            self.namespace,
            self.name,
            self.new_status.phase,
            self.new_status.messages.len()
        );

        Ok(())
    }

    /// Get a reference to the pending status (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn pending_status(&self) -> &SubnetStatus {
        &self.new_status
    }
}

/// Append a message to a `NetworkGlobal`'s status log.
///
/// Used when deletion of a tree root is refused because member subnets still
/// exist. A message identical to the most recent one is not re-appended.
///
/// # Errors
///
/// Returns an error if the Kubernetes API call fails.
pub async fn append_networkglobal_message(
    client: &Client,
    global: &NetworkGlobal,
    message: &str,
) -> Result<()> {
    let namespace = global.namespace().unwrap_or_default();
    let name = global.name_any();

    let mut status = global.status.clone().unwrap_or_else(|| NetworkGlobalStatus {
        messages: Vec::new(),
    });

    if status.messages.last().is_some_and(|m| m == message) {
        return Ok(());
    }
    status.messages.push(message.to_string());

    let api: Api<NetworkGlobal> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "status": status });
    api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    debug!(
        "Updated NetworkGlobal {}/{} status: {} message(s)",
        namespace,
        name,
        status.messages.len()
    );

    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
