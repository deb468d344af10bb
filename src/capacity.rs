// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Capacity accounting.
//!
//! On acceptance of a subnet, the validator computes the subnet's own
//! `capacity`; this module distributes the "capacity left" from parent to
//! children. The accounting pass always recomputes `capacityLeft` from the
//! two stored capacities instead of decrementing in place. A replay against
//! already-updated state produces the same numbers, so the pass is safe to
//! retry after a partial failure.

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::{debug, warn};

use crate::crd::Subnet;
use crate::reconcilers::retry::retry_api_call;
use crate::tree;

/// Baseline `capacityLeft` of a freshly accepted subnet: its full capacity.
#[must_use]
pub fn self_capacity_left(capacity: i64) -> i64 {
    capacity
}

/// `capacityLeft` of an ancestor after a child of the given capacity is
/// accepted beneath it.
///
/// Recomputed from the stored capacities on every pass; never read-modify-
/// write on a previous `capacityLeft`.
#[must_use]
pub fn ancestor_capacity_left(ancestor_capacity: i64, child_capacity: i64) -> i64 {
    ancestor_capacity - child_capacity
}

/// Walk an accepted subnet's ancestor tags outward and patch every ancestor
/// subnet's `status.capacityLeft`.
///
/// The `NetworkGlobal` root marker is skipped: the root has no range of its
/// own and therefore no capacity to account. An ancestor that is missing or
/// has no recorded capacity yet is skipped with a warning; the pass is
/// re-run on the next event for that ancestor.
///
/// # Errors
///
/// Returns an error if a Kubernetes API call fails for a reason other than
/// a missing ancestor.
pub async fn apply_capacity_accounting(
    client: &Client,
    subnet: &Subnet,
    child_capacity: i64,
) -> Result<()> {
    let namespace = subnet.namespace().unwrap_or_default();
    let name = subnet.name_any();

    let Some(labels) = subnet.metadata.labels.as_ref() else {
        warn!(
            "Subnet {}/{} has no tree labels; skipping capacity accounting",
            namespace, name
        );
        return Ok(());
    };

    let api: Api<Subnet> = Api::namespaced(client.clone(), &namespace);

    for (ancestor, depth) in tree::ancestor_names(labels, &name) {
        if ancestor == subnet.spec.network_global_id {
            // The tree root is a NetworkGlobal, not a subnet.
            continue;
        }

        let ancestor_subnet = match api.get(&ancestor).await {
            Ok(found) => found,
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                warn!(
                    "Ancestor subnet {} of {}/{} not found; skipping its accounting",
                    ancestor, namespace, name
                );
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let Some(ancestor_capacity) = ancestor_subnet.status.as_ref().and_then(|s| s.capacity)
        else {
            warn!(
                "Ancestor subnet {} of {}/{} has no recorded capacity yet; skipping",
                ancestor, namespace, name
            );
            continue;
        };

        let capacity_left = ancestor_capacity_left(ancestor_capacity, child_capacity);
        let patch = json!({ "status": { "capacityLeft": capacity_left } });

        retry_api_call(
            || async {
                api.patch_status(&ancestor, &PatchParams::default(), &Patch::Merge(&patch))
                    .await
            },
            "patch ancestor capacityLeft",
        )
        .await?;

        debug!(
            ancestor = %ancestor,
            depth = depth,
            capacity_left = capacity_left,
            "Accounted child capacity against ancestor"
        );
    }

    Ok(())
}
