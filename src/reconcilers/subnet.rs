// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Subnet reconciliation logic.
//!
//! This module drives a `Subnet` through its lifecycle:
//!
//! ```text
//! Pending ──> Validated ──> Active ──> Deleting ──> (purged)
//!    │
//!    └──> Rejected (terminal)
//! ```
//!
//! A new subnet is admitted against its `NetworkGlobal`, its declared parent
//! and its sibling set (see [`crate::validation`]). Acceptance links the
//! subnet into the tree via depth labels, guards it with a finalizer, records
//! capacity/phase in its status and accounts the claimed capacity against
//! every ancestor. Rejection records the violated invariant in
//! `status.messages` and parks the resource in the terminal `Rejected` phase.
//!
//! Deletion is leaf-only: a subnet with children keeps its finalizer, stays
//! in `Deleting` and logs a refusal message until the children are gone.

use anyhow::Result;
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::capacity::{apply_capacity_accounting, self_capacity_left};
use crate::crd::{Subnet, SubnetPhase, SubnetSpecific};
use crate::labels::FINALIZER_SUBNET;
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::retry::retry_api_call;
use crate::reconcilers::status::SubnetStatusUpdater;
use crate::tree;
use crate::validation::{admit_subnet, Admission};

/// Reconciles a `Subnet` resource.
///
/// Dispatches on the subnet's lifecycle state:
///
/// - A deleting subnet goes through the leaf-only deletion gate.
/// - A `Rejected` subnet is terminal and never re-driven.
/// - An `Active` subnet has its finalizer re-asserted and its ancestor
///   accounting replayed.
/// - Anything else (new, or `Pending`/`Validated` after a partial pass) is
///   admitted from scratch; every admission pass recomputes from current
///   store state, so replaying after a crash converges to the same result.
///
/// # Arguments
///
/// * `client` - Kubernetes API client
/// * `subnet` - The `Subnet` resource to reconcile
///
/// # Returns
///
/// * `Ok(())` - The subnet settled (Active, Rejected, or deletion handled)
/// * `Err(_)` - A transient store failure; the driver requeues
///
/// # Errors
///
/// Returns an error if a Kubernetes API operation fails for a reason other
/// than a missing referenced resource (those are rejections, not errors).
pub async fn reconcile_subnet(client: Client, subnet: Subnet) -> Result<()> {
    let namespace = subnet.namespace().unwrap_or_default();
    let name = subnet.name_any();

    info!("Reconciling Subnet: {}/{}", namespace, name);
    debug!(
        namespace = %namespace,
        name = %name,
        cidr = %subnet.spec.cidr,
        parent = ?subnet.parent_id(),
        phase = ?subnet.phase(),
        "Starting Subnet reconciliation"
    );

    if subnet.metadata.deletion_timestamp.is_some() {
        return handle_subnet_deletion(&client, &subnet).await;
    }

    match subnet.phase() {
        Some(SubnetPhase::Rejected) => {
            // Terminal: the spec must be corrected and the resource recreated.
            debug!(
                "Subnet {}/{} is Rejected; skipping reconciliation",
                namespace, name
            );
            return Ok(());
        }
        Some(SubnetPhase::Active) => {
            if let Some(capacity) = subnet.status.as_ref().and_then(|s| s.capacity) {
                // Settled. Re-assert the finalizer in case it was stripped,
                // then replay the ancestor accounting: the recomputation is
                // idempotent and heals a crash between the Active patch and
                // the accounting writes of an earlier pass.
                ensure_finalizer(&client, &subnet, FINALIZER_SUBNET).await?;
                apply_capacity_accounting(&client, &subnet, capacity).await?;
                debug!(
                    "Subnet {}/{} is Active; steady-state pass complete",
                    namespace, name
                );
                return Ok(());
            }
            // Active without a recorded capacity is a partial status write
            // from an older pass; fall through and re-admit.
        }
        None => {
            // First observation
            let mut status = SubnetStatusUpdater::new(&subnet);
            status.set_phase(SubnetPhase::Pending);
            status.apply(&client).await?;
        }
        _ => {}
    }

    match admit_subnet(&client, &subnet).await? {
        Admission::Reject(reason) => {
            warn!(
                namespace = %namespace,
                name = %name,
                reason = %reason,
                "Subnet rejected"
            );

            let mut status = SubnetStatusUpdater::new(&subnet);
            status.push_message(&reason.to_string());
            status.set_phase(SubnetPhase::Rejected);
            status.apply(&client).await?;

            Ok(())
        }
        Admission::Accept {
            capacity,
            tree_labels,
        } => {
            activate_subnet(&client, &subnet, capacity, tree_labels).await
        }
    }
}

/// Drive an admitted subnet from `Validated` to `Active`.
///
/// Writes the tree-depth labels, marks the intermediate `Validated` phase,
/// attaches the finalizer, accounts the claimed capacity against every
/// ancestor and only then records capacity, placement and the `Active`
/// phase in the status. Accounting runs before the `Active` patch so that
/// a crash in between leaves the subnet in `Validated`, which the next
/// pass re-admits in full. Each step is idempotent.
async fn activate_subnet(
    client: &Client,
    subnet: &Subnet,
    capacity: i64,
    tree_labels: BTreeMap<String, String>,
) -> Result<()> {
    let namespace = subnet.namespace().unwrap_or_default();
    let name = subnet.name_any();

    write_tree_labels(client, subnet, &tree_labels).await?;

    let mut status = SubnetStatusUpdater::new(subnet);
    status.set_phase(SubnetPhase::Validated);
    status.apply(client).await?;

    ensure_finalizer(client, subnet, FINALIZER_SUBNET).await?;

    // Account against ancestors using the labels just written; the local
    // copy of the resource predates the label patch.
    let mut linked = subnet.clone();
    linked
        .metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .extend(tree_labels);
    apply_capacity_accounting(client, &linked, capacity).await?;

    let mut status = SubnetStatusUpdater::new(subnet);
    status.set_capacity(capacity);
    status.set_capacity_left(self_capacity_left(capacity));
    if let Some(specific) =
        classify_specific(&subnet.spec.region, &subnet.spec.availability_zone)
    {
        status.set_specific(specific);
    }
    status.set_phase(SubnetPhase::Active);
    status.apply(client).await?;

    info!(
        namespace = %namespace,
        name = %name,
        capacity = capacity,
        "Subnet is Active"
    );

    Ok(())
}

/// Merge the derived tree-depth labels onto the subnet resource.
async fn write_tree_labels(
    client: &Client,
    subnet: &Subnet,
    tree_labels: &BTreeMap<String, String>,
) -> Result<()> {
    let namespace = subnet.namespace().unwrap_or_default();
    let name = subnet.name_any();

    let already_linked = subnet.metadata.labels.as_ref().is_some_and(|labels| {
        tree_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    });
    if already_linked {
        debug!("Subnet {}/{} already carries its tree labels", namespace, name);
        return Ok(());
    }

    let api: Api<Subnet> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "labels": tree_labels } });

    retry_api_call(
        || async {
            api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
        },
        "patch subnet tree labels",
    )
    .await?;

    debug!(
        "Linked Subnet {}/{} into the tree with {} label(s)",
        namespace,
        name,
        tree_labels.len()
    );

    Ok(())
}

/// Leaf-only deletion gate for subnets.
///
/// A subnet whose direct-child selector still matches anything keeps its
/// finalizer: the refusal is logged in `status.messages`, the phase moves to
/// `Deleting`, and the driver requeues until the children are gone. Only a
/// childless subnet has its finalizer released, after which Kubernetes
/// purges the resource.
async fn handle_subnet_deletion(client: &Client, subnet: &Subnet) -> Result<()> {
    let namespace = subnet.namespace().unwrap_or_default();
    let name = subnet.name_any();

    info!("Subnet {}/{} is being deleted", namespace, name);

    if !has_finalizer(subnet, FINALIZER_SUBNET) {
        // Nothing guards the resource; Kubernetes will purge it.
        return Ok(());
    }

    let api: Api<Subnet> = Api::namespaced(client.clone(), &namespace);
    let params = ListParams::default().labels(&tree::child_selector(&name));
    let children = api.list(&params).await?;

    if !children.items.is_empty() {
        let refusal = format!(
            "deletion blocked: subnet has {} direct child subnet(s); delete the children first",
            children.items.len()
        );
        warn!(
            namespace = %namespace,
            name = %name,
            children = children.items.len(),
            "Refusing subnet deletion"
        );

        let mut status = SubnetStatusUpdater::new(subnet);
        status.push_message(&refusal);
        status.set_phase(SubnetPhase::Deleting);
        status.apply(client).await?;

        return Ok(());
    }

    remove_finalizer(client, subnet, FINALIZER_SUBNET).await?;

    info!("Subnet {}/{} released for deletion", namespace, name);
    Ok(())
}

/// Placement classification from region/AZ membership.
///
/// - one region, one zone: `local`
/// - several regions, one zone: `region`
/// - anything spanning several zones: `multiregion`
///
/// Returns `None` when either list is empty; placement is then unknown and
/// no classification is recorded.
#[must_use]
pub fn classify_specific(regions: &[String], zones: &[String]) -> Option<SubnetSpecific> {
    if regions.is_empty() || zones.is_empty() {
        return None;
    }
    let specific = match (regions.len(), zones.len()) {
        (1, 1) => SubnetSpecific::Local,
        (_, 1) => SubnetSpecific::Region,
        _ => SubnetSpecific::Multiregion,
    };
    Some(specific)
}
