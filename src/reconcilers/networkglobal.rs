// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! `NetworkGlobal` reconciliation logic.
//!
//! A `NetworkGlobal` is the root of one address-space tree and carries no
//! range of its own, so its reconciliation is mostly lifecycle guarding: a
//! finalizer is attached on sight, and deletion is refused while any subnet
//! anywhere in the tree still carries the root's depth label.

use anyhow::Result;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

use crate::crd::{NetworkGlobal, Subnet};
use crate::labels::FINALIZER_NETWORK_GLOBAL;
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::status::append_networkglobal_message;
use crate::tree;

/// Reconciles a `NetworkGlobal` resource.
///
/// On a live resource, attaches the finalizer so the root cannot vanish
/// under its tree. On a deleting resource, lists every subnet in the
/// namespace that belongs to the tree (at any depth); deletion is refused
/// with a status message while members remain, and the finalizer is
/// released only once the tree is empty.
///
/// # Errors
///
/// Returns an error if a Kubernetes API operation fails; the driver
/// requeues.
pub async fn reconcile_networkglobal(client: Client, global: NetworkGlobal) -> Result<()> {
    let namespace = global.namespace().unwrap_or_default();
    let name = global.name_any();

    info!("Reconciling NetworkGlobal: {}/{}", namespace, name);

    if global.metadata.deletion_timestamp.is_some() {
        return handle_networkglobal_deletion(&client, &global).await;
    }

    ensure_finalizer(&client, &global, FINALIZER_NETWORK_GLOBAL).await?;

    debug!("NetworkGlobal {}/{} settled", namespace, name);
    Ok(())
}

/// Member-guarded deletion gate for tree roots.
///
/// Membership is tested through the root's depth label, which every subnet
/// of the tree carries regardless of depth. The member count in the refusal
/// message therefore covers the whole tree, not just direct children.
async fn handle_networkglobal_deletion(client: &Client, global: &NetworkGlobal) -> Result<()> {
    let namespace = global.namespace().unwrap_or_default();
    let name = global.name_any();

    info!("NetworkGlobal {}/{} is being deleted", namespace, name);

    if !has_finalizer(global, FINALIZER_NETWORK_GLOBAL) {
        return Ok(());
    }

    // Subnets reference the root by resource name (`networkGlobalID` is
    // resolved with a get-by-name), so the depth labels carry the name.
    let subnets: Api<Subnet> = Api::namespaced(client.clone(), &namespace);
    let params = ListParams::default().labels(&tree::member_selector(&name));
    let members = subnets.list(&params).await?;

    if !members.items.is_empty() {
        let refusal = format!(
            "deletion blocked: {} subnet(s) still belong to this tree; delete them first",
            members.items.len()
        );
        warn!(
            namespace = %namespace,
            name = %name,
            members = members.items.len(),
            "Refusing NetworkGlobal deletion"
        );

        append_networkglobal_message(client, global, &refusal).await?;
        return Ok(());
    }

    remove_finalizer(client, global, FINALIZER_NETWORK_GLOBAL).await?;

    info!("NetworkGlobal {}/{} released for deletion", namespace, name);
    Ok(())
}
