// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Generic finalizer management for Kubernetes resources.
//!
//! This module provides reusable functions for adding and removing finalizers
//! on the cidry custom resources. Both resource kinds are namespaced; the
//! deletion gating itself (leaf check for subnets, member check for tree
//! roots) lives in the per-kind reconcilers, because a refused deletion is
//! recorded in the resource's status rather than surfaced as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use cidry::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
//! use cidry::crd::Subnet;
//! use cidry::labels::FINALIZER_SUBNET;
//! use kube::Client;
//! use anyhow::Result;
//!
//! async fn reconcile(client: Client, subnet: Subnet) -> Result<()> {
//!     // Guard the resource before any state is linked into the tree
//!     ensure_finalizer(&client, &subnet, FINALIZER_SUBNET).await?;
//!
//!     // ... and release it once deletion is allowed
//!     if subnet.metadata.deletion_timestamp.is_some() {
//!         remove_finalizer(&client, &subnet, FINALIZER_SUBNET).await?;
//!     }
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Whether the given finalizer is present on a resource.
#[must_use]
pub fn has_finalizer<T>(resource: &T, finalizer: &str) -> bool
where
    T: Resource + ResourceExt,
{
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.contains(&finalizer.to_string()))
}

/// Add a finalizer to a resource if not already present.
///
/// This function checks if the specified finalizer is present on the resource,
/// and adds it if missing. The operation is idempotent - calling it multiple
/// times has no effect if the finalizer is already present.
///
/// # Arguments
///
/// * `client` - Kubernetes client for accessing the API
/// * `resource` - The resource to add the finalizer to
/// * `finalizer` - The finalizer string to add
///
/// # Returns
///
/// Returns `Ok(())` if the finalizer was added or already present.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no namespace (for namespaced resources)
/// - The API patch operation fails
pub async fn ensure_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    if !has_finalizer(resource, finalizer) {
        info!(
            "Adding finalizer {} to {}/{} {}",
            finalizer,
            namespace,
            name,
            T::kind(&())
        );

        let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
        finalizers.push(finalizer.to_string());

        let api: Api<T> = Api::namespaced(client.clone(), &namespace);
        let patch = json!({ "metadata": { "finalizers": finalizers } });
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        info!(
            "Successfully added finalizer {} to {}/{} {}",
            finalizer,
            namespace,
            name,
            T::kind(&())
        );
    }

    Ok(())
}

/// Remove a finalizer from a resource.
///
/// This function removes the specified finalizer from the resource if present.
/// The operation is idempotent - calling it multiple times has no effect if
/// the finalizer is already absent.
///
/// **Note:** The caller is responsible for checking that deletion is allowed
/// (no child subnets, no tree members) before releasing the finalizer.
///
/// # Arguments
///
/// * `client` - Kubernetes client for accessing the API
/// * `resource` - The resource to remove the finalizer from
/// * `finalizer` - The finalizer string to remove
///
/// # Returns
///
/// Returns `Ok(())` if the finalizer was removed or already absent.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no namespace (for namespaced resources)
/// - The API patch operation fails
pub async fn remove_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    if has_finalizer(resource, finalizer) {
        info!(
            "Removing finalizer {} from {}/{} {}",
            finalizer,
            namespace,
            name,
            T::kind(&())
        );

        let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
        finalizers.retain(|f| f != finalizer);

        let api: Api<T> = Api::namespaced(client.clone(), &namespace);
        let patch = json!({ "metadata": { "finalizers": finalizers } });
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        info!(
            "Successfully removed finalizer {} from {}/{} {}",
            finalizer,
            namespace,
            name,
            T::kind(&())
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
