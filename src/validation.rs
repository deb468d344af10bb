// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Overlap and containment validation for subnet admission.
//!
//! [`validate_subnet`] is the pure decision procedure: given a candidate, its
//! resolved parent and the sibling set, it either accepts (returning the
//! candidate's computed capacity) or rejects with the first violated
//! invariant. [`admit_subnet`] is the admission hook built on top of it: it
//! resolves the `NetworkGlobal` reference, the parent and the siblings from
//! the store, then delegates to `validate_subnet`. The subnet reconciler and
//! any validating-admission webhook share this single code path.
//!
//! Admission is a read-then-validate sequence with no cross-resource lock;
//! two overlapping siblings admitted concurrently can both pass. That
//! optimistic-concurrency window is an accepted trade-off of the design
//! (see DESIGN.md), not corrected here.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info};

use crate::cidr;
use crate::crd::{NetworkGlobal, Subnet};
use crate::ipam_errors::{CidrError, ValidationError};
use crate::tree;

/// Outcome of the admission hook.
#[derive(Debug)]
pub enum Admission {
    /// All checks passed.
    Accept {
        /// The candidate's total address capacity
        capacity: i64,
        /// The tree-depth labels to write on the candidate
        tree_labels: BTreeMap<String, String>,
    },
    /// At least one invariant failed; the reason is terminal.
    Reject(ValidationError),
}

/// Order-insensitive membership subset test for region/AZ scope lists.
///
/// Every element of `child` must appear in `parent`.
#[must_use]
pub fn is_scope_subset(child: &[String], parent: &[String]) -> bool {
    child.iter().all(|member| parent.contains(member))
}

/// Decide acceptance of a candidate subnet against its resolved parent and
/// sibling set.
///
/// Checks, in order:
///
/// 1. With a parent: range containment, `partitionID` equality, and
///    region/AZ scope subset.
/// 2. Sibling overlap: the first sibling whose range contains either bound
///    of the candidate's range rejects the candidate. CIDR alignment makes
///    the two-bound check sufficient, because aligned ranges cannot
///    partially straddle without one bound falling inside the other.
///
/// No partial acceptance is attempted: the first violation wins.
///
/// # Errors
///
/// Returns the violated invariant as a [`ValidationError`]; on success
/// returns the candidate's capacity `2^(family_bits - prefix_length)`.
pub fn validate_subnet(
    candidate: &Subnet,
    parent: Option<&Subnet>,
    siblings: &[Subnet],
) -> Result<i64, ValidationError> {
    let name = candidate.name_any();

    let (_, range) =
        cidr::parse_range(&candidate.spec.cidr).map_err(|source| ValidationError::InvalidRange {
            name: name.clone(),
            source,
        })?;

    if let Some(parent) = parent {
        let (_, parent_range) =
            cidr::parse_range(&parent.spec.cidr).map_err(|source| ValidationError::InvalidRange {
                name: parent.name_any(),
                source,
            })?;

        if !cidr::contains_range(&parent_range, &range) {
            return Err(ValidationError::ContainmentViolation {
                name,
                cidr: candidate.spec.cidr.clone(),
                parent: parent.name_any(),
                parent_cidr: parent.spec.cidr.clone(),
            });
        }

        if candidate.spec.partition_id != parent.spec.partition_id {
            return Err(ValidationError::PartitionMismatch {
                name,
                partition_id: candidate.spec.partition_id.clone(),
                parent: parent.name_any(),
                parent_partition_id: parent.spec.partition_id.clone(),
            });
        }

        if !is_scope_subset(&candidate.spec.region, &parent.spec.region) {
            return Err(ValidationError::ScopeViolation {
                name,
                scope: "region",
                parent: parent.name_any(),
            });
        }

        if !is_scope_subset(&candidate.spec.availability_zone, &parent.spec.availability_zone) {
            return Err(ValidationError::ScopeViolation {
                name,
                scope: "availabilityZone",
                parent: parent.name_any(),
            });
        }
    }

    let (first, last) = cidr::address_bounds(&range);

    for sibling in siblings {
        if sibling.name_any() == name {
            continue;
        }
        // A sibling with an unparseable range was never accepted; it cannot
        // claim addresses and is skipped.
        let Ok((_, sibling_range)) = cidr::parse_range(&sibling.spec.cidr) else {
            continue;
        };

        if cidr::contains(&sibling_range, &first) || cidr::contains(&sibling_range, &last) {
            return Err(ValidationError::OverlapViolation {
                name,
                cidr: candidate.spec.cidr.clone(),
                sibling: sibling.name_any(),
                sibling_cidr: sibling.spec.cidr.clone(),
            });
        }
    }

    cidr::capacity(range.prefix_len(), candidate.spec.r#type.family_bits()).map_err(|source| {
        match source {
            CidrError::CapacityOverflow { .. } => ValidationError::CapacityOverflow { name, source },
            other => ValidationError::InvalidRange {
                name,
                source: other,
            },
        }
    })
}

/// Admission hook for `Subnet` creation.
///
/// Resolves the referenced `NetworkGlobal`, the declared parent (if any) and
/// the sibling set from the store, then runs [`validate_subnet`]. Missing
/// references are rejections, not transient failures; only store errors
/// other than NotFound propagate as `Err` for the driver to requeue.
///
/// # Errors
///
/// Returns an error if a Kubernetes API call fails for a reason other than
/// a missing referenced resource, or if the declared parent exists but has
/// not been linked into the tree yet (the driver requeues until it is).
pub async fn admit_subnet(client: &Client, candidate: &Subnet) -> Result<Admission> {
    let namespace = candidate.namespace().unwrap_or_default();
    let name = candidate.name_any();

    debug!(
        namespace = %namespace,
        name = %name,
        cidr = %candidate.spec.cidr,
        "Admitting Subnet"
    );

    // The referenced NetworkGlobal must exist before anything else.
    let globals: Api<NetworkGlobal> = Api::namespaced(client.clone(), &namespace);
    match globals.get(&candidate.spec.network_global_id).await {
        Ok(_) => {}
        Err(err) if is_not_found(&err) => {
            return Ok(Admission::Reject(ValidationError::GlobalNotFound {
                network_global_id: candidate.spec.network_global_id.clone(),
            }));
        }
        Err(err) => return Err(err.into()),
    }

    let subnets: Api<Subnet> = Api::namespaced(client.clone(), &namespace);

    let parent = match candidate.parent_id() {
        Some(parent_id) => match subnets.get(parent_id).await {
            Ok(parent) => Some(parent),
            Err(err) if is_not_found(&err) => {
                return Ok(Admission::Reject(ValidationError::ParentNotFound {
                    parent_id: parent_id.to_string(),
                }));
            }
            Err(err) => return Err(err.into()),
        },
        None => None,
    };

    // A parent that has not finished its own admission pass carries no depth
    // labels yet. Deriving from it now would link the candidate at the wrong
    // level, so admission waits for the parent to settle.
    if let Some(parent) = parent.as_ref() {
        let parent_name = parent.name_any();
        let parent_linked = parent.metadata.labels.as_ref().is_some_and(|labels| {
            labels.contains_key(&tree::tree_depth_key(&parent_name))
        });
        if !parent_linked {
            return Err(anyhow!(
                "parent subnet {parent_name} is not yet linked into the tree; \
                 deferring admission of {name}"
            ));
        }
    }

    let tree_labels = match tree::derive_tree_labels(
        &name,
        &candidate.spec.network_global_id,
        parent.as_ref().and_then(|p| p.metadata.labels.as_ref()),
    ) {
        Ok(labels) => labels,
        Err(source) => {
            return Ok(Admission::Reject(ValidationError::TreeViolation {
                name,
                source,
            }));
        }
    };

    let siblings = list_siblings(&subnets, &tree_labels, &name).await?;

    debug!(
        name = %name,
        siblings = siblings.len(),
        "Resolved subtree level for overlap check"
    );

    match validate_subnet(candidate, parent.as_ref(), &siblings) {
        Ok(capacity) => {
            info!(
                namespace = %namespace,
                name = %name,
                capacity = capacity,
                "Subnet admitted"
            );
            Ok(Admission::Accept {
                capacity,
                tree_labels,
            })
        }
        Err(reason) => Ok(Admission::Reject(reason)),
    }
}

/// List all subnets at the candidate's subtree level.
///
/// The candidate's derived label set, minus its own self marker, yields a
/// discriminating ancestor tag; every subnet carrying that exact pair is a
/// sibling (the candidate itself included, which `validate_subnet` skips).
async fn list_siblings(
    subnets: &Api<Subnet>,
    tree_labels: &BTreeMap<String, String>,
    candidate_name: &str,
) -> Result<Vec<Subnet>> {
    let Some((key, value)) = tree::discriminating_label(tree_labels, candidate_name) else {
        return Ok(Vec::new());
    };

    let params = ListParams::default().labels(&format!("{key}={value}"));
    let listed = subnets.list(&params).await?;

    Ok(listed.items)
}

/// Whether a kube error is an HTTP 404 from the API server.
fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 404)
}
