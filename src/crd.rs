// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for IPAM management.
//!
//! This module defines the Kubernetes Custom Resource Definitions used by
//! cidry to manage hierarchical subnet trees declaratively.
//!
//! # Resource Types
//!
//! - [`NetworkGlobal`] - The logical root of one address-space tree. It has
//!   no address range of its own; subnets reference it via `networkGlobalID`.
//! - [`Subnet`] - A node in the containment tree. Each subnet declares its
//!   CIDR, its address family, the tree root it belongs to, and optionally a
//!   parent subnet it must fit inside.
//!
//! # Example: Creating a Subnet
//!
//! ```rust,no_run
//! use cidry::crd::{SubnetSpec, SubnetType};
//!
//! let spec = SubnetSpec {
//!     id: "sn-a".to_string(),
//!     r#type: SubnetType::V4,
//!     cidr: "10.0.0.0/16".to_string(),
//!     network_global_id: "g1".to_string(),
//!     partition_id: "fra-1".to_string(),
//!     subnet_parent_id: None,
//!     region: vec!["eu-west".to_string()],
//!     availability_zone: vec!["eu-west-1a".to_string()],
//! };
//! ```

use crate::constants::{IPV4_FAMILY_BITS, IPV6_FAMILY_BITS};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Address family of a subnet's range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SubnetType {
    /// IPv4 (32 address bits)
    #[serde(rename = "v4")]
    V4,
    /// IPv6 (128 address bits)
    #[serde(rename = "v6")]
    V6,
}

impl SubnetType {
    /// Address bits of this family: 32 for v4, 128 for v6.
    #[must_use]
    pub fn family_bits(self) -> u8 {
        match self {
            Self::V4 => IPV4_FAMILY_BITS,
            Self::V6 => IPV6_FAMILY_BITS,
        }
    }
}

/// Lifecycle phase of a `Subnet`.
///
/// `Pending → Validated → Active → Deleting`, plus the terminal `Rejected`
/// phase entered whenever admission fails at creation. A purged subnet has
/// no phase; the resource is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SubnetPhase {
    /// Observed but not yet validated
    Pending,
    /// Admission checks passed; finalizer/status writes in flight
    Validated,
    /// Linked into the tree with capacity accounted
    Active,
    /// Deletion requested; blocked while children exist
    Deleting,
    /// Admission failed; terminal, never re-driven
    Rejected,
}

/// Placement classification derived from a subnet's region/AZ membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubnetSpecific {
    /// One region, one availability zone
    Local,
    /// Several regions, one availability zone
    Region,
    /// One or more regions spanning several availability zones
    Multiregion,
}

/// `Subnet` status populated by the controller after admission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetStatus {
    /// Total addresses in the range: `2^(family_bits - prefix_length)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,

    /// Capacity not yet claimed by accepted children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_left: Option<i64>,

    /// Human-readable validation failures, appended in order of occurrence.
    #[serde(default)]
    pub messages: Vec<String>,

    /// Current lifecycle phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<SubnetPhase>,

    /// Placement classification (local / region / multiregion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific: Option<SubnetSpecific>,
}

/// `Subnet` defines one node of an address-space containment tree.
///
/// An accepted subnet's range is guaranteed to fit inside its declared
/// parent's range and to not overlap any sibling at the same subtree level.
/// Ancestry is encoded as flat tree-depth labels on the resource (see
/// [`crate::tree`]), not kept as an in-memory graph.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cidry.dev",
    version = "v1alpha1",
    kind = "Subnet",
    namespaced,
    doc = "Subnet is a node in an address-space containment tree. Its CIDR must fit inside its parent's CIDR and must not overlap any sibling; capacity accounting tracks the addresses claimed by accepted children."
)]
#[kube(status = "SubnetStatus")]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    /// Stable subnet identifier.
    pub id: String,

    /// Address family of the range: v4 or v6.
    pub r#type: SubnetType,

    /// Address range in CIDR notation.
    ///
    /// Examples: "10.0.0.0/16", "2001:db8::/64"
    pub cidr: String,

    /// Identifier of the `NetworkGlobal` root this subnet belongs to.
    #[serde(rename = "networkGlobalID")]
    pub network_global_id: String,

    /// Physical-location grouping. A child must match its parent's partition.
    #[serde(rename = "partitionID")]
    pub partition_id: String,

    /// Optional parent subnet. Empty means this subnet is a direct child of
    /// the `NetworkGlobal` root.
    #[serde(rename = "subnetParentID", default, skip_serializing_if = "Option::is_none")]
    pub subnet_parent_id: Option<String>,

    /// Region membership. A child's regions must be a subset of its parent's.
    #[serde(default)]
    pub region: Vec<String>,

    /// Availability-zone membership. A child's zones must be a subset of its
    /// parent's.
    #[serde(default)]
    pub availability_zone: Vec<String>,
}

impl Subnet {
    /// The declared parent subnet name, if any. An empty `subnetParentID` is
    /// treated the same as an absent one: the subnet sits directly under the
    /// `NetworkGlobal` root.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.spec
            .subnet_parent_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Current lifecycle phase, if any has been recorded.
    #[must_use]
    pub fn phase(&self) -> Option<SubnetPhase> {
        self.status.as_ref().and_then(|s| s.phase)
    }
}

/// `NetworkGlobal` status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkGlobalStatus {
    /// Human-readable notices (e.g. deletion blocked by member subnets).
    #[serde(default)]
    pub messages: Vec<String>,
}

/// `NetworkGlobal` is the root of one address-space tree.
///
/// It carries no address range of its own; subnets reference it via
/// `networkGlobalID` and parentless subnets attach directly beneath it.
/// Deletion is blocked while any subnet still belongs to the tree.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cidry.dev",
    version = "v1alpha1",
    kind = "NetworkGlobal",
    namespaced,
    doc = "NetworkGlobal is the logical root of one address-space tree. Subnets reference it via networkGlobalID; it cannot be deleted while member subnets exist."
)]
#[kube(status = "NetworkGlobalStatus")]
#[serde(rename_all = "camelCase")]
pub struct NetworkGlobalSpec {
    /// Stable identifier, referenced by subnets as `networkGlobalID`.
    pub id: String,

    /// Display name.
    pub name: String,
}
