// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! IPAM error types for cidry.
//!
//! This module provides specialized error types for:
//! - CIDR parsing and capacity computation
//! - Tree-membership label derivation
//! - Subnet admission (containment, overlap, partition and scope checks)
//!
//! Admission errors are rejection-class: they are rendered into the
//! resource's `status.messages` and left for a human or upstream system to
//! correct. They are never retried automatically. Transient store failures
//! (conflicts, API unavailability) are NOT modelled here; those surface as
//! `anyhow::Error` from the reconcilers and are requeued by the driver.

use thiserror::Error;

/// Errors produced by the pure CIDR algebra in [`crate::cidr`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// The address-range string could not be parsed as a CIDR.
    #[error("invalid address range '{range}'")]
    InvalidRange {
        /// The string that failed to parse
        range: String,
    },

    /// The prefix length does not fit the address family.
    #[error("prefix length /{prefix_len} is out of range for a {family_bits}-bit address family")]
    PrefixOutOfRange {
        /// The offending prefix length
        prefix_len: u8,
        /// Bits of the address family (32 for v4, 128 for v6)
        family_bits: u8,
    },

    /// The range's capacity does not fit the signed 64-bit capacity field.
    ///
    /// Returned for very short IPv6 prefixes (exponent ≥ 63). The accountant
    /// refuses to compute a capacity rather than return a wrapped number.
    #[error(
        "capacity 2^{exponent} of a /{prefix_len} range exceeds the 64-bit capacity field; \
         refusing to compute"
    )]
    CapacityOverflow {
        /// The offending prefix length
        prefix_len: u8,
        /// The exponent `family_bits - prefix_len` that was refused
        exponent: u8,
    },
}

/// Errors produced by the tree-membership index in [`crate::tree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A tree-depth label on the parent did not hold a decimal depth.
    ///
    /// Depth labels are written exclusively by this controller, so a
    /// non-numeric value means the label set was edited out-of-band.
    #[error("corrupt tree-depth label {key}={value}: value is not a decimal depth")]
    CorruptDepthLabel {
        /// The label key carrying the bad value
        key: String,
        /// The non-numeric value found
        value: String,
    },
}

/// Rejection reasons produced by subnet admission.
///
/// Every variant maps to one failed invariant of the containment tree. A
/// rejected subnet enters the terminal `Rejected` phase with the rendered
/// message appended to `status.messages`; the controller does not re-drive
/// rejected resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The referenced `NetworkGlobal` does not exist in the namespace.
    #[error("subnet is not valid because NetworkGlobal '{network_global_id}' does not exist")]
    GlobalNotFound {
        /// The `networkGlobalID` that failed to resolve
        network_global_id: String,
    },

    /// The referenced parent subnet does not exist in the namespace.
    #[error("subnetParentID '{parent_id}' is not valid because the parent resource does not exist")]
    ParentNotFound {
        /// The `subnetParentID` that failed to resolve
        parent_id: String,
    },

    /// The candidate's own address range failed to parse.
    #[error("subnet '{name}' carries an invalid address range: {source}")]
    InvalidRange {
        /// The candidate subnet name
        name: String,
        /// The underlying parse failure
        #[source]
        source: CidrError,
    },

    /// The candidate's range does not fit inside its parent's range.
    #[error("range {cidr} of subnet '{name}' is not contained in range {parent_cidr} of parent '{parent}'")]
    ContainmentViolation {
        /// The candidate subnet name
        name: String,
        /// The candidate's range
        cidr: String,
        /// The parent subnet name
        parent: String,
        /// The parent's range
        parent_cidr: String,
    },

    /// The candidate's range overlaps a sibling at the same subtree level.
    #[error("range {cidr} of subnet '{name}' overlaps range {sibling_cidr} of sibling '{sibling}'")]
    OverlapViolation {
        /// The candidate subnet name
        name: String,
        /// The candidate's range
        cidr: String,
        /// The first overlapping sibling encountered
        sibling: String,
        /// The sibling's range
        sibling_cidr: String,
    },

    /// The candidate's partition does not match its parent's partition.
    #[error("partitionID '{partition_id}' of subnet '{name}' does not match partitionID '{parent_partition_id}' of parent '{parent}'")]
    PartitionMismatch {
        /// The candidate subnet name
        name: String,
        /// The candidate's partition
        partition_id: String,
        /// The parent subnet name
        parent: String,
        /// The parent's partition
        parent_partition_id: String,
    },

    /// The candidate's region or availability-zone membership is not a
    /// subset of its parent's membership.
    #[error("{scope} membership of subnet '{name}' does not fit in the {scope} membership of parent '{parent}'")]
    ScopeViolation {
        /// The candidate subnet name
        name: String,
        /// Which scope list failed the subset test ("region" or "availabilityZone")
        scope: &'static str,
        /// The parent subnet name
        parent: String,
    },

    /// The candidate's tree labels could not be derived from the parent's.
    #[error("subnet '{name}' could not be linked into the tree: {source}")]
    TreeViolation {
        /// The candidate subnet name
        name: String,
        /// The underlying label failure
        #[source]
        source: TreeError,
    },

    /// The candidate's capacity cannot be represented (see [`CidrError::CapacityOverflow`]).
    #[error("capacity of subnet '{name}' cannot be computed: {source}")]
    CapacityOverflow {
        /// The candidate subnet name
        name: String,
        /// The underlying refusal
        #[source]
        source: CidrError,
    },
}
