// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Common label and finalizer constants used across all reconcilers.
//!
//! This module defines the cidry-specific labels and finalizer strings to
//! ensure consistency across all resources touched by the controller.

// ============================================================================
// Tree Membership Labels
// ============================================================================

/// Suffix appended to a subnet (or `NetworkGlobal`) name to form its
/// tree-depth label key.
///
/// Every subnet carries one such label per ancestor-or-self: the key names
/// the ancestor, the value is the depth counted from the subnet itself
/// (`"0"` for the subnet's own marker, `"1"` for its immediate parent, and
/// so on). The containment tree is reconstructed from these flat labels on
/// every query; no pointer graph is kept in memory.
pub const TREE_DEPTH_SUFFIX: &str = ".tree-depth";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `Subnet` resources
pub const FINALIZER_SUBNET: &str = "cidry.dev/subnet-finalizer";

/// Finalizer for `NetworkGlobal` resources
pub const FINALIZER_NETWORK_GLOBAL: &str = "cidry.dev/networkglobal-finalizer";
