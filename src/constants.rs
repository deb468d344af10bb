// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Global constants for the cidry operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Address Family Constants
// ============================================================================

/// Address bits of an IPv4 range
pub const IPV4_FAMILY_BITS: u8 = 32;

/// Address bits of an IPv6 range
pub const IPV6_FAMILY_BITS: u8 = 128;

/// Largest exponent for which `2^exponent` still fits the signed 64-bit
/// capacity status field. Capacities at or above this exponent are refused
/// rather than wrapped (see `cidr::capacity`).
pub const MAX_CAPACITY_EXPONENT: u8 = 63;

// ============================================================================
// Tree Depth Constants
// ============================================================================

/// Depth value a subnet stores for itself in its tree labels
pub const TREE_DEPTH_SELF: &str = "0";

/// Depth value marking a direct child in tree labels
pub const TREE_DEPTH_CHILD: &str = "1";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration while a resource has not settled (30 seconds)
pub const UNSETTLED_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration once a resource is active (5 minutes)
pub const SETTLED_REQUEUE_DURATION_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
