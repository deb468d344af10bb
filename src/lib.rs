// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # cidry - Hierarchical IPAM Operator for Kubernetes
//!
//! cidry is a Kubernetes operator written in Rust that manages IP address
//! space as a tree of nested subnets through Custom Resource Definitions
//! (CRDs).
//!
//! ## Overview
//!
//! This library provides the core functionality for the cidry operator,
//! including:
//!
//! - Custom Resource Definitions (CRDs) for subnets and tree roots
//! - CIDR containment and sibling-overlap validation
//! - Tree membership encoded as flat depth labels on resources
//! - Address capacity accounting from parents down to children
//! - Reconciliation logic with finalizer-guarded, leaf-only deletion
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types for IPAM resources
//! - [`cidr`] - Pure CIDR algebra (parsing, containment, capacity)
//! - [`tree`] - Tree-depth label derivation and selectors
//! - [`validation`] - Admission checks for candidate subnets
//! - [`capacity`] - Capacity accounting against ancestors
//! - [`reconcilers`] - Reconciliation logic for each resource type
//!
//! ## Example
//!
//! ```rust,no_run
//! use cidry::crd::{SubnetSpec, SubnetType};
//!
//! // Declare a /16 block directly under the tree root "g1"
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
//!
//! ## Guarantees
//!
//! - **Containment** - An accepted subnet's range fits inside its parent's
//! - **Exclusivity** - Sibling ranges at one subtree level never overlap
//! - **Accounting** - `capacityLeft` reflects the capacity claimed by
//!   accepted children
//! - **Leaf-only deletion** - A subnet with children cannot be purged

pub mod capacity;
pub mod cidr;
pub mod constants;
pub mod crd;
pub mod ipam_errors;
pub mod labels;
pub mod reconcilers;
pub mod tree;
pub mod validation;

#[cfg(test)]
mod crd_tests;
#[cfg(test)]
mod ipam_errors_tests;
