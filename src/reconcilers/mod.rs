// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for IPAM resources.
//!
//! This module contains the reconciliation logic for the cidry Custom
//! Resources. Each reconciler watches for changes to its resource kind and
//! converges the containment tree accordingly.
//!
//! # Reconciliation Architecture
//!
//! cidry follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via Kubernetes API
//! 2. **Admit** - Validate the declared range against the containment tree
//! 3. **Link** - Encode tree membership as depth labels and account capacity
//! 4. **Status** - Report phase, capacities and rejections back to Kubernetes
//!
//! # Available Reconcilers
//!
//! - [`reconcile_subnet`] - Admits subnets into the tree, accounts capacity
//!   and gates leaf-only deletion
//! - [`reconcile_networkglobal`] - Guards tree roots against deletion while
//!   member subnets exist
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use cidry::reconcilers::reconcile_subnet;
//! use cidry::crd::Subnet;
//! use kube::Client;
//!
//! async fn handle_subnet(subnet: Subnet) -> anyhow::Result<()> {
//!     let client = Client::try_default().await?;
//!     reconcile_subnet(client, subnet).await?;
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod networkglobal;
pub mod retry;
pub mod status;
pub mod subnet;

#[cfg(test)]
mod networkglobal_tests;
#[cfg(test)]
mod subnet_tests;

pub use networkglobal::reconcile_networkglobal;
pub use subnet::{classify_specific, reconcile_subnet};
