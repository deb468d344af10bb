// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Tree membership index.
//!
//! Each subnet's position in the containment tree is encoded as flat
//! tree-depth labels on the resource: one label per ancestor-or-self whose
//! key is `"{name}{TREE_DEPTH_SUFFIX}"` and whose value is the depth counted
//! from the subnet itself. A subnet at depth three under root `g1` carries,
//! for example:
//!
//! ```text
//! sn-leaf.tree-depth:   "0"   (self marker)
//! sn-mid.tree-depth:    "1"   (immediate parent)
//! sn-top.tree-depth:    "2"
//! g1.tree-depth:        "3"   (NetworkGlobal root)
//! ```
//!
//! The label set is derived once at creation by copying the parent's depth
//! labels and incrementing each by one, and is rebuilt from resource labels
//! on every query. No mutable graph is kept in memory: the store is the
//! single source of truth, which trades O(siblings) list cost per validation
//! for the absence of dangling-pointer state.

use std::collections::BTreeMap;

use crate::constants::{TREE_DEPTH_CHILD, TREE_DEPTH_SELF};
use crate::ipam_errors::TreeError;
use crate::labels::TREE_DEPTH_SUFFIX;

/// Tree-depth label key of a subnet or `NetworkGlobal` name.
#[must_use]
pub fn tree_depth_key(name: &str) -> String {
    format!("{name}{TREE_DEPTH_SUFFIX}")
}

/// The subnet (or root) name encoded in a tree-depth label key, or `None`
/// if the key is not a tree-depth label.
#[must_use]
pub fn name_from_depth_key(key: &str) -> Option<&str> {
    key.strip_suffix(TREE_DEPTH_SUFFIX)
}

/// Label selector matching the direct children of `name`.
#[must_use]
pub fn child_selector(name: &str) -> String {
    format!("{}={}", tree_depth_key(name), TREE_DEPTH_CHILD)
}

/// Label selector matching every subnet that belongs to the tree rooted at
/// `name` (any depth).
#[must_use]
pub fn member_selector(name: &str) -> String {
    tree_depth_key(name)
}

/// Derive the tree-depth labels for a subnet being linked into the tree.
///
/// The subnet stores its own marker at depth `"0"`. With a parent, every
/// depth label of the parent is copied and incremented by one; without a
/// parent, the subnet attaches directly under the `NetworkGlobal` root and
/// stores the root's marker at depth `"1"`.
///
/// # Errors
///
/// Returns [`TreeError::CorruptDepthLabel`] if a parent depth label does
/// not hold a decimal value. Depth labels are written exclusively by this
/// controller, so this indicates out-of-band label edits.
pub fn derive_tree_labels(
    subnet_name: &str,
    network_global_id: &str,
    parent_labels: Option<&BTreeMap<String, String>>,
) -> Result<BTreeMap<String, String>, TreeError> {
    let mut labels = BTreeMap::new();
    labels.insert(tree_depth_key(subnet_name), TREE_DEPTH_SELF.to_string());

    match parent_labels {
        Some(parent) => {
            for (key, value) in parent {
                if name_from_depth_key(key).is_none() {
                    continue;
                }
                let depth: u32 =
                    value
                        .parse()
                        .map_err(|_| TreeError::CorruptDepthLabel {
                            key: key.clone(),
                            value: value.clone(),
                        })?;
                labels.insert(key.clone(), (depth + 1).to_string());
            }
        }
        None => {
            labels.insert(
                tree_depth_key(network_global_id),
                TREE_DEPTH_CHILD.to_string(),
            );
        }
    }

    Ok(labels)
}

/// Pick one ancestor depth label of a subnet as the discriminating
/// label/value pair for sibling discovery.
///
/// Every subnet at the same subtree level shares the same ancestor set with
/// the same depths, so listing all subnets carrying any single ancestor tag
/// (the candidate's set minus its own self marker) yields exactly the
/// siblings plus the candidate itself. The lexicographically first ancestor
/// key is chosen so repeated queries are deterministic.
///
/// Returns `None` for a label set with no ancestor tags (which cannot occur
/// for labels produced by [`derive_tree_labels`]).
#[must_use]
pub fn discriminating_label<'a>(
    labels: &'a BTreeMap<String, String>,
    self_name: &str,
) -> Option<(&'a str, &'a str)> {
    let self_key = tree_depth_key(self_name);
    labels
        .iter()
        .filter(|(key, _)| **key != self_key && name_from_depth_key(key).is_some())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .next()
}

/// Names and depths of all ancestors encoded in a subnet's label set,
/// ordered nearest-first. The `NetworkGlobal` root marker is included; the
/// self marker (depth 0) is not.
#[must_use]
pub fn ancestor_names(labels: &BTreeMap<String, String>, self_name: &str) -> Vec<(String, u32)> {
    let self_key = tree_depth_key(self_name);
    let mut ancestors: Vec<(String, u32)> = labels
        .iter()
        .filter(|(key, _)| **key != self_key)
        .filter_map(|(key, value)| {
            let name = name_from_depth_key(key)?;
            let depth: u32 = value.parse().ok()?;
            (depth > 0).then(|| (name.to_string(), depth))
        })
        .collect();
    ancestors.sort_by_key(|(_, depth)| *depth);
    ancestors
}
