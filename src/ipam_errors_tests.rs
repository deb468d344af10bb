// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Unit tests for IPAM error rendering.
//!
//! The rendered messages end up verbatim in `status.messages`, so their
//! wording is part of the resource surface.

#[cfg(test)]
mod tests {
    use crate::ipam_errors::*;

    #[test]
    fn test_invalid_range_error() {
        let error = CidrError::InvalidRange {
            range: "10.0.0.0/33".to_string(),
        };

        assert_eq!(error.to_string(), "invalid address range '10.0.0.0/33'");
    }

    #[test]
    fn test_prefix_out_of_range_error() {
        let error = CidrError::PrefixOutOfRange {
            prefix_len: 33,
            family_bits: 32,
        };

        assert_eq!(
            error.to_string(),
            "prefix length /33 is out of range for a 32-bit address family"
        );
    }

    #[test]
    fn test_capacity_overflow_error() {
        let error = CidrError::CapacityOverflow {
            prefix_len: 48,
            exponent: 80,
        };

        assert_eq!(
            error.to_string(),
            "capacity 2^80 of a /48 range exceeds the 64-bit capacity field; refusing to compute"
        );
    }

    #[test]
    fn test_global_not_found_error() {
        let error = ValidationError::GlobalNotFound {
            network_global_id: "g1".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "subnet is not valid because NetworkGlobal 'g1' does not exist"
        );
    }

    #[test]
    fn test_parent_not_found_error() {
        let error = ValidationError::ParentNotFound {
            parent_id: "sn-a".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "subnetParentID 'sn-a' is not valid because the parent resource does not exist"
        );
    }

    #[test]
    fn test_containment_violation_error() {
        let error = ValidationError::ContainmentViolation {
            name: "sn-d".to_string(),
            cidr: "10.1.0.0/24".to_string(),
            parent: "sn-a".to_string(),
            parent_cidr: "10.0.0.0/16".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "range 10.1.0.0/24 of subnet 'sn-d' is not contained in range 10.0.0.0/16 of parent 'sn-a'"
        );
    }

    #[test]
    fn test_overlap_violation_error() {
        let error = ValidationError::OverlapViolation {
            name: "sn-c".to_string(),
            cidr: "10.0.0.0/24".to_string(),
            sibling: "sn-b".to_string(),
            sibling_cidr: "10.0.0.0/24".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "range 10.0.0.0/24 of subnet 'sn-c' overlaps range 10.0.0.0/24 of sibling 'sn-b'"
        );
    }

    #[test]
    fn test_partition_mismatch_error() {
        let error = ValidationError::PartitionMismatch {
            name: "sn-b".to_string(),
            partition_id: "ber-1".to_string(),
            parent: "sn-a".to_string(),
            parent_partition_id: "fra-1".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "partitionID 'ber-1' of subnet 'sn-b' does not match partitionID 'fra-1' of parent 'sn-a'"
        );
    }

    #[test]
    fn test_scope_violation_error() {
        let error = ValidationError::ScopeViolation {
            name: "sn-b".to_string(),
            scope: "region",
            parent: "sn-a".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "region membership of subnet 'sn-b' does not fit in the region membership of parent 'sn-a'"
        );
    }

    #[test]
    fn test_tree_violation_wraps_source() {
        let error = ValidationError::TreeViolation {
            name: "sn-b".to_string(),
            source: TreeError::CorruptDepthLabel {
                key: "sn-a.tree-depth".to_string(),
                value: "zero".to_string(),
            },
        };

        assert_eq!(
            error.to_string(),
            "subnet 'sn-b' could not be linked into the tree: \
             corrupt tree-depth label sn-a.tree-depth=zero: value is not a decimal depth"
        );
    }

    #[test]
    fn test_validation_capacity_overflow_wraps_source() {
        let error = ValidationError::CapacityOverflow {
            name: "sn-huge".to_string(),
            source: CidrError::CapacityOverflow {
                prefix_len: 48,
                exponent: 80,
            },
        };

        assert_eq!(
            error.to_string(),
            "capacity of subnet 'sn-huge' cannot be computed: \
             capacity 2^80 of a /48 range exceeds the 64-bit capacity field; refusing to compute"
        );
    }
}
