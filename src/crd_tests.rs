// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Unit tests for the CRD types.

#[cfg(test)]
mod tests {
    use crate::crd::*;
    use serde_json::json;

    fn sample_spec() -> SubnetSpec {
        SubnetSpec {
            id: "sn-a".to_string(),
            r#type: SubnetType::V4,
            cidr: "10.0.0.0/16".to_string(),
            network_global_id: "g1".to_string(),
            partition_id: "fra-1".to_string(),
            subnet_parent_id: None,
            region: vec!["eu-west".to_string()],
            availability_zone: vec!["eu-west-1a".to_string()],
        }
    }

    #[test]
    fn test_subnet_type_family_bits() {
        assert_eq!(SubnetType::V4.family_bits(), 32);
        assert_eq!(SubnetType::V6.family_bits(), 128);
    }

    #[test]
    fn test_subnet_type_serialization() {
        assert_eq!(serde_json::to_value(SubnetType::V4).unwrap(), json!("v4"));
        assert_eq!(serde_json::to_value(SubnetType::V6).unwrap(), json!("v6"));
    }

    #[test]
    fn test_specific_serialization() {
        assert_eq!(
            serde_json::to_value(SubnetSpecific::Local).unwrap(),
            json!("local")
        );
        assert_eq!(
            serde_json::to_value(SubnetSpecific::Region).unwrap(),
            json!("region")
        );
        assert_eq!(
            serde_json::to_value(SubnetSpecific::Multiregion).unwrap(),
            json!("multiregion")
        );
    }

    /// The wire field names use the original capitalization (ID, not Id).
    #[test]
    fn test_spec_field_names() {
        let value = serde_json::to_value(sample_spec()).unwrap();

        assert!(value.get("networkGlobalID").is_some());
        assert!(value.get("partitionID").is_some());
        assert!(value.get("availabilityZone").is_some());
        assert!(
            value.get("subnetParentID").is_none(),
            "absent parent is omitted from the wire form"
        );
    }

    #[test]
    fn test_spec_deserialization() {
        let spec: SubnetSpec = serde_json::from_value(json!({
            "id": "sn-b",
            "type": "v4",
            "cidr": "10.0.0.0/24",
            "networkGlobalID": "g1",
            "partitionID": "fra-1",
            "subnetParentID": "sn-a",
            "region": ["eu-west"],
            "availabilityZone": ["eu-west-1a"]
        }))
        .expect("well-formed spec should deserialize");

        assert_eq!(spec.network_global_id, "g1");
        assert_eq!(spec.subnet_parent_id.as_deref(), Some("sn-a"));
    }

    /// region/availabilityZone default to empty when omitted.
    #[test]
    fn test_spec_defaults() {
        let spec: SubnetSpec = serde_json::from_value(json!({
            "id": "sn-b",
            "type": "v6",
            "cidr": "2001:db8::/96",
            "networkGlobalID": "g1",
            "partitionID": "fra-1"
        }))
        .expect("scope lists are optional");

        assert!(spec.region.is_empty());
        assert!(spec.availability_zone.is_empty());
        assert!(spec.subnet_parent_id.is_none());
    }

    #[test]
    fn test_status_field_names() {
        let status = SubnetStatus {
            capacity: Some(65_536),
            capacity_left: Some(65_280),
            messages: vec![],
            phase: Some(SubnetPhase::Active),
            specific: Some(SubnetSpecific::Local),
        };

        let value = serde_json::to_value(status).unwrap();
        assert_eq!(value["capacity"], json!(65_536));
        assert_eq!(value["capacityLeft"], json!(65_280));
        assert_eq!(value["phase"], json!("Active"));
        assert_eq!(value["specific"], json!("local"));
    }

    /// An empty `subnetParentID` string and an absent one both mean "direct
    /// child of the tree root".
    #[test]
    fn test_parent_id_normalization() {
        let mut subnet = Subnet::new("sn-a", sample_spec());
        assert_eq!(subnet.parent_id(), None);

        subnet.spec.subnet_parent_id = Some(String::new());
        assert_eq!(subnet.parent_id(), None, "empty string is no parent");

        subnet.spec.subnet_parent_id = Some("sn-parent".to_string());
        assert_eq!(subnet.parent_id(), Some("sn-parent"));
    }

    #[test]
    fn test_phase_accessor() {
        let mut subnet = Subnet::new("sn-a", sample_spec());
        assert_eq!(subnet.phase(), None, "no status means no phase");

        subnet.status = Some(SubnetStatus {
            phase: Some(SubnetPhase::Pending),
            ..SubnetStatus::default()
        });
        assert_eq!(subnet.phase(), Some(SubnetPhase::Pending));
    }

    #[test]
    fn test_networkglobal_construction() {
        let global = NetworkGlobal::new(
            "g1",
            NetworkGlobalSpec {
                id: "g1".to_string(),
                name: "production address space".to_string(),
            },
        );

        assert_eq!(global.spec.id, "g1");
        assert!(global.status.is_none());
    }
}
