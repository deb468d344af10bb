// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Unit tests for the subnet reconciler.

#[cfg(test)]
mod tests {
    use crate::crd::{
        Subnet, SubnetPhase, SubnetSpec, SubnetSpecific, SubnetStatus, SubnetType,
    };
    use crate::labels::FINALIZER_SUBNET;
    use crate::reconcilers::subnet::{classify_specific, reconcile_subnet};
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn subnet(name: &str, cidr: &str, parent: Option<&str>) -> Subnet {
        let mut subnet = Subnet::new(
            name,
            SubnetSpec {
                id: name.to_string(),
                r#type: SubnetType::V4,
                cidr: cidr.to_string(),
                network_global_id: "g1".to_string(),
                partition_id: "fra-1".to_string(),
                subnet_parent_id: parent.map(ToString::to_string),
                region: vec!["eu-west".to_string()],
                availability_zone: vec!["eu-west-1a".to_string()],
            },
        );
        subnet.metadata.namespace = Some("ns".to_string());
        subnet
    }

    fn mock_client(server: &MockServer) -> kube::Client {
        let config = kube::Config::new(server.uri().parse().expect("mock server uri parses"));
        kube::Client::try_from(config).expect("client builds against the mock server")
    }

    #[test]
    fn test_classify_local() {
        assert_eq!(
            classify_specific(&strings(&["eu-west"]), &strings(&["eu-west-1a"])),
            Some(SubnetSpecific::Local)
        );
    }

    #[test]
    fn test_classify_region() {
        assert_eq!(
            classify_specific(
                &strings(&["eu-west", "eu-central"]),
                &strings(&["eu-west-1a"])
            ),
            Some(SubnetSpecific::Region)
        );
    }

    #[test]
    fn test_classify_multiregion() {
        assert_eq!(
            classify_specific(
                &strings(&["eu-west"]),
                &strings(&["eu-west-1a", "eu-west-1b"])
            ),
            Some(SubnetSpecific::Multiregion)
        );
        assert_eq!(
            classify_specific(
                &strings(&["eu-west", "eu-central"]),
                &strings(&["eu-west-1a", "eu-central-1a"])
            ),
            Some(SubnetSpecific::Multiregion)
        );
    }

    /// Placement is unknown without both a region and a zone.
    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_specific(&[], &strings(&["eu-west-1a"])), None);
        assert_eq!(classify_specific(&strings(&["eu-west"]), &[]), None);
        assert_eq!(classify_specific(&[], &[]), None);
    }

    /// A steady-state pass over an Active subnet must replay the ancestor
    /// accounting, not just re-assert the finalizer: a crash between the
    /// Active patch and the accounting writes of an earlier pass would
    /// otherwise leave the parent's capacityLeft stale forever.
    #[tokio::test]
    async fn test_active_subnet_replays_ancestor_accounting() {
        let server = MockServer::start().await;

        let mut parent = subnet("sn-root", "10.0.0.0/16", None);
        parent.status = Some(SubnetStatus {
            capacity: Some(65_536),
            capacity_left: Some(65_536),
            messages: Vec::new(),
            phase: Some(SubnetPhase::Active),
            specific: None,
        });

        let mut leaf = subnet("sn-leaf", "10.0.0.0/24", Some("sn-root"));
        leaf.metadata.finalizers = Some(vec![FINALIZER_SUBNET.to_string()]);
        leaf.metadata.labels = Some(BTreeMap::from([
            ("sn-leaf.tree-depth".to_string(), "0".to_string()),
            ("sn-root.tree-depth".to_string(), "1".to_string()),
            ("g1.tree-depth".to_string(), "2".to_string()),
        ]));
        leaf.status = Some(SubnetStatus {
            capacity: Some(256),
            capacity_left: Some(256),
            messages: Vec::new(),
            phase: Some(SubnetPhase::Active),
            specific: None,
        });

        Mock::given(method("GET"))
            .and(path("/apis/cidry.dev/v1alpha1/namespaces/ns/subnets/sn-root"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&parent))
            .mount(&server)
            .await;

        // The parent's capacityLeft is recomputed from the stored capacities.
        Mock::given(method("PATCH"))
            .and(path("/apis/cidry.dev/v1alpha1/namespaces/ns/subnets/sn-root/status"))
            .and(body_json(
                serde_json::json!({ "status": { "capacityLeft": 65_280 } }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(&parent))
            .expect(1)
            .mount(&server)
            .await;

        reconcile_subnet(mock_client(&server), leaf)
            .await
            .expect("steady-state pass over an Active subnet succeeds");
    }
}
