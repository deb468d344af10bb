// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Unit tests for the `NetworkGlobal` reconciler.

#[cfg(test)]
mod tests {
    use crate::crd::{NetworkGlobal, NetworkGlobalSpec, Subnet, SubnetSpec, SubnetType};
    use crate::labels::FINALIZER_NETWORK_GLOBAL;
    use crate::reconcilers::finalizers::has_finalizer;
    use crate::reconcilers::networkglobal::reconcile_networkglobal;
    use crate::tree;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use kube::ResourceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn global(name: &str) -> NetworkGlobal {
        NetworkGlobal::new(
            name,
            NetworkGlobalSpec {
                id: name.to_string(),
                name: "production address space".to_string(),
            },
        )
    }

    fn mock_client(server: &MockServer) -> kube::Client {
        let config = kube::Config::new(server.uri().parse().expect("mock server uri parses"));
        kube::Client::try_from(config).expect("client builds against the mock server")
    }

    /// Member discovery covers the whole tree: the selector is the bare
    /// depth-label key of the root's resource name, matching any depth.
    #[test]
    fn test_member_selector_matches_any_depth() {
        let g = global("g1");
        assert_eq!(tree::member_selector(&g.name_any()), "g1.tree-depth");
    }

    #[test]
    fn test_finalizer_guard() {
        let mut g = global("g1");
        assert!(!has_finalizer(&g, FINALIZER_NETWORK_GLOBAL));

        g.metadata.finalizers = Some(vec![FINALIZER_NETWORK_GLOBAL.to_string()]);
        assert!(has_finalizer(&g, FINALIZER_NETWORK_GLOBAL));
    }

    /// The deletion gate keys on the root's resource name: subnets resolve
    /// `networkGlobalID` with a get-by-name, so the name is what their depth
    /// labels carry. A root whose spec id differs from its name must still
    /// see its members and refuse deletion.
    #[tokio::test]
    async fn test_deletion_gate_keys_on_resource_name() {
        let server = MockServer::start().await;

        let mut g = global("g1");
        g.spec.id = "space-1".to_string();
        g.metadata.namespace = Some("ns".to_string());
        g.metadata.finalizers = Some(vec![FINALIZER_NETWORK_GLOBAL.to_string()]);
        g.metadata.deletion_timestamp = Some(Time(k8s_openapi::jiff::Timestamp::now()));

        let member = Subnet::new(
            "sn-member",
            SubnetSpec {
                id: "sn-member".to_string(),
                r#type: SubnetType::V4,
                cidr: "10.0.0.0/16".to_string(),
                network_global_id: "g1".to_string(),
                partition_id: "fra-1".to_string(),
                subnet_parent_id: None,
                region: Vec::new(),
                availability_zone: Vec::new(),
            },
        );

        Mock::given(method("GET"))
            .and(path("/apis/cidry.dev/v1alpha1/namespaces/ns/subnets"))
            .and(query_param("labelSelector", "g1.tree-depth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apiVersion": "cidry.dev/v1alpha1",
                "kind": "SubnetList",
                "metadata": {},
                "items": [member],
            })))
            .expect(1)
            .mount(&server)
            .await;

        // The refusal lands in the root's status message log.
        Mock::given(method("PATCH"))
            .and(path(
                "/apis/cidry.dev/v1alpha1/namespaces/ns/networkglobals/g1/status",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(&g))
            .expect(1)
            .mount(&server)
            .await;

        reconcile_networkglobal(mock_client(&server), g)
            .await
            .expect("blocked deletion settles without error");
    }
}
